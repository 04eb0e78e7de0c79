//! The API surface gate and the documentation policy sharing its exclusions.

mod check;
pub mod docs;
mod error;
mod policy;
pub mod snapshot;

pub use check::{ApiSurfaceGate, ChangeKind, GateReport, ModuleCheck, SymbolChange, diff_symbols};
pub use docs::{DocumentationPolicy, PackageOption};
pub use error::GateError;
pub use policy::{ApiGatePolicy, PackagePattern};
pub use snapshot::{FsSnapshotStore, SNAPSHOT_EXTENSION, SnapshotStore};
