//! Artifact assembly for the designated platform.
//!
//! [`ArtifactAssembler`] decides which modules get a merged artifact and what
//! it contains; [`packaging`] writes an assembly to disk.

mod assembler;
mod error;
pub mod packaging;

pub use assembler::{ArtifactAssembler, ArtifactAssembly, SIGNATURE_SUFFIX, is_signature_metadata};
pub use error::{AssemblyError, PackagingError};
pub use packaging::{PackageOutput, Sha256Digest, package_assembly};
