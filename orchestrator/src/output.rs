//! Output helpers for the Trellis CLI.
//!
//! Progress goes to stderr and can be silenced with `--quiet`; results go to
//! stdout.

use camino::Utf8Path;
use std::fmt::Display;
use std::io::Write;

/// Write `message` and a newline to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress; nothing useful to do on failure.
    }
}

/// Summary line after artifacts were written.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use trellis_orchestrator::output::success_message;
///
/// let msg = success_message(2, Utf8Path::new("build/libs"));
/// assert_eq!(msg, "Wrote 2 merged artifacts to build/libs");
/// ```
#[must_use]
pub fn success_message(count: usize, out_dir: &Utf8Path) -> String {
    let plural = if count == 1 { "artifact" } else { "artifacts" };
    format!("Wrote {count} merged {plural} to {out_dir}")
}

/// Summary line after snapshots were recorded.
#[must_use]
pub fn dump_message(count: usize, api_dir: &Utf8Path) -> String {
    let plural = if count == 1 { "snapshot" } else { "snapshots" };
    format!("Recorded {count} API {plural} in {api_dir}")
}
