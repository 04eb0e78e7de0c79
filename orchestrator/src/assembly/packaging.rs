//! Writing an [`ArtifactAssembly`] to a deployable zip archive.
//!
//! Entries are written in name order with a fixed timestamp so the same
//! assembly always produces byte-identical output. The archive is written to
//! a temporary file in the output directory and only moved to its final name
//! once complete; a failed packaging step never leaves a partial artifact.

use super::assembler::ArtifactAssembly;
use super::error::PackagingError;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::collections::hash_map::Entry as Slot;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Seek, Write};
use tempfile::NamedTempFile;
use trellis_common::{Entry, EntryData, ModuleId};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Classifier appended to merged artifact names.
pub const ARTIFACT_CLASSIFIER: &str = "all";

/// Extension of merged artifacts.
pub const ARTIFACT_EXTENSION: &str = "jar";

/// A hex-encoded SHA-256 digest of a packaged artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a lowercase hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output produced by [`package_assembly`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutput {
    /// Path of the written archive.
    pub archive_path: Utf8PathBuf,
    /// Digest of the written archive.
    pub sha256: Sha256Digest,
    /// Number of entries in the archive.
    pub entry_count: usize,
}

/// File name of the merged artifact for `module` at `version`.
///
/// # Examples
///
/// ```
/// use trellis_common::ModuleId;
/// use trellis_orchestrator::assembly::packaging::artifact_file_name;
///
/// let module = ModuleId::new("core").expect("valid id");
/// assert_eq!(artifact_file_name(&module, "1.2.0"), "core-1.2.0-all.jar");
/// ```
#[must_use]
pub fn artifact_file_name(module: &ModuleId, version: &str) -> String {
    format!("{module}-{version}-{ARTIFACT_CLASSIFIER}.{ARTIFACT_EXTENSION}")
}

/// Compute the SHA-256 digest of a file.
///
/// # Errors
///
/// Returns [`PackagingError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<Sha256Digest, PackagingError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(Sha256Digest(format!("{:x}", hasher.finalize())))
}

/// Package `assembly` into `output_dir` as
/// `<module>-<version>-all.jar`.
///
/// # Errors
///
/// Returns [`PackagingError`] if an entry's payload cannot be read, the
/// archive cannot be written, or the finished file cannot be moved into
/// place. The destination is left untouched in every error case.
pub fn package_assembly(
    assembly: &ArtifactAssembly,
    output_dir: &Utf8Path,
    version: &str,
) -> Result<PackageOutput, PackagingError> {
    fs::create_dir_all(output_dir)?;
    let archive_path = output_dir.join(artifact_file_name(assembly.module(), version));

    let mut entries: Vec<&Entry> = assembly.entries().iter().collect();
    entries.sort_by(|left, right| left.name.cmp(&right.name));

    let mut staged = NamedTempFile::new_in(output_dir)?;
    write_archive(staged.as_file_mut(), &entries)?;
    staged
        .persist(archive_path.as_std_path())
        .map_err(|err| PackagingError::Persist {
            path: archive_path.clone(),
            source: err.error,
        })?;

    let sha256 = compute_sha256(&archive_path)?;
    info!(
        "packaged {} ({} entries, sha256 {sha256})",
        archive_path,
        entries.len()
    );
    Ok(PackageOutput {
        archive_path,
        sha256,
        entry_count: entries.len(),
    })
}

fn write_archive<W: Write + Seek>(sink: W, entries: &[&Entry]) -> Result<(), PackagingError> {
    let mut writer = ZipWriter::new(sink);
    let mut payloads = PayloadSource::default();
    for entry in entries {
        if entry.is_directory() {
            writer.add_directory(entry.name.as_str(), entry_options(0o755))?;
        } else {
            writer.start_file(entry.name.as_str(), entry_options(0o644))?;
            payloads.copy_into(&entry.data, &mut writer)?;
        }
    }
    writer.finish()?;
    Ok(())
}

fn entry_options(permissions: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(permissions)
}

/// Reads entry payloads, keeping source archives open across entries.
#[derive(Default)]
struct PayloadSource {
    archives: HashMap<Utf8PathBuf, ZipArchive<File>>,
}

impl PayloadSource {
    fn copy_into<W: Write>(&mut self, data: &EntryData, out: &mut W) -> Result<(), PackagingError> {
        match data {
            EntryData::Empty => {}
            EntryData::Bytes { bytes } => out.write_all(bytes)?,
            EntryData::File { path } => {
                let mut file = File::open(path)?;
                io::copy(&mut file, out)?;
            }
            EntryData::ArchiveMember { archive, member } => {
                let source = self.open(archive)?;
                let mut file = match source.by_name(member) {
                    Ok(file) => file,
                    Err(ZipError::FileNotFound) => {
                        return Err(PackagingError::MissingMember {
                            archive: archive.clone(),
                            member: member.clone(),
                        });
                    }
                    Err(err) => return Err(err.into()),
                };
                io::copy(&mut file, out)?;
            }
        }
        Ok(())
    }

    fn open(&mut self, archive: &Utf8Path) -> Result<&mut ZipArchive<File>, PackagingError> {
        match self.archives.entry(archive.to_owned()) {
            Slot::Occupied(slot) => Ok(slot.into_mut()),
            Slot::Vacant(slot) => {
                let source = ZipArchive::new(File::open(archive)?)?;
                Ok(slot.insert(source))
            }
        }
    }
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
