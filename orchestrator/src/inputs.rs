//! Loading module descriptors written by the external build tool.
//!
//! The descriptor file is JSON of the form `{ "modules": [ ... ] }`. Paths
//! inside it are resolved against the descriptor's directory. Compilation
//! outputs that name a `directory` and resolved artifacts that name an
//! `archive` are expanded into entries at load time.

use crate::error::{OrchestratorError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::Deserialize;
use std::fs::{self, File};
use trellis_common::{CompileOutcome, Entry, EntryData, Module};
use zip::ZipArchive;

/// Default descriptor file name.
pub const DESCRIPTOR_FILE_NAME: &str = "modules.json";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptorFile {
    modules: Vec<Module>,
}

/// Load module descriptors from `path`, in declaration order.
///
/// # Errors
///
/// Returns [`OrchestratorError::Descriptors`] if the file cannot be read or
/// parsed, or a referenced directory or archive cannot be listed.
pub fn load_descriptors(path: &Utf8Path) -> Result<Vec<Module>> {
    let contents = fs::read_to_string(path).map_err(|err| descriptor_error(path, &err))?;
    let file: DescriptorFile =
        serde_json::from_str(&contents).map_err(|err| descriptor_error(path, &err))?;
    let base = path.parent().unwrap_or_else(|| Utf8Path::new(""));

    let modules = file
        .modules
        .into_iter()
        .map(|module| materialise(module, base))
        .collect::<Result<Vec<_>>>()?;
    info!("loaded {} module descriptor(s) from {path}", modules.len());
    Ok(modules)
}

/// Resolve relative paths of `module` against `base` and expand output
/// directories and dependency archives into entries.
///
/// # Errors
///
/// Returns [`OrchestratorError::Descriptors`] if a directory or archive
/// cannot be listed.
pub fn materialise(mut module: Module, base: &Utf8Path) -> Result<Module> {
    for target in &mut module.targets {
        if let CompileOutcome::Compiled(output) = &mut target.output {
            resolve_entries(&mut output.entries, base);
            if let Some(directory) = output.directory.take() {
                let directory = resolve(base, &directory);
                output.entries.extend(entries_from_dir(&directory)?);
            }
        }
    }

    if let Some(closure) = &mut module.dependency_closure {
        for artifact in &mut closure.artifacts {
            resolve_entries(&mut artifact.entries, base);
            if let Some(archive) = artifact.archive.take() {
                let archive = resolve(base, &archive);
                artifact.entries.extend(entries_from_archive(&archive)?);
            }
        }
    }

    debug!("materialised module {}", module.id);
    Ok(module)
}

/// Entries for every file below `directory`, named by their slash-separated
/// relative path and sorted by name.
///
/// # Errors
///
/// Returns [`OrchestratorError::Descriptors`] if the directory cannot be
/// walked.
pub fn entries_from_dir(directory: &Utf8Path) -> Result<Vec<Entry>> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(directory.as_str()));
    let paths = glob::glob(&pattern).map_err(|err| descriptor_error(directory, &err))?;

    let mut entries = Vec::new();
    for path in paths {
        let path = path.map_err(|err| descriptor_error(directory, &err))?;
        if !path.is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(path).map_err(|path| OrchestratorError::Descriptors {
            path: directory.to_owned(),
            reason: format!("non UTF-8 path {}", path.display()),
        })?;
        let Ok(relative) = path.strip_prefix(directory) else {
            continue;
        };
        let name = relative
            .components()
            .map(|component| component.as_str())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(Entry::file(name, path));
    }
    entries.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(entries)
}

/// Entries for every member of the zip or jar file at `archive`, in archive
/// order.
///
/// # Errors
///
/// Returns [`OrchestratorError::Descriptors`] if the archive cannot be read.
pub fn entries_from_archive(archive: &Utf8Path) -> Result<Vec<Entry>> {
    let file = File::open(archive).map_err(|err| descriptor_error(archive, &err))?;
    let mut zip = ZipArchive::new(file).map_err(|err| descriptor_error(archive, &err))?;
    (0..zip.len())
        .map(|index| {
            let member = zip
                .by_index_raw(index)
                .map_err(|err| descriptor_error(archive, &err))?;
            Ok(Entry::archive_member(archive, member.name()))
        })
        .collect()
}

fn resolve_entries(entries: &mut [Entry], base: &Utf8Path) {
    for entry in entries {
        match &mut entry.data {
            EntryData::File { path } => *path = resolve(base, path),
            EntryData::ArchiveMember { archive, .. } => *archive = resolve(base, archive),
            EntryData::Empty | EntryData::Bytes { .. } => {}
        }
    }
}

fn resolve(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        base.join(path)
    }
}

fn descriptor_error(path: &Utf8Path, err: &dyn std::fmt::Display) -> OrchestratorError {
    OrchestratorError::Descriptors {
        path: path.to_owned(),
        reason: err.to_string(),
    }
}
