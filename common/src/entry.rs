//! Named entries produced by compilation or supplied by resolved artifacts.
//!
//! An [`Entry`] is one path inside a packaged artifact (for example
//! `net/example/Api.class` or `META-INF/SIGNER.SF`). Its payload is described
//! by [`EntryData`] so large outputs can be referenced on disk instead of
//! being held in memory.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Where the bytes of an entry come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EntryData {
    /// No payload; the entry is written with zero length.
    #[default]
    Empty,
    /// Payload held in memory.
    Bytes {
        /// The entry contents.
        bytes: Vec<u8>,
    },
    /// Payload read from a file on disk.
    File {
        /// Path of the file holding the contents.
        path: Utf8PathBuf,
    },
    /// Payload read from a member of a zip or jar archive.
    ArchiveMember {
        /// Path of the archive.
        archive: Utf8PathBuf,
        /// Name of the member inside the archive.
        member: String,
    },
}

/// A named entry of a compilation output or resolved artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Slash-separated path of the entry inside an artifact.
    pub name: String,
    /// Source of the entry's bytes.
    #[serde(default)]
    pub data: EntryData,
}

impl Entry {
    /// Create an entry without a payload.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: EntryData::Empty,
        }
    }

    /// Create an entry holding `bytes` in memory.
    #[must_use]
    pub fn bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: EntryData::Bytes {
                bytes: bytes.into(),
            },
        }
    }

    /// Create an entry whose payload is the file at `path`.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            data: EntryData::File { path: path.into() },
        }
    }

    /// Create an entry whose payload is `member` inside `archive`.
    #[must_use]
    pub fn archive_member(archive: impl Into<Utf8PathBuf>, member: impl Into<String>) -> Self {
        let member = member.into();
        Self {
            name: member.clone(),
            data: EntryData::ArchiveMember {
                archive: archive.into(),
                member,
            },
        }
    }

    /// Whether the entry names a directory rather than a file.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

impl From<&str> for Entry {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_entries_have_no_payload() {
        let entry = Entry::named("a/B.class");
        assert_eq!(entry.data, EntryData::Empty);
        assert!(!entry.is_directory());
    }

    #[test]
    fn archive_member_uses_member_as_name() {
        let entry = Entry::archive_member("/repo/dep.jar", "org/dep/Dep.class");
        assert_eq!(entry.name, "org/dep/Dep.class");
        assert!(matches!(entry.data, EntryData::ArchiveMember { .. }));
    }

    #[test]
    fn payload_defaults_to_empty_when_deserialising() {
        let entry: Entry = serde_json::from_str(r#"{"name": "META-INF/"}"#).expect("valid entry");
        assert_eq!(entry, Entry::named("META-INF/"));
        assert!(entry.is_directory());
    }

    #[test]
    fn tagged_payload_round_trips_through_json() {
        let json = r#"{"name": "x.txt", "data": {"kind": "file", "path": "/tmp/x.txt"}}"#;
        let entry: Entry = serde_json::from_str(json).expect("valid entry");
        assert_eq!(entry, Entry::file("x.txt", "/tmp/x.txt"));
    }
}
