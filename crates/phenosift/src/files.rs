//! File access collaborator interface and local-filesystem implementation.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};

/// A file submitted to the import flow: a path, a numeric handle from the
/// host's upload machinery, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    Path(PathBuf),
    Handle(u64),
    Unset,
}

/// Resolved properties of a submitted file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub mime_type: String,
    pub extension: String,
}

/// Collaborator supplying file properties and readable streams.
pub trait FileAccess: Send + Sync {
    /// Resolve a file reference to its properties. `Ok(None)` means the
    /// reference does not point at an existing file; that is a data
    /// condition, not an error.
    fn resolve(&self, file: &FileRef) -> Result<Option<FileInfo>>;

    /// Open a resolved file for reading. The returned reader is dropped,
    /// and with it the handle closed, on every exit path.
    fn open(&self, info: &FileInfo) -> Result<Box<dyn Read>>;
}

/// Extension to valid MIME types, per import flow conventions.
static EXTENSION_MIME_TYPES: Lazy<IndexMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        IndexMap::from([
            ("tsv", &["text/tab-separated-values"] as &[&str]),
            ("csv", &["text/csv"] as &[&str]),
            ("txt", &["text/plain"] as &[&str]),
        ])
    });

/// MIME types an extension is allowed to carry.
pub fn mime_types_for_extension(extension: &str) -> Option<&'static [&'static str]> {
    EXTENSION_MIME_TYPES
        .get(extension.to_lowercase().as_str())
        .copied()
}

/// Magic numbers that betray a binary file behind a tabular MIME type.
const BINARY_SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF", "PDF"),
    (b"PK\x03\x04", "ZIP"),
    (b"\x1f\x8b", "GZIP"),
    (b"\x89PNG", "PNG"),
];

/// Match the first bytes of a file against known binary signatures.
pub fn binary_signature(prefix: &[u8]) -> Option<&'static str> {
    BINARY_SIGNATURES
        .iter()
        .find(|(magic, _)| prefix.starts_with(magic))
        .map(|(_, name)| *name)
}

/// Local-filesystem implementation of [`FileAccess`].
///
/// Numeric handles are resolved through an internal map populated via
/// [`LocalFiles::register`]; the host's upload layer would normally do this.
#[derive(Debug, Default)]
pub struct LocalFiles {
    handles: IndexMap<u64, PathBuf>,
}

impl LocalFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a numeric handle with a path.
    pub fn register(&mut self, handle: u64, path: impl Into<PathBuf>) {
        self.handles.insert(handle, path.into());
    }
}

impl FileAccess for LocalFiles {
    fn resolve(&self, file: &FileRef) -> Result<Option<FileInfo>> {
        let path = match file {
            FileRef::Path(path) => path.clone(),
            FileRef::Handle(handle) => match self.handles.get(handle) {
                Some(path) => path.clone(),
                None => return Ok(None),
            },
            FileRef::Unset => return Ok(None),
        };

        if !path.is_file() {
            return Ok(None);
        }

        let metadata = std::fs::metadata(&path).map_err(|e| SiftError::Io {
            path: path.clone(),
            source: e,
        })?;

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mime_type = mime_types_for_extension(&extension)
            .and_then(|types| types.first().copied())
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Some(FileInfo {
            path,
            size_bytes: metadata.len(),
            mime_type,
            extension,
        }))
    }

    fn open(&self, info: &FileInfo) -> Result<Box<dyn Read>> {
        let file = File::open(&info.path).map_err(|e| SiftError::Io {
            path: info.path.clone(),
            source: e,
        })?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_binary_signature_detection() {
        assert_eq!(binary_signature(b"%PDF-1.7\n"), Some("PDF"));
        assert_eq!(binary_signature(b"PK\x03\x04rest"), Some("ZIP"));
        assert_eq!(binary_signature(b"Trait Name\tMethod"), None);
        assert_eq!(binary_signature(b""), None);
    }

    #[test]
    fn test_extension_mime_mapping() {
        assert_eq!(
            mime_types_for_extension("tsv"),
            Some(&["text/tab-separated-values"][..])
        );
        assert_eq!(mime_types_for_extension("TSV").unwrap()[0], "text/tab-separated-values");
        assert!(mime_types_for_extension("pdf").is_none());
    }

    #[test]
    fn test_resolve_path() {
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        file.write_all(b"Trait Name\tMethod\tUnit\n").unwrap();

        let files = LocalFiles::new();
        let info = files
            .resolve(&FileRef::Path(file.path().to_path_buf()))
            .unwrap()
            .unwrap();

        assert_eq!(info.extension, "tsv");
        assert_eq!(info.mime_type, "text/tab-separated-values");
        assert!(info.size_bytes > 0);
    }

    #[test]
    fn test_resolve_handle() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(b"a,b\n").unwrap();

        let mut files = LocalFiles::new();
        files.register(12, file.path());

        let info = files.resolve(&FileRef::Handle(12)).unwrap().unwrap();
        assert_eq!(info.extension, "csv");

        assert!(files.resolve(&FileRef::Handle(99)).unwrap().is_none());
    }

    #[test]
    fn test_resolve_unset_and_missing() {
        let files = LocalFiles::new();
        assert!(files.resolve(&FileRef::Unset).unwrap().is_none());
        assert!(files
            .resolve(&FileRef::Path(PathBuf::from("/no/such/file.tsv")))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_open_streams_content() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(b"a,b,c\n").unwrap();

        let files = LocalFiles::new();
        let info = files
            .resolve(&FileRef::Path(file.path().to_path_buf()))
            .unwrap()
            .unwrap();

        let mut reader = files.open(&info).unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "a,b,c\n");
    }
}
