use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read a whole UTF-8 document. A missing file is a precondition failure.
pub fn read_document(path: &Path) -> Result<String, StoreError> {
    if !path.is_file() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `path` with `contents` through a temp file in the same directory,
/// so an interrupted write never leaves a truncated document behind.
pub fn write_document(path: &Path, contents: &str) -> Result<(), StoreError> {
    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions()).map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote document");
    Ok(())
}

/// Rewrite `path` only when `contents` differs from what is on disk.
/// Returns whether the file changed.
pub fn write_if_changed(path: &Path, original: &str, contents: &str) -> Result<bool, StoreError> {
    if original == contents {
        return Ok(false);
    }
    write_document(path, contents)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("guides.ts");
        fs::write(&path, "old").unwrap();

        write_document(&path, "new contents\n").unwrap();
        assert_eq!(read_document(&path).unwrap(), "new contents\n");

        // no temp files left behind
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn missing_document_is_reported() {
        let dir = tempdir().unwrap();
        let err = read_document(&dir.path().join("nope.ts")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(err.to_string().contains("nope.ts"));
    }

    #[test]
    fn unchanged_content_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.tsx");
        fs::write(&path, "same").unwrap();

        assert!(!write_if_changed(&path, "same", "same").unwrap());
        assert!(write_if_changed(&path, "same", "other").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "other");
    }
}
