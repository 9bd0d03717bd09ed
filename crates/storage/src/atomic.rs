// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::StorageError;
use std::path::Path;

/// Replace `path` with `bytes` by writing a sibling temp file and renaming it
/// over the target.
///
/// Readers see either the previous contents or the new contents, never a
/// partial write. Temp names are unique per call so concurrent writers to the
/// same record do not clobber each other's temp file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("record");
    let tmp_path = parent.join(format!(".{name}.{}.tmp", nanoid::nanoid!(8)));

    if let Err(e) = std::fs::write(&tmp_path, bytes) {
        return Err(StorageError::io(&tmp_path, e));
    }
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(StorageError::io(path, e));
    }
    Ok(())
}

/// True for the temp files produced by [`write_atomic`].
pub(crate) fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.') && n.ends_with(".tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two");
    }

    #[test]
    fn leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        write_atomic(&dir.path().join("metadata.json"), b"{}").unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["metadata.json".to_string()]);
    }

    #[test]
    fn missing_parent_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_atomic(&dir.path().join("nope/metadata.json"), b"{}").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn temp_file_detection() {
        assert!(is_temp_file(Path::new("/x/.metadata.json.abcd1234.tmp")));
        assert!(!is_temp_file(Path::new("/x/metadata.json")));
    }
}
