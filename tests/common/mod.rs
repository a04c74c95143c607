use std::path::PathBuf;
use tempfile::TempDir;

/// Path to a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Write a snapshot document to a fresh temp dir, returning the dir handle and file path.
/// The caller must hold onto `TempDir` to keep the temp directory alive.
#[allow(dead_code)]
pub fn write_snapshot(json: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, json).unwrap();
    (dir, path)
}
