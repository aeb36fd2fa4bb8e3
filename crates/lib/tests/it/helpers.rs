use std::collections::HashMap;

use tempfile::TempDir;
use wikilog::backend::FileStorage;

/// Build an environment from literal pairs
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Create a file backend in a fresh temporary directory
///
/// Keep the returned `TempDir` alive for as long as the storage is used.
pub async fn file_storage() -> (TempDir, FileStorage) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let storage = FileStorage::open(dir.path())
        .await
        .expect("Failed to open file storage");
    (dir, storage)
}

/// A name no other test uses, for backends shared between test runs
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}
