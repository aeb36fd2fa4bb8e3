use std::fs;

use serde_json::json;
use wikilog::{BackendKind, Resource, Storage, backend::FileStorage};

use super::contract;
use crate::helpers::file_storage;

#[tokio::test]
async fn test_file_backend_contract() {
    let (_dir, storage) = file_storage().await;
    assert_eq!(storage.kind(), BackendKind::File);
    contract::run_all(&storage).await;
}

#[tokio::test]
async fn test_empty_store_has_no_users() {
    let (_dir, storage) = file_storage().await;
    assert!(storage.get_all_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_persisted_layout() {
    let (dir, storage) = file_storage().await;
    storage.set_user("alice", "hash").await.unwrap();
    storage.set_session("sid", "alice").await.unwrap();
    storage.save_user_links("alice", &json!([1])).await.unwrap();
    storage.save_currently_reading("alice", &json!([2])).await.unwrap();

    let users: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("users.json")).unwrap()).unwrap();
    assert_eq!(users, json!({"alice": "hash"}));

    let sessions: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("sessions.json")).unwrap())
            .unwrap();
    assert_eq!(sessions, json!({"sid": "alice"}));

    assert!(dir.path().join("links/alice.json").is_file());
    assert!(dir.path().join("currently_reading/alice.json").is_file());
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let (dir, storage) = file_storage().await;
    storage.set_user("alice", "hash").await.unwrap();
    storage.save_log("alice", &json!([{"id": 1}])).await.unwrap();
    drop(storage);

    let reopened = FileStorage::open(dir.path()).await.unwrap();
    assert_eq!(
        reopened.get_user("alice").await.unwrap().as_deref(),
        Some("hash")
    );
    assert_eq!(reopened.get_log("alice").await.unwrap(), vec![json!({"id": 1})]);
}

#[tokio::test]
async fn test_corrupt_resource_reads_empty() {
    let (_dir, storage) = file_storage().await;

    let path = storage.resource_file(Resource::Log, "alice");
    fs::write(&path, "{definitely not json").unwrap();
    assert!(storage.get_log("alice").await.unwrap().is_empty());

    fs::write(&path, r#"{"an": "object"}"#).unwrap();
    assert!(storage.get_log("alice").await.unwrap().is_empty());

    // A valid save repairs the document
    storage.save_log("alice", &json!(["ok"])).await.unwrap();
    assert_eq!(storage.get_log("alice").await.unwrap(), vec![json!("ok")]);
}

#[tokio::test]
async fn test_corrupt_users_file_reads_empty() {
    let (dir, storage) = file_storage().await;
    fs::write(dir.path().join("users.json"), "[1, 2, 3]").unwrap();

    assert_eq!(storage.get_user("alice").await.unwrap(), None);
    assert!(storage.get_all_users().await.unwrap().is_empty());

    storage.set_user("alice", "hash").await.unwrap();
    assert_eq!(
        storage.get_user("alice").await.unwrap().as_deref(),
        Some("hash")
    );
}

#[tokio::test]
async fn test_corrupt_sessions_file_means_logged_out() {
    let (dir, storage) = file_storage().await;
    fs::write(dir.path().join("sessions.json"), "garbage").unwrap();
    assert_eq!(storage.get_session("sid").await.unwrap(), None);
    storage.delete_session("sid").await.unwrap();
}

#[tokio::test]
async fn test_recreates_deleted_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let base = dir.path().join("nested");
    let storage = FileStorage::open(&base).await.unwrap();

    fs::remove_dir_all(&base).unwrap();

    // Reads degrade to empty, writes recreate the tree
    assert!(storage.get_presets("alice").await.unwrap().is_empty());
    storage.save_presets("alice", &json!(["p"])).await.unwrap();
    storage.set_user("alice", "hash").await.unwrap();

    assert!(base.join("presets/alice.json").is_file());
    assert!(base.join("users.json").is_file());
    assert!(base.join("logs").is_dir());
}

#[tokio::test]
async fn test_non_list_save_creates_no_file() {
    let (_dir, storage) = file_storage().await;
    storage
        .save_link_lists("alice", &json!({"not": "a list"}))
        .await
        .unwrap();
    assert!(!storage.resource_file(Resource::LinkLists, "alice").exists());
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let (dir, storage) = file_storage().await;
    // A directory where the document should be makes the write fail
    fs::create_dir_all(dir.path().join("users.json")).unwrap();

    let err = storage.set_user("alice", "hash").await.unwrap_err();
    assert!(err.is_transport_error());
    // Reads still degrade instead of failing
    assert_eq!(storage.get_user("alice").await.unwrap(), None);
}

#[tokio::test]
async fn test_non_string_user_entries_are_kept() {
    let (dir, storage) = file_storage().await;
    let users_path = dir.path().join("users.json");
    fs::write(&users_path, r#"{"alice": "h-alice", "bob": 5}"#).unwrap();

    assert_eq!(
        storage.get_user("alice").await.unwrap().as_deref(),
        Some("h-alice")
    );
    assert_eq!(storage.get_user("bob").await.unwrap(), None);
    let all = storage.get_all_users().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all.get("alice").map(String::as_str), Some("h-alice"));

    storage.set_user("carol", "h-carol").await.unwrap();
    let users: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&users_path).unwrap()).unwrap();
    assert_eq!(
        users,
        json!({"alice": "h-alice", "bob": 5, "carol": "h-carol"})
    );
}

#[tokio::test]
async fn test_non_string_session_entries_are_kept() {
    let (dir, storage) = file_storage().await;
    let sessions_path = dir.path().join("sessions.json");
    fs::write(&sessions_path, r#"{"s1": "alice", "s2": null}"#).unwrap();

    assert_eq!(storage.get_session("s2").await.unwrap(), None);
    storage.delete_session("s1").await.unwrap();

    let sessions: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&sessions_path).unwrap()).unwrap();
    assert_eq!(sessions, json!({"s2": null}));
}

#[tokio::test]
async fn test_path_like_username_stays_in_resource_dir() {
    let (dir, storage) = file_storage().await;
    storage.set_user("alice", "hash").await.unwrap();

    storage.save_log("../users", &json!([1])).await.unwrap();
    storage.save_log("a/b", &json!([2])).await.unwrap();

    let users: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("users.json")).unwrap()).unwrap();
    assert_eq!(users, json!({"alice": "hash"}));

    let escaped = storage.resource_file(Resource::Log, "../users");
    assert_eq!(escaped, dir.path().join("logs").join("..%2Fusers.json"));
    assert!(escaped.is_file());
    assert!(dir.path().join("logs").join("a%2Fb.json").is_file());
    assert!(!dir.path().join("logs").join("a").exists());

    assert_eq!(storage.get_log("../users").await.unwrap(), vec![json!(1)]);
    assert_eq!(storage.get_log("a/b").await.unwrap(), vec![json!(2)]);
}
