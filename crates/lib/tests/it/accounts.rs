use std::sync::Arc;

use tempfile::TempDir;
use wikilog::accounts::Accounts;
use wikilog::backend::RestStorage;

use crate::backend::mock_rest::{MockRest, TOKEN};
use crate::helpers::file_storage;

async fn file_accounts() -> (TempDir, Accounts) {
    let (dir, storage) = file_storage().await;
    (dir, Accounts::new(Arc::new(storage)))
}

#[tokio::test]
async fn test_register_login_logout() {
    let (_dir, accounts) = file_accounts().await;

    accounts.register("alice", "correct horse").await.unwrap();
    let session = accounts
        .login("alice", "correct horse")
        .await
        .unwrap()
        .expect("valid credentials should open a session");

    assert_eq!(
        accounts.verify_session(Some(&session)).await.unwrap().as_deref(),
        Some("alice")
    );

    accounts.logout(Some(&session)).await.unwrap();
    assert_eq!(accounts.verify_session(Some(&session)).await.unwrap(), None);
}

#[tokio::test]
async fn test_each_login_opens_a_new_session() {
    let (_dir, accounts) = file_accounts().await;
    accounts.register("alice", "pw").await.unwrap();

    let first = accounts.login("alice", "pw").await.unwrap().unwrap();
    let second = accounts.login("alice", "pw").await.unwrap().unwrap();
    assert_ne!(first, second);

    accounts.logout(Some(&first)).await.unwrap();
    assert_eq!(
        accounts.verify_session(Some(&second)).await.unwrap().as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn test_duplicate_registration_is_a_conflict() {
    let (_dir, accounts) = file_accounts().await;
    accounts.register("alice", "pw").await.unwrap();

    let err = accounts.register("alice", "other").await.unwrap_err();
    assert!(err.is_conflict());

    // The original password still works
    assert!(accounts.login("alice", "pw").await.unwrap().is_some());
    assert!(accounts.login("alice", "other").await.unwrap().is_none());
}

#[tokio::test]
async fn test_bad_credentials_do_not_log_in() {
    let (_dir, accounts) = file_accounts().await;
    accounts.register("alice", "pw").await.unwrap();

    assert_eq!(accounts.login("alice", "wrong").await.unwrap(), None);
    assert_eq!(accounts.login("nobody", "pw").await.unwrap(), None);
    assert_eq!(accounts.login("", "").await.unwrap(), None);
}

#[tokio::test]
async fn test_registration_validation() {
    let (_dir, accounts) = file_accounts().await;

    for (username, password) in [("", "pw"), ("   ", "pw"), ("alice", "")] {
        let err = accounts.register(username, password).await.unwrap_err();
        assert!(err.is_validation_error(), "{username:?}/{password:?}");
        assert!(!err.is_conflict());
    }

    for username in ["../escape", ".hidden", "has space", "slash/name"] {
        let err = accounts.register(username, "pw").await.unwrap_err();
        assert!(err.is_validation_error(), "{username:?} should be rejected");
    }

    assert!(accounts.storage().get_all_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_username_is_trimmed() {
    let (_dir, accounts) = file_accounts().await;
    accounts.register("  alice  ", "pw").await.unwrap();

    assert!(accounts.storage().user_exists("alice").await.unwrap());
    assert!(accounts.login("alice", "pw").await.unwrap().is_some());
    assert!(accounts.login(" alice ", "pw").await.unwrap().is_some());
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let (_dir, accounts) = file_accounts().await;
    accounts.register("alice", "plaintext-secret").await.unwrap();

    let stored = accounts
        .storage()
        .get_user("alice")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored, "plaintext-secret");
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn test_missing_sessions_are_logged_out() {
    let (_dir, accounts) = file_accounts().await;

    assert_eq!(accounts.verify_session(None).await.unwrap(), None);
    assert_eq!(accounts.verify_session(Some("")).await.unwrap(), None);
    assert_eq!(accounts.verify_session(Some("unknown")).await.unwrap(), None);

    accounts.logout(None).await.unwrap();
    accounts.logout(Some("unknown")).await.unwrap();
}

#[tokio::test]
async fn test_accounts_over_rest() {
    let mock = MockRest::start().await;
    let accounts = Accounts::new(Arc::new(RestStorage::new(&mock.url, TOKEN)));

    accounts.register("bob", "pw").await.unwrap();
    assert!(accounts.register("bob", "pw").await.unwrap_err().is_conflict());

    let session = accounts.login("bob", "pw").await.unwrap().unwrap();
    assert_eq!(
        mock.hash_field("wiki:sessions", &session).as_deref(),
        Some("bob")
    );

    accounts.logout(Some(&session)).await.unwrap();
    assert_eq!(mock.hash_field("wiki:sessions", &session), None);
}
