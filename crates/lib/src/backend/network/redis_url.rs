//! Redis backend addressed by a `redis://` connection URL.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde_json::Value;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::resource::{Resource, decode_list};
use crate::backend::{BackendKind, Storage};
use crate::config::redact_url;
use crate::constants::{SESSIONS_KEY, USERS_KEY};

/// Extension trait for redis Result types to simplify error handling.
///
/// Converts a `RedisError` to `BackendError::Redis` with a context message.
pub(crate) trait RedisResultExt<T> {
    /// Convert redis error to BackendError with context message.
    fn redis_context(self, context: &str) -> Result<T>;
}

impl<T> RedisResultExt<T> for std::result::Result<T, redis::RedisError> {
    fn redis_context(self, context: &str) -> Result<T> {
        self.map_err(|source| {
            BackendError::Redis {
                reason: format!("{context}: {source}"),
                source,
            }
            .into()
        })
    }
}

/// Storage on a standard Redis server (Redis Cloud, self-hosted, ...).
///
/// The connection is established once in [`connect`](Self::connect) and is
/// never re-established. It is multiplexed, so every operation works on a
/// cheap clone of it and the storage can be shared across tasks without locking.
#[derive(Clone)]
pub struct RedisUrlStorage {
    conn: MultiplexedConnection,
}

impl RedisUrlStorage {
    /// Connects to the server at `url`.
    ///
    /// A single attempt is made; an unreachable server is reported immediately.
    /// Values are read back as UTF-8 strings.
    pub async fn connect(url: &str) -> Result<Self> {
        let display_url = redact_url(url);
        let client = redis::Client::open(url)
            .redis_context(&format!("invalid connection URL {display_url}"))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .redis_context(&format!("failed to connect to {display_url}"))?;
        tracing::info!("Connected to Redis at {}", display_url);
        Ok(Self { conn })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

#[async_trait]
impl Storage for RedisUrlStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::RedisUrl
    }

    async fn get_user(&self, username: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn()
            .hget(USERS_KEY, username)
            .await
            .redis_context("HGET users")?;
        Ok(value)
    }

    async fn set_user(&self, username: &str, password_hash: &str) -> Result<()> {
        let _: () = self
            .conn()
            .hset(USERS_KEY, username, password_hash)
            .await
            .redis_context("HSET users")?;
        Ok(())
    }

    async fn get_all_users(&self) -> Result<HashMap<String, String>> {
        let users: HashMap<String, String> = self
            .conn()
            .hgetall(USERS_KEY)
            .await
            .redis_context("HGETALL users")?;
        Ok(users)
    }

    async fn set_session(&self, session_id: &str, username: &str) -> Result<()> {
        let _: () = self
            .conn()
            .hset(SESSIONS_KEY, session_id, username)
            .await
            .redis_context("HSET sessions")?;
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn()
            .hget(SESSIONS_KEY, session_id)
            .await
            .redis_context("HGET sessions")?;
        Ok(value)
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let _: () = self
            .conn()
            .hdel(SESSIONS_KEY, session_id)
            .await
            .redis_context("HDEL sessions")?;
        Ok(())
    }

    async fn get_list(&self, resource: Resource, username: &str) -> Result<Vec<Value>> {
        let key = resource.key(username);
        let raw: Option<String> = self
            .conn()
            .get(&key)
            .await
            .redis_context(&format!("GET {key}"))?;
        Ok(decode_list(raw.as_deref(), &key))
    }

    async fn save_list(&self, resource: Resource, username: &str, items: &Value) -> Result<()> {
        if !items.is_array() {
            return Ok(());
        }
        let key = resource.key(username);
        let encoded = serde_json::to_string(items)
            .map_err(|source| BackendError::SerializationFailed { source })?;
        let _: () = self
            .conn()
            .set(&key, encoded)
            .await
            .redis_context(&format!("SET {key}"))?;
        Ok(())
    }
}
