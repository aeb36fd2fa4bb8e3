//! REST key-value backend (Upstash / Vercel KV protocol).
//!
//! Each command is a `POST` of a JSON array such as `["HGET", "wiki:users", "alice"]`
//! to the endpoint URL with a bearer token. The service answers
//! `{"result": ...}` on success and `{"error": "..."}` on failure.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::resource::{Resource, decode_list, type_name};
use crate::backend::{BackendKind, Storage};
use crate::config::{
    Env, REST_FALLBACK_TOKEN_VARS, REST_FALLBACK_URL_VARS, first_set, rest_credentials,
};
use crate::constants::{SESSIONS_KEY, USERS_KEY};

/// Reply envelope returned by the REST endpoint.
#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Storage on a token-authenticated REST key-value service.
///
/// Same layout and semantics as [`RedisUrlStorage`](super::RedisUrlStorage);
/// only the transport differs.
#[derive(Clone)]
pub struct RestStorage {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl fmt::Debug for RestStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStorage")
            .field("url", &self.url)
            .field("token", &"***")
            .finish()
    }
}

impl RestStorage {
    /// Creates a client for the endpoint at `url` authenticated with `token`.
    ///
    /// No request is made until the first operation.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            url,
            token: token.into(),
        }
    }

    /// Creates a client from credentials found in `env`, see [`discover`](Self::discover).
    pub fn from_env(env: &dyn Env) -> Result<Self> {
        let (url, token) = Self::discover(env)?;
        Ok(Self::new(url, token))
    }

    /// Finds the endpoint URL and token in `env`.
    ///
    /// The platform names (`KV_REST_API_*`, `storage_KV_REST_API_*`,
    /// `UPSTASH_REDIS_REST_*`) are tried first, then the vendor-neutral
    /// `REDIS_REST_URL` / `REDIS_REST_TOKEN` pair.
    pub fn discover(env: &dyn Env) -> Result<(String, String)> {
        if let Some(credentials) = rest_credentials(env) {
            return Ok(credentials);
        }
        match (
            first_set(env, REST_FALLBACK_URL_VARS),
            first_set(env, REST_FALLBACK_TOKEN_VARS),
        ) {
            (Some(url), Some(token)) => Ok((url, token)),
            _ => Err(BackendError::Configuration {
                reason: "REST storage requires KV_REST_API_URL/KV_REST_API_TOKEN or \
                         UPSTASH_REDIS_REST_URL/UPSTASH_REDIS_REST_TOKEN"
                    .to_string(),
            }
            .into()),
        }
    }

    /// Runs a single command and returns its `result` member.
    async fn command(&self, args: &[&str]) -> Result<Value> {
        let name = args.first().copied().unwrap_or_default().to_string();

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| BackendError::Rest {
                reason: format!("{name} request to {} failed", self.url),
                source: Some(e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| BackendError::Rest {
            reason: format!("failed to read {name} response"),
            source: Some(e),
        })?;

        match serde_json::from_str::<Reply>(&body) {
            Ok(Reply {
                error: Some(message),
                ..
            }) => Err(BackendError::RestCommand {
                command: name,
                message,
            }
            .into()),
            _ if !status.is_success() => Err(BackendError::Rest {
                reason: format!("{name} returned HTTP {status}"),
                source: None,
            }
            .into()),
            Ok(reply) => Ok(reply.result),
            Err(e) => Err(BackendError::UnexpectedResponse {
                command: name,
                reason: format!("body is not a JSON reply: {e}"),
            }
            .into()),
        }
    }

    async fn optional_string(&self, args: &[&str]) -> Result<Option<String>> {
        match self.command(args).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(unexpected(args, &other)),
        }
    }

    async fn string_map(&self, args: &[&str]) -> Result<HashMap<String, String>> {
        match self.command(args).await? {
            Value::Null => Ok(HashMap::new()),
            // Flat [field, value, field, value, ...]
            Value::Array(items) => {
                if items.len() % 2 != 0 {
                    return Err(BackendError::UnexpectedResponse {
                        command: args[0].to_string(),
                        reason: format!("odd number of elements ({})", items.len()),
                    }
                    .into());
                }
                items
                    .chunks(2)
                    .map(|pair| match (&pair[0], &pair[1]) {
                        (Value::String(k), Value::String(v)) => Ok((k.clone(), v.clone())),
                        (_, other) => Err(unexpected(args, other)),
                    })
                    .collect()
            }
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| match v {
                    Value::String(v) => Ok((k, v)),
                    other => Err(unexpected(args, &other)),
                })
                .collect(),
            other => Err(unexpected(args, &other)),
        }
    }
}

fn unexpected(args: &[&str], value: &Value) -> crate::Error {
    BackendError::UnexpectedResponse {
        command: args.first().copied().unwrap_or_default().to_string(),
        reason: format!("unexpected {} result", type_name(value)),
    }
    .into()
}

#[async_trait]
impl Storage for RestStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Rest
    }

    async fn get_user(&self, username: &str) -> Result<Option<String>> {
        self.optional_string(&["HGET", USERS_KEY, username]).await
    }

    async fn set_user(&self, username: &str, password_hash: &str) -> Result<()> {
        self.command(&["HSET", USERS_KEY, username, password_hash]).await?;
        Ok(())
    }

    async fn get_all_users(&self) -> Result<HashMap<String, String>> {
        self.string_map(&["HGETALL", USERS_KEY]).await
    }

    async fn set_session(&self, session_id: &str, username: &str) -> Result<()> {
        self.command(&["HSET", SESSIONS_KEY, session_id, username]).await?;
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<String>> {
        self.optional_string(&["HGET", SESSIONS_KEY, session_id]).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.command(&["HDEL", SESSIONS_KEY, session_id]).await?;
        Ok(())
    }

    async fn get_list(&self, resource: Resource, username: &str) -> Result<Vec<Value>> {
        let key = resource.key(username);
        let raw = self.optional_string(&["GET", &key]).await?;
        Ok(decode_list(raw.as_deref(), &key))
    }

    async fn save_list(&self, resource: Resource, username: &str, items: &Value) -> Result<()> {
        if !items.is_array() {
            return Ok(());
        }
        let key = resource.key(username);
        let encoded = serde_json::to_string(items)
            .map_err(|source| BackendError::SerializationFailed { source })?;
        self.command(&["SET", &key, &encoded]).await?;
        Ok(())
    }
}
