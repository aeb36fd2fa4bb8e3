//! Environment configuration for backend selection.
//!
//! Every logical setting is an ordered list of variable names. The first name holding a
//! non-empty value (after trimming) wins, so precedence is visible in one table rather than
//! spread over conditionals.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::backend::FileStorage;
use crate::constants::{DATA_DIR_VAR, SERVERLESS_VAR};

/// Standard Redis connection string, platform-prefixed alias second.
pub const REDIS_URL_VARS: &[&str] = &["REDIS_URL", "storage_REDIS_URL"];

/// REST endpoint URL: Vercel KV, Vercel Storage (`storage_` prefix), then Upstash.
pub const REST_URL_VARS: &[&str] = &[
    "KV_REST_API_URL",
    "storage_KV_REST_API_URL",
    "UPSTASH_REDIS_REST_URL",
];

/// REST auth token, same order as [`REST_URL_VARS`].
pub const REST_TOKEN_VARS: &[&str] = &[
    "KV_REST_API_TOKEN",
    "storage_KV_REST_API_TOKEN",
    "UPSTASH_REDIS_REST_TOKEN",
];

/// Vendor-neutral REST endpoint names, only consulted by the REST client's own discovery.
pub const REST_FALLBACK_URL_VARS: &[&str] = &["REDIS_REST_URL"];

/// Vendor-neutral REST token names, only consulted by the REST client's own discovery.
pub const REST_FALLBACK_TOKEN_VARS: &[&str] = &["REDIS_REST_TOKEN"];

/// Variables reported by [`redis_status`], in display order.
pub const STATUS_VARS: &[&str] = &[
    "REDIS_URL",
    "storage_REDIS_URL",
    "KV_REST_API_URL",
    "storage_KV_REST_API_URL",
    "KV_REST_API_TOKEN",
    "storage_KV_REST_API_TOKEN",
    "UPSTASH_REDIS_REST_URL",
    "UPSTASH_REDIS_REST_TOKEN",
];

/// Source of configuration variables.
///
/// The process environment in production, a plain map in tests.
pub trait Env: Send + Sync {
    /// Raw value of `name`, or `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Env for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Env for HashMap<&'static str, &'static str> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }
}

/// Trimmed value of `name` if it is set and not blank.
pub fn non_empty(env: &dyn Env, name: &str) -> Option<String> {
    env.var(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First non-empty value among `names`, in order.
pub fn first_set(env: &dyn Env, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| non_empty(env, name))
}

/// The configured Redis connection string, whatever its scheme.
pub fn redis_url(env: &dyn Env) -> Option<String> {
    first_set(env, REDIS_URL_VARS)
}

/// REST URL and token when both are configured under the recognized aliases.
pub fn rest_credentials(env: &dyn Env) -> Option<(String, String)> {
    Some((first_set(env, REST_URL_VARS)?, first_set(env, REST_TOKEN_VARS)?))
}

/// Whether the serverless platform indicator is present.
pub fn is_serverless(env: &dyn Env) -> bool {
    non_empty(env, SERVERLESS_VAR).is_some()
}

/// File backend base directory: `WIKILOG_DATA_DIR` or `./data`.
pub fn data_dir(env: &dyn Env) -> PathBuf {
    non_empty(env, DATA_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(FileStorage::default_dir)
}

/// Whether a single diagnostic variable is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarState {
    Set,
    Empty,
}

impl VarState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarState::Set => "set",
            VarState::Empty => "empty",
        }
    }
}

/// Reports which storage variables are set, never their values.
pub fn redis_status(env: &dyn Env) -> Vec<(&'static str, VarState)> {
    STATUS_VARS
        .iter()
        .map(|name| {
            let state = if non_empty(env, name).is_some() {
                VarState::Set
            } else {
                VarState::Empty
            };
            (*name, state)
        })
        .collect()
}

/// [`redis_status`] as a JSON object, the shape served by the status endpoint.
pub fn redis_status_json(env: &dyn Env) -> serde_json::Value {
    let map = redis_status(env)
        .into_iter()
        .map(|(name, state)| (name.to_string(), serde_json::Value::from(state.as_str())))
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(map)
}

/// Redact credentials from a connection URL for safe logging.
pub fn redact_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "<unparsable-url>".to_string()
    }
}
