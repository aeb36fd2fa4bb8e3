//! Constants used throughout the wikilog library.
//!
//! This module provides central definitions for persisted names: remote keys, file names,
//! and the environment variables the selector understands.

/// Remote hash holding `username -> password hash`.
pub const USERS_KEY: &str = "wiki:users";

/// Remote hash holding `session id -> username`.
pub const SESSIONS_KEY: &str = "wiki:sessions";

/// Prefix shared by every remote key.
pub const KEY_PREFIX: &str = "wiki";

/// File holding the users object in the file backend.
pub const USERS_FILE: &str = "users.json";

/// File holding the sessions object in the file backend.
pub const SESSIONS_FILE: &str = "sessions.json";

/// Default base directory of the file backend.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Only connection strings with this scheme select the Redis URL backend.
pub const REDIS_URL_SCHEME: &str = "redis://";

/// Set by the serverless hosting platform; local files are never used when present.
pub const SERVERLESS_VAR: &str = "VERCEL";

/// Overrides the file backend base directory.
pub const DATA_DIR_VAR: &str = "WIKILOG_DATA_DIR";

/// Diagnostic endpoint reporting which storage variables are set.
pub const STATUS_ENDPOINT: &str = "/api/redis-status";
