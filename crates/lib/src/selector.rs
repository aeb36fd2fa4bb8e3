//! Backend selection from ambient configuration.
//!
//! Runs once at process start. The first matching rule wins:
//!
//! 1. `REDIS_URL` / `storage_REDIS_URL` starting with `redis://`: [`RedisUrlStorage`].
//! 2. REST URL and token under any recognized alias: [`RestStorage`].
//! 3. Serverless platform indicator (`VERCEL`) set: [`RestStorage`] through its own
//!    credential discovery, or a configuration error. Local files are never used there.
//! 4. Otherwise: [`FileStorage`].
//!
//! Selection is split into a pure [`plan`] over an [`Env`] and [`BackendPlan::open`],
//! which performs the construction (and, for Redis, the connection).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;
use crate::backend::{BackendError, BackendKind, FileStorage, RedisUrlStorage, RestStorage, Storage};
use crate::config::{self, Env, redact_url};
use crate::constants::{REDIS_URL_SCHEME, STATUS_ENDPOINT};

/// The backend chosen for this process, before it is constructed.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendPlan {
    /// Connect to a Redis server.
    RedisUrl { url: String },
    /// Talk to a REST key-value endpoint.
    Rest { url: String, token: String },
    /// Store JSON files under `dir`.
    File { dir: PathBuf },
}

impl BackendPlan {
    /// The kind of backend this plan constructs.
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendPlan::RedisUrl { .. } => BackendKind::RedisUrl,
            BackendPlan::Rest { .. } => BackendKind::Rest,
            BackendPlan::File { .. } => BackendKind::File,
        }
    }

    /// Constructs the planned backend.
    pub async fn open(self) -> Result<Arc<dyn Storage>> {
        tracing::info!("Opening {} storage backend: {}", self.kind(), self);
        let storage: Arc<dyn Storage> = match self {
            BackendPlan::RedisUrl { url } => Arc::new(RedisUrlStorage::connect(&url).await?),
            BackendPlan::Rest { url, token } => Arc::new(RestStorage::new(url, token)),
            BackendPlan::File { dir } => Arc::new(FileStorage::open(dir).await?),
        };
        Ok(storage)
    }
}

/// Safe to log: credentials are redacted and tokens are never shown.
impl fmt::Display for BackendPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendPlan::RedisUrl { url } => write!(f, "{}", redact_url(url)),
            BackendPlan::Rest { url, .. } => write!(f, "{}", redact_url(url)),
            BackendPlan::File { dir } => write!(f, "{}", dir.display()),
        }
    }
}

impl fmt::Debug for BackendPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackendPlan::{}({})", self.kind(), self)
    }
}

/// Decides which backend to use.
///
/// `data_dir` overrides the file backend directory; when `None` it comes from
/// `WIKILOG_DATA_DIR` or defaults to `./data`.
pub fn plan(env: &dyn Env, data_dir: Option<&Path>) -> Result<BackendPlan> {
    if let Some(url) = config::redis_url(env) {
        if url.starts_with(REDIS_URL_SCHEME) {
            return Ok(BackendPlan::RedisUrl { url });
        }
        tracing::warn!(
            "Ignoring Redis URL without {} scheme: {}",
            REDIS_URL_SCHEME,
            redact_url(&url)
        );
    }

    if let Some((url, token)) = config::rest_credentials(env) {
        return Ok(BackendPlan::Rest { url, token });
    }

    if config::is_serverless(env) {
        return match RestStorage::discover(env) {
            Ok((url, token)) => Ok(BackendPlan::Rest { url, token }),
            Err(e) => Err(BackendError::Configuration {
                reason: format!(
                    "Redis required on the serverless platform. Redeploy the project after \
                     connecting Upstash Redis in Storage. Visit {STATUS_ENDPOINT} to see which \
                     env vars are available. ({e})"
                ),
            }
            .into()),
        };
    }

    let dir = data_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config::data_dir(env));
    Ok(BackendPlan::File { dir })
}

/// Plans and constructs the process-wide backend.
pub async fn select(env: &dyn Env, data_dir: Option<&Path>) -> Result<Arc<dyn Storage>> {
    plan(env, data_dir)?.open().await
}
