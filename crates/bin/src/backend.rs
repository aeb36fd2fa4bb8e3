//! Backend creation for the binary's commands.

use std::sync::Arc;

use wikilog::{BackendPlan, ProcessEnv, Storage};

use crate::cli::StorageArgs;

/// Decide which backend the process environment selects, without opening it.
pub fn plan_backend(args: &StorageArgs) -> wikilog::Result<BackendPlan> {
    wikilog::plan(&ProcessEnv, args.data_dir.as_deref())
}

/// Create the storage backend selected by the process environment
pub async fn create_backend(args: &StorageArgs) -> wikilog::Result<Arc<dyn Storage>> {
    let plan = plan_backend(args)?;
    let kind = plan.kind();
    match plan.open().await {
        Ok(storage) => {
            tracing::info!("Using {kind} storage backend");
            Ok(storage)
        }
        Err(e) => {
            tracing::error!("Failed to open {kind} storage backend: {e}");
            Err(e)
        }
    }
}
