/*! Integration tests for wikilog.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - backend: The Storage contract, run against every backend, plus backend-specific cases
 * - selector: Backend selection from environment variables
 * - accounts: Registration, login and sessions on top of Storage
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("wikilog=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod accounts;
mod backend;
mod helpers;
