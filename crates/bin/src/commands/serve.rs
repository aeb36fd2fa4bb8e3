//! Serve command - runs the wikilog API server.
//!
//! JSON API for accounts and the five per-user resources. Static pages are
//! served by the hosting platform; `/` only redirects to them.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies, cookie::SameSite};
use wikilog::{ProcessEnv, Resource, accounts::Accounts, config, constants::STATUS_ENDPOINT};

use crate::backend::create_backend;
use crate::cli::ServeArgs;

const SESSION_COOKIE: &str = "wiki_session";
const SESSION_MAX_AGE: time::Duration = time::Duration::days(30);

/// Shared application state
#[derive(Clone)]
struct AppState {
    storage: StorageState,
}

/// The backend opened at startup.
///
/// If opening fails the server still starts and every storage route answers
/// 503 with the reason.
#[derive(Clone)]
enum StorageState {
    Ready(Accounts),
    Unavailable(Arc<str>),
}

impl AppState {
    fn accounts(&self) -> Result<&Accounts, ApiError> {
        match &self.storage {
            StorageState::Ready(accounts) => Ok(accounts),
            StorageState::Unavailable(reason) => Err(ApiError::Unavailable(reason.to_string())),
        }
    }
}

/// Login and registration body
#[derive(Deserialize)]
struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

/// Error reply, rendered as `{"error": "..."}`
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str),
    Unavailable(String),
}

impl From<wikilog::Error> for ApiError {
    fn from(err: wikilog::Error) -> Self {
        if err.is_validation_error() {
            ApiError::BadRequest(err.to_string())
        } else if err.is_configuration_error() {
            ApiError::Unavailable(err.to_string())
        } else {
            tracing::error!("Storage error: {err}");
            ApiError::Unavailable(format!("Storage error: {err}"))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.to_string()),
            ApiError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Run the wikilog server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let storage = match create_backend(&args.storage).await {
        Ok(storage) => StorageState::Ready(Accounts::new(storage)),
        Err(e) => {
            tracing::error!("Storage unavailable, API requests will fail: {e}");
            StorageState::Unavailable(Arc::from(e.to_string()))
        }
    };

    let app = router(storage);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("wikilog API server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET  /health              - Server and storage health");
    println!("  GET  {STATUS_ENDPOINT}     - Which storage variables are set");
    println!("  POST /api/register        - Create an account");
    println!("  POST /api/login           - Log in (sets {SESSION_COOKIE} cookie)");
    println!("  POST /api/logout          - Log out");
    println!("  GET  /api/me              - Current username");
    for resource in Resource::ALL {
        println!("  GET|POST {:<21}- {}", resource_path(resource), resource.name());
    }
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let (Ok(mut sigterm), Ok(mut sigint)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) else {
        tracing::warn!("Failed to set up signal handlers, waiting for Ctrl+C only");
        let _ = tokio::signal::ctrl_c().await;
        return;
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

fn router(storage: StorageState) -> Router {
    Router::new()
        .route("/", get(handle_root_request))
        .route("/health", get(handle_health_endpoint))
        .route(STATUS_ENDPOINT, get(handle_redis_status))
        .route("/api/register", post(handle_register))
        .route("/api/login", post(handle_login))
        .route("/api/logout", post(handle_logout))
        .route("/api/me", get(handle_me))
        .merge(resource_routes())
        .layer(CookieManagerLayer::new())
        .with_state(AppState { storage })
}

// ============================================================================
// Account Handlers
// ============================================================================

/// Handler for GET / - Redirect to the static front page
async fn handle_root_request() -> Redirect {
    Redirect::temporary("/index.html")
}

/// Handler for GET /health
async fn handle_health_endpoint(State(state): State<AppState>) -> Response {
    match &state.storage {
        StorageState::Ready(accounts) => Json(json!({
            "status": "healthy",
            "backend": accounts.storage().kind().to_string(),
        }))
        .into_response(),
        StorageState::Unavailable(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "error": &**reason })),
        )
            .into_response(),
    }
}

/// Handler for GET /api/redis-status - variable names only, never values
async fn handle_redis_status() -> Json<Value> {
    Json(config::redis_status_json(&ProcessEnv))
}

/// Handler for POST /api/register
async fn handle_register(
    State(state): State<AppState>,
    Json(form): Json<Credentials>,
) -> Result<Json<Value>, ApiError> {
    let accounts = state.accounts()?;
    accounts
        .register(
            form.username.as_deref().unwrap_or_default(),
            form.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Handler for POST /api/login - Opens a session and sets the cookie
async fn handle_login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(form): Json<Credentials>,
) -> Result<Json<Value>, ApiError> {
    let accounts = state.accounts()?;
    let username = form.username.as_deref().unwrap_or_default().trim();
    let password = form.password.as_deref().unwrap_or_default();

    let session_id = accounts
        .login(username, password)
        .await?
        .ok_or(ApiError::Unauthorized("Invalid username or password"))?;

    let mut cookie = Cookie::new(SESSION_COOKIE, session_id);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(SESSION_MAX_AGE);
    cookie.set_path("/");
    cookies.add(cookie);

    Ok(Json(json!({ "ok": true, "username": username })))
}

/// Handler for POST /api/logout
async fn handle_logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Value>, ApiError> {
    state
        .accounts()?
        .logout(session_id(&cookies).as_deref())
        .await?;

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    cookies.remove(removal);
    Ok(Json(json!({ "ok": true })))
}

/// Handler for GET /api/me - `{"username": null}` when logged out
async fn handle_me(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Value>, ApiError> {
    let username = state
        .accounts()?
        .verify_session(session_id(&cookies).as_deref())
        .await?;
    Ok(Json(json!({ "username": username })))
}

fn session_id(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

async fn current_user(accounts: &Accounts, cookies: &Cookies) -> Result<String, ApiError> {
    accounts
        .verify_session(session_id(cookies).as_deref())
        .await?
        .ok_or(ApiError::Unauthorized("Not logged in"))
}

// ============================================================================
// Resource Handlers
// ============================================================================

fn resource_path(resource: Resource) -> &'static str {
    match resource {
        Resource::Log => "/api/read-log",
        Resource::UserLinks => "/api/user-links",
        Resource::LinkLists => "/api/link-lists",
        Resource::Presets => "/api/presets",
        Resource::CurrentlyReading => "/api/currently-reading",
    }
}

/// JSON member carrying the list in requests and responses
fn body_field(resource: Resource) -> &'static str {
    match resource {
        Resource::Log => "log",
        Resource::UserLinks => "links",
        Resource::LinkLists => "linkLists",
        Resource::Presets => "presets",
        Resource::CurrentlyReading => "items",
    }
}

/// Error message for a body whose list member is not a list.
fn invalid_message(resource: Resource) -> &'static str {
    match resource {
        Resource::Log => "Invalid log",
        Resource::UserLinks => "Invalid links",
        Resource::LinkLists => "Invalid link lists",
        Resource::Presets => "Invalid presets",
        Resource::CurrentlyReading => "Invalid items",
    }
}

fn resource_routes() -> Router<AppState> {
    let mut router = Router::new();
    for resource in Resource::ALL {
        router = router.route(
            resource_path(resource),
            get(move |State(state): State<AppState>, cookies: Cookies| {
                load_resource(state, cookies, resource)
            })
            .post(
                move |State(state): State<AppState>, cookies: Cookies, Json(body): Json<Value>| {
                    store_resource(state, cookies, resource, body)
                },
            ),
        );
    }
    router
}

async fn load_resource(
    state: AppState,
    cookies: Cookies,
    resource: Resource,
) -> Result<Json<Value>, ApiError> {
    let accounts = state.accounts()?;
    let username = current_user(accounts, &cookies).await?;
    let items = accounts.storage().get_list(resource, &username).await?;

    let mut body = serde_json::Map::new();
    body.insert(body_field(resource).to_string(), Value::Array(items));
    Ok(Json(Value::Object(body)))
}

/// A missing member saves an empty list; any other non-list is rejected.
async fn store_resource(
    state: AppState,
    cookies: Cookies,
    resource: Resource,
    body: Value,
) -> Result<Json<Value>, ApiError> {
    let accounts = state.accounts()?;
    let username = current_user(accounts, &cookies).await?;

    let field = body_field(resource);
    let items = body
        .get(field)
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    if !items.is_array() {
        return Err(ApiError::BadRequest(invalid_message(resource).to_string()));
    }

    accounts
        .storage()
        .save_list(resource, &username, &items)
        .await?;
    tracing::debug!(
        "Saved {} {resource} entries for {username}",
        items.as_array().map_or(0, Vec::len)
    );
    Ok(Json(json!({ "ok": true })))
}
