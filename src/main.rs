//! Newspaper Agency Backend
//!
//! Redactors manage topics, newspapers and authorship assignments behind a
//! session login. SQLite holds the data; sessions live in memory.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod search;
mod session;
mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{AdminAccount, Config};
use db::Repository;
use models::RedactorCreationForm;
use session::SessionStore;
use validation::{Validate, MIN_YEARS_OF_EXPERIENCE};

/// How often expired sessions are swept out of memory.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 10);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub sessions: Arc<SessionStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Newspaper Agency Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    if let Some(admin) = &config.admin {
        bootstrap_admin(&repo, admin).await?;
    }

    let sessions = Arc::new(SessionStore::new(config.session_ttl));
    spawn_session_sweeper(sessions.clone());

    // Create application state
    let state = AppState { repo, sessions };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes that need a logged-in redactor
    let protected_routes = Router::new()
        // Dashboard
        .route("/", get(api::dashboard))
        // Accounts
        .route("/accounts/logout/", post(api::logout))
        .route("/accounts/me", get(api::current_session))
        // Topics
        .route("/topics/", get(api::list_topics))
        .route("/topics/new", post(api::create_topic))
        .route("/topics/{id}", get(api::get_topic))
        .route("/topics/{id}/edit", post(api::update_topic))
        .route("/topics/{id}/delete", post(api::delete_topic))
        // Newspapers
        .route("/newspapers/", get(api::list_newspapers))
        .route("/newspapers/new", post(api::create_newspaper))
        .route("/newspapers/{id}", get(api::get_newspaper))
        .route("/newspapers/{id}/edit", post(api::update_newspaper))
        .route("/newspapers/{id}/delete", post(api::delete_newspaper))
        .route("/newspapers/{id}/assign", post(api::toggle_assignment))
        // Redactors
        .route("/redactors/", get(api::list_redactors))
        .route("/redactors/new", post(api::create_redactor))
        .route("/redactors/{id}", get(api::get_redactor))
        .route("/redactors/{id}/edit", post(api::update_redactor))
        .route("/redactors/{id}/delete", post(api::delete_redactor))
        // Apply session auth middleware
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    // Login boundary and health check (no auth required)
    let public_routes = Router::new()
        .route("/accounts/login/", get(api::login_page).post(api::login))
        .route("/health", get(health_check));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the configured first account unless it already exists.
async fn bootstrap_admin(repo: &Repository, admin: &AdminAccount) -> Result<(), errors::AppError> {
    if repo.find_redactor_by_username(&admin.username).await?.is_some() {
        return Ok(());
    }

    let input = RedactorCreationForm {
        username: admin.username.clone(),
        password1: admin.password.clone(),
        password2: admin.password.clone(),
        years_of_experience: Some(MIN_YEARS_OF_EXPERIENCE),
        ..Default::default()
    }
    .validate()?;

    let password_hash = auth::password::hash_password(input.password.clone()).await?;
    let redactor = repo.create_redactor(&input, &password_hash).await?;

    tracing::info!(redactor = %redactor.display_name(), "Created admin account");
    Ok(())
}

/// Periodically drop expired sessions.
fn spawn_session_sweeper(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Expired sessions purged");
            }
        }
    });
}
