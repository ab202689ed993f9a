use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::{auth, companies, health, jobs, users};
use crate::middleware::{identify, log_errors, not_found, require_admin, require_logged_in, require_self_or_admin};
use crate::state::AppState;

/// Build the full application router.
///
/// Each method router carries the same `not_found` fallback as the router
/// itself, so a known path with an unrouted method gets the 404 envelope.
pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .route("/health", get(health::health).fallback(not_found))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body))
        // Identity runs before any route gate
        .layer(from_fn_with_state(state.clone(), identify))
        .layer(from_fn_with_state(state.clone(), log_errors))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(auth::token).fallback(not_found))
        .route("/auth/register", post(auth::register).fallback(not_found))
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(companies::list)
                .post(companies::create.layer(from_fn(require_admin)).layer(from_fn(require_logged_in)))
                .fallback(not_found),
        )
        .route(
            "/companies/:handle",
            get(companies::show)
                .patch(companies::update.layer(from_fn(require_admin)).layer(from_fn(require_logged_in)))
                .delete(companies::delete.layer(from_fn(require_admin)).layer(from_fn(require_logged_in)))
                .fallback(not_found),
        )
}

fn job_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/jobs",
            get(jobs::list)
                .post(jobs::create.layer(from_fn(require_admin)))
                .fallback(not_found),
        )
        .route(
            "/jobs/:id",
            get(jobs::show)
                .patch(jobs::update.layer(from_fn(require_admin)))
                .delete(jobs::delete.layer(from_fn(require_admin)))
                .fallback(not_found),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::list)
                .post(users::create)
                .route_layer(from_fn(require_admin))
                .fallback(not_found),
        )
        .route(
            "/users/:username",
            get(users::show)
                .patch(users::update)
                .delete(users::delete)
                .route_layer(from_fn(require_self_or_admin))
                .fallback(not_found),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Connect to the database and serve until Ctrl-C or SIGTERM
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let db = Database::connect(&config.database).await?;
    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "Jobly API listening on http://{} ({:?})",
        listener.local_addr()?,
        config.environment
    );

    let state = AppState::new(config, db.clone());
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
