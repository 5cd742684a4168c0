//! Router assembly and the server loop.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use userdesk_core::{catch_panic_layer, default_cors, default_trace, normalize_path};
use userdesk_data::{connect, DataError, PoolConfig};

use crate::handlers;
use crate::schema::ensure_schema;
use crate::settings::AppSettings;
use crate::state::AppState;
use crate::storage::{UploadStore, PUBLIC_PREFIX};

/// All routes with their layers, over `state`.
///
/// Request bodies are capped at `max_body` bytes.
pub fn build_router(state: AppState, max_body: usize) -> Router {
    let uploads = ServeDir::new(state.store.dir());

    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .nest_service(&format!("/{PUBLIC_PREFIX}"), uploads)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state);

    normalize_path(routes)
        .layer(catch_panic_layer())
        .layer(default_trace())
        .layer(default_cors())
}

/// Connect to the database, create the schema and build the router.
pub async fn prepare(settings: &AppSettings) -> Result<Router, DataError> {
    let pool_config = PoolConfig::new(&settings.database_url, settings.max_connections);
    let (pool, backend) = connect(&pool_config).await?;
    ensure_schema(&pool, backend).await?;

    let store = UploadStore::new(&settings.upload_dir);
    let state = AppState::new(pool, store, &settings.public_url);
    Ok(build_router(state, settings.max_upload_bytes))
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn run(settings: AppSettings) -> Result<(), Box<dyn std::error::Error>> {
    let app = prepare(&settings).await?;

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    tracing::info!(addr = %settings.addr, public_url = %settings.public_url, "userdesk listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("userdesk stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
