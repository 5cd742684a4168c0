use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::error::error_response;

/// Initialise the global `tracing` subscriber.
///
/// Respects the `RUST_LOG` environment variable. Falls back to
/// `info,tower_http=debug` when `RUST_LOG` is not set. With `json` the
/// events are written as one JSON object per line.
///
/// Calling this more than once is harmless; only the first call installs a
/// subscriber.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// CORS for browser clients on any origin.
pub fn default_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Returns a `TraceLayer` that logs HTTP requests and responses.
pub fn default_trace() -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Turns a panicking handler into a JSON 500.
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn std::any::Any + Send>) -> Response> {
    CatchPanicLayer::custom(panic_handler as fn(_) -> _)
}

fn panic_handler(_err: Box<dyn std::any::Any + Send>) -> Response {
    tracing::error!("handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

async fn not_found(req: Request) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("No route for {}", req.uri().path()))
}

/// Install trailing-slash normalization and a JSON 404 fallback.
///
/// When no route matches and the path has a trailing slash, the slash is
/// stripped and the request is re-dispatched to the same router, so
/// `/users/` reaches the `/users` handler. Anything else gets a JSON 404.
pub fn normalize_path(app: Router) -> Router {
    let inner = app.fallback(not_found);
    inner.clone().fallback(move |req: Request| {
        let inner = inner.clone();
        async move {
            let path = req.uri().path();
            if path.len() > 1 && path.ends_with('/') {
                let trimmed = path.trim_end_matches('/');
                let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
                let new_uri = match req.uri().query() {
                    Some(q) => format!("{trimmed}?{q}"),
                    None => trimmed.to_string(),
                };
                let (mut parts, body) = req.into_parts();
                parts.uri = new_uri.parse().unwrap_or(parts.uri);
                let new_req = Request::from_parts(parts, body);
                match tower::ServiceExt::oneshot(inner, new_req).await {
                    Ok(resp) => resp,
                    Err(infallible) => match infallible {},
                }
            } else {
                not_found(req).await.into_response()
            }
        }
    })
}
