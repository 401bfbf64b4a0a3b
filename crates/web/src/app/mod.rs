//! Site wiring: page routes, shared services, and the middleware stack.
//!
//! - `services.rs`: collaborators built once at startup (catalog, mailer, validator)
//! - `routes/`: page handlers, one file per area
//! - `views.rs`: HTML rendering
//! - `errors.rs`: handler failures rendered as HTML error pages

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;
pub mod views;

pub use services::{build_services, AppServices};

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(services: AppServices) -> Router {
    routes::router()
        .fallback(errors::not_found)
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(middleware::html_error_pages)),
        )
        // Kept out of the builder: `Cors` needs a `Default` response body,
        // which the panic layer's boxed body is not.
        .layer(CatchPanicLayer::custom(middleware::panic_response))
}
