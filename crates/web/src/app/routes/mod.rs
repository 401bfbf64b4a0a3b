use axum::{routing::get, Router};

pub mod assets;
pub mod contact;
pub mod pages;

/// Every page route. Fallback and middleware are added in [`crate::app::build_app`].
pub fn router() -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route(
            "/contact",
            get(contact::show_form).post(contact::submit_form),
        )
        .route("/static/js/main.js", get(assets::main_js))
}
