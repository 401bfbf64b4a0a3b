use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;

const MAIN_JS: &str = include_str!("../../../static/js/main.js");

/// Mobile navigation toggle script referenced by the layout.
pub async fn main_js() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        MAIN_JS,
    )
}
