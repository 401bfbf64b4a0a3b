//! Response rewriting shared by every route.

use std::any::Any;

use axum::extract::Request;
use axum::http::header::{ALLOW, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::app::errors::html_error;

/// Replace non-HTML error responses (405s, extractor rejections) with the
/// matching HTML page. Responses that are already HTML pass through.
pub async fn html_error_pages(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_html(&response) {
        return response;
    }

    tracing::debug!(%status, "replacing plain error response with html page");
    let mut page = html_error(status);
    if let Some(allow) = response.headers().get(ALLOW) {
        page.headers_mut().insert(ALLOW, allow.clone());
    }
    page
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"))
}

/// Panic handler for `CatchPanicLayer`: log the payload, answer with the 500 page.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = detail, "request handler panicked");
    html_error(StatusCode::INTERNAL_SERVER_ERROR)
}
