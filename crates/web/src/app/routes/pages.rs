use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use mesopotamia_infra::catalog::HOME_FEATURED_LIMIT;

use crate::app::errors::PageError;
use crate::app::services::AppServices;
use crate::app::views;
use crate::session::Session;

pub async fn home(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let products = services
        .catalog
        .list_featured_products(HOME_FEATURED_LIMIT)
        .await?;

    let mut session = Session::from_headers(&headers, &services.sessions);
    let flashes = session.take_flashes();
    let page = views::home(&products, &flashes).into_response();
    Ok(session.apply(page, &services.sessions))
}

pub async fn about(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    let mut session = Session::from_headers(&headers, &services.sessions);
    let flashes = session.take_flashes();
    session.apply(views::about(&flashes).into_response(), &services.sessions)
}
