//! Browser recording page

use axum::{response::Html, routing::get, Router};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Build the page router
pub fn router() -> Router {
    Router::new().route("/", get(index))
}
