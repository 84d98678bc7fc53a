use axum::response::Html;

const INDEX_HTML: &str = include_str!("../index.html");

/// `GET /`
pub async fn handler() -> Html<&'static str> { Html(INDEX_HTML) }
