//! Static file serving

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

const SITE_CSS: &str = include_str!("../static/site.css");
const SEARCH_JS: &str = include_str!("../static/search.js");

/// Assets compiled into the binary
pub struct StaticFiles;

impl StaticFiles {
    /// Serve a static file
    pub fn serve(path: &str) -> Response {
        let content_type = guess_content_type(path);

        match path {
            "site.css" => serve_embedded(SITE_CSS, content_type),
            "search.js" => serve_embedded(SEARCH_JS, content_type),
            _ => (StatusCode::NOT_FOUND, "File not found").into_response(),
        }
    }
}

fn guess_content_type(path: &str) -> &'static str {
    if path.ends_with(".js") {
        "application/javascript"
    } else if path.ends_with(".css") {
        "text/css"
    } else if path.ends_with(".json") {
        "application/json"
    } else {
        "application/octet-stream"
    }
}

fn serve_embedded(content: &'static str, content_type: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        content,
    )
        .into_response()
}
