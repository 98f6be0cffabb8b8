use crate::config::{GALLERY_PLACEHOLDERS, MAX_UPLOAD_BYTES};
use actix_web::HttpResponse;
use actix_web::http::header::ContentType;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
/// Gallery page. Upload limits are filled in from the server's own constants
/// so client-side checks match the server's.
pub async fn index() -> HttpResponse {
    let page = INDEX_HTML
        .replace("{{MAX_UPLOAD_BYTES}}", &MAX_UPLOAD_BYTES.to_string())
        .replace("{{PLACEHOLDERS}}", &GALLERY_PLACEHOLDERS.to_string());

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page)
}
