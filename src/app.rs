use actix_web::web;

use crate::handlers;

/// Route table shared by the server binary and the HTTP tests.
///
/// Expects `web::Data<dyn PhotoStore>` and `web::Data<UploadsDir>` to be
/// registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/photos")
            .route("", web::get().to(handlers::photos::list_photos))
            .route("", web::post().to(handlers::photos::upload_photo)),
    )
    .route(
        "/uploads/{filename}",
        web::get().to(handlers::uploads::serve_upload),
    )
    .route("/", web::get().to(handlers::pages::index));
}
