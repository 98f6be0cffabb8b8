use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use log::info;
use std::io;

use photo_gallery::config::Config;
use photo_gallery::storage::UploadsDir;
use photo_gallery::store::{self, PhotoStore};
use photo_gallery::app;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(io::Error::other)?;

    let uploads = UploadsDir::new(&config.upload_dir);
    uploads.ensure_upload_dir_exists()?;
    info!("Serving uploads from {}", uploads.path().display());

    let store: web::Data<dyn PhotoStore> =
        web::Data::from(store::from_config(&config).map_err(io::Error::other)?);
    let uploads = web::Data::new(uploads);

    info!("Listening on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(uploads.clone())
            .configure(app::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
