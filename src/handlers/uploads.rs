use crate::config::UPLOAD_CACHE_MAX_AGE;
use crate::storage::UploadsDir;
use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{Error, HttpResponse, web};
use log::error;
use mime_guess::from_path;
use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Enough leading bytes for `image::guess_format` to recognise any format.
const SNIFF_LEN: u64 = 32;

/// GET /uploads/{filename}
/// Streams a stored image with a one-year public cache lifetime.
pub async fn serve_upload(
    uploads: web::Data<UploadsDir>,
    filename: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let file_path = uploads
        .resolve(&filename)
        .ok_or_else(|| actix_web::error::ErrorNotFound("File not found"))?;

    let mut tokio_file = tokio::fs::File::open(&file_path)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => actix_web::error::ErrorNotFound("File not found"),
            _ => {
                error!("Failed to open {}: {}", file_path.display(), e);
                actix_web::error::ErrorInternalServerError("Failed to open file")
            }
        })?;

    let metadata = tokio_file.metadata().await.map_err(|e| {
        error!("Failed to stat {}: {}", file_path.display(), e);
        actix_web::error::ErrorInternalServerError("Failed to open file")
    })?;
    if !metadata.is_file() {
        return Err(actix_web::error::ErrorNotFound("File not found"));
    }

    let content_type = sniff_content_type(&mut tokio_file, &file_path)
        .await
        .map_err(|e| {
            error!("Failed to read {}: {}", file_path.display(), e);
            actix_web::error::ErrorInternalServerError("Failed to open file")
        })?;
    let stream = tokio_util::io::ReaderStream::new(tokio_file);

    Ok(HttpResponse::Ok()
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(UPLOAD_CACHE_MAX_AGE),
        ]))
        .insert_header((header::CONTENT_TYPE, content_type))
        .no_chunking(metadata.len())
        .streaming(stream))
}

/// Content type from the file's leading bytes. Stored files are JPEG whatever
/// their extension says; the extension is only the fallback. Leaves the
/// file positioned at the start.
async fn sniff_content_type(file: &mut tokio::fs::File, file_path: &Path) -> io::Result<String> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    (&mut *file).take(SNIFF_LEN).read_to_end(&mut head).await?;
    file.seek(SeekFrom::Start(0)).await?;

    Ok(match image::guess_format(&head) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => from_path(file_path).first_or_octet_stream().to_string(),
    })
}
