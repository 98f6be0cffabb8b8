use crate::config::MAX_UPLOAD_BYTES;
use crate::error::{GalleryError, UploadError};
use crate::ingest::{self, IncomingPhoto, validate_content_type};
use crate::storage::UploadsDir;
use crate::store::PhotoStore;
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;

/// Multipart field carrying the image.
pub const PHOTO_FIELD: &str = "photo";

/// Used when the client sends an empty filename.
const FALLBACK_ORIGINAL_NAME: &str = "photo";

/// Most parts accepted in one upload form.
const MAX_FORM_PARTS: usize = 16;

/// Total bytes of non-file parts read (and dropped) per request.
const MAX_IGNORED_FIELD_BYTES: usize = 64 * 1024;

/// GET /api/photos
/// Returns every stored photo record, newest first.
pub async fn list_photos(store: web::Data<dyn PhotoStore>) -> Result<HttpResponse, GalleryError> {
    let store = store.into_inner();
    let photos = web::block(move || store.list_all()).await??;

    Ok(HttpResponse::Ok().json(photos))
}

/// POST /api/photos
/// Accepts a multipart form with a single `photo` file, normalizes the image,
/// writes it to the uploads directory and records its metadata.
pub async fn upload_photo(
    store: web::Data<dyn PhotoStore>,
    uploads: web::Data<UploadsDir>,
    payload: Multipart,
) -> Result<HttpResponse, UploadError> {
    let incoming = read_photo_part(payload).await?;

    let photo = ingest::ingest(store.into_inner(), &uploads, incoming).await?;

    Ok(HttpResponse::Created().json(photo))
}

/// Buffers the `photo` file part of the form.
///
/// The declared content type is checked before any bytes are read, and the
/// read stops as soon as the part grows past the upload limit. Any other file
/// part is rejected. Non-file parts are drained and dropped, sharing one byte
/// budget across the request, and the number of parts is capped.
async fn read_photo_part(mut payload: Multipart) -> Result<IncomingPhoto, UploadError> {
    let mut photo: Option<IncomingPhoto> = None;
    let mut parts = 0usize;
    let mut drained = 0usize;

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        parts += 1;
        if parts > MAX_FORM_PARTS {
            return Err(UploadError::Malformed(format!(
                "more than {MAX_FORM_PARTS} form parts"
            )));
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let Some(filename) = filename else {
            drain(&mut field, &mut drained).await?;
            continue;
        };

        if photo.is_some() || field.name() != Some(PHOTO_FIELD) {
            return Err(UploadError::Malformed(format!(
                "unexpected file part {:?}",
                field.name().unwrap_or_default()
            )));
        }

        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        validate_content_type(&content_type)?;

        let data = read_limited(&mut field).await?;

        photo = Some(IncomingPhoto {
            original_name: Some(filename)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| FALLBACK_ORIGINAL_NAME.to_string()),
            content_type,
            data,
        });
    }

    photo.ok_or(UploadError::NoFile)
}

async fn read_limited(field: &mut Field) -> Result<Vec<u8>, UploadError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Reads and discards a non-file part. `drained` is the running total over
/// the whole request.
async fn drain(field: &mut Field, drained: &mut usize) -> Result<(), UploadError> {
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        *drained += chunk.len();
        if *drained > MAX_IGNORED_FIELD_BYTES {
            return Err(UploadError::TooLarge);
        }
    }
    Ok(())
}

fn malformed(e: MultipartError) -> UploadError {
    UploadError::Malformed(e.to_string())
}
