//! Upload pipeline: validate, normalize, name, write, record.

use actix_web::web;
use log::{error, info};

use crate::config::MAX_UPLOAD_BYTES;
use crate::error::UploadError;
use crate::imaging;
use crate::models::photos::{NewPhoto, Photo};
use crate::storage::UploadsDir;
use crate::store::SharedStore;

/// A fully buffered upload as received from the client.
#[derive(Debug)]
pub struct IncomingPhoto {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub fn validate_content_type(content_type: &str) -> Result<(), UploadError> {
    if content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(UploadError::InvalidType(content_type.to_string()))
    }
}

pub fn validate_size(len: usize) -> Result<(), UploadError> {
    if len > MAX_UPLOAD_BYTES {
        Err(UploadError::TooLarge)
    } else {
        Ok(())
    }
}

/// Runs the whole pipeline for one upload and returns the stored record.
///
/// The normalized file is on disk before the record is created. If record
/// creation fails the file is removed again, so no file outlives a failed
/// upload.
pub async fn ingest(
    store: SharedStore,
    uploads: &UploadsDir,
    incoming: IncomingPhoto,
) -> Result<Photo, UploadError> {
    validate_content_type(&incoming.content_type)?;
    validate_size(incoming.data.len())?;

    let IncomingPhoto {
        original_name,
        content_type,
        data,
    } = incoming;

    let normalized = web::block(move || imaging::normalize(&data)).await??;

    let filename = UploadsDir::generate_filename(&original_name);
    uploads.write_file(&filename, &normalized.bytes).await?;

    let new_photo = NewPhoto {
        filename: filename.clone(),
        original_name,
        mime_type: content_type,
        size: normalized.bytes.len().to_string(),
    };

    let created = web::block(move || store.create(new_photo))
        .await
        .map_err(UploadError::from)
        .and_then(|res| res.map_err(UploadError::from));

    match created {
        Ok(photo) => {
            info!(
                "Stored photo id={} filename={} ({}x{}, {} bytes)",
                photo.id, photo.filename, normalized.width, normalized.height, photo.size
            );
            Ok(photo)
        }
        Err(e) => {
            if let Err(rm) = uploads.delete_file(&filename).await {
                error!("Failed to remove {} after record failure: {}", filename, rm);
            }
            Err(e)
        }
    }
}
