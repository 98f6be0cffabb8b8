use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::r2d2::PoolError;
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

use crate::config::MAX_UPLOAD_BYTES;

/// Failures raised by a `PhotoStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("in-memory store lock poisoned")]
    Poisoned,
}

/// Everything that can go wrong while accepting an upload.
///
/// The first group is the caller's fault and is reported verbatim with a 400.
/// The rest are processing failures: they are logged in full and the caller
/// only sees a generic 500 message.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No photo file provided")]
    NoFile,
    #[error("Only image files are allowed (got {0})")]
    InvalidType(String),
    #[error("File too large: images must be {} bytes or smaller", MAX_UPLOAD_BYTES)]
    TooLarge,
    #[error("Malformed upload: {0}")]
    Malformed(String),

    #[error("image processing failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record creation failed: {0}")]
    Store(#[from] StoreError),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] BlockingError),
}

impl UploadError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            UploadError::NoFile
                | UploadError::InvalidType(_)
                | UploadError::TooLarge
                | UploadError::Malformed(_)
        )
    }

    fn public_message(&self) -> String {
        match self {
            UploadError::NoFile => self.to_string(),
            UploadError::InvalidType(_) => "Only image files are allowed".to_string(),
            UploadError::TooLarge => "File too large: images must be 10MB or smaller".to_string(),
            UploadError::Malformed(_) => "Malformed upload".to_string(),
            _ => "Failed to upload photo".to_string(),
        }
    }
}

/// JSON error body: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            _ if self.is_client_error() => warn!("Rejected upload: {}", self),
            UploadError::Decode(image::ImageError::Limits(e)) => {
                error!("Rejected upload over decode limits: {}", e);
            }
            _ => error!("Error uploading photo: {}", self),
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.public_message(),
        })
    }
}

/// Failures on the gallery read path.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for GalleryError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!("Error fetching photos: {}", self);

        HttpResponse::InternalServerError().json(ErrorBody {
            message: "Failed to fetch photos".to_string(),
        })
    }
}
