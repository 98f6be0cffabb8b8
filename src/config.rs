use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_DB_POOL_SIZE: u32 = 10;

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Normalized images fit inside a MAX_DIMENSION x MAX_DIMENSION box.
pub const MAX_DIMENSION: u32 = 800;
pub const JPEG_QUALITY: u8 = 85;
/// Widest or tallest image the decoder will accept.
pub const MAX_DECODE_DIMENSION: u32 = 16_384;
/// Ceiling on decoder allocations, in bytes (256 MiB).
pub const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;
pub const DEFAULT_EXTENSION: &str = "jpg";
/// One year, in seconds.
pub const UPLOAD_CACHE_MAX_AGE: u32 = 31_536_000;
/// Placeholder cells rendered by the gallery page while the list loads.
pub const GALLERY_PLACEHOLDERS: usize = 12;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be valid unicode")]
    NotUnicode { name: &'static str },
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration. Only the store selection comes from the
/// environment; the bind address and uploads directory are fixed.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    /// Selects the durable store when present, the in-memory one otherwise.
    pub database_url: Option<String>,
    pub db_pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upload_dir: PathBuf::from(UPLOAD_DIR),
            database_url: None,
            db_pool_size: DEFAULT_DB_POOL_SIZE,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    /// Call `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<String, env::VarError>,
    {
        let read = |name: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(name) {
                Ok(value) if value.trim().is_empty() => Ok(None),
                Ok(value) => Ok(Some(value)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { name }),
            }
        };

        let defaults = Config::default();

        let db_pool_size = match read("DB_POOL_SIZE")? {
            Some(raw) => {
                let size = raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                    name: "DB_POOL_SIZE",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                if size == 0 {
                    return Err(ConfigError::Invalid {
                        name: "DB_POOL_SIZE",
                        value: raw,
                        reason: "must be at least 1".to_string(),
                    });
                }
                size
            }
            None => defaults.db_pool_size,
        };

        Ok(Self {
            database_url: read("DATABASE_URL")?,
            db_pool_size,
            ..defaults
        })
    }
}
