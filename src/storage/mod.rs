use chrono::Utc;
use mime_guess::mime;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::DEFAULT_EXTENSION;

const MAX_EXTENSION_LEN: usize = 5;

/// Flat directory holding normalized uploads, keyed by generated filename.
#[derive(Clone, Debug)]
pub struct UploadsDir {
    upload_dir: PathBuf,
}

impl UploadsDir {
    pub fn new(upload_dir: impl AsRef<Path>) -> Self {
        Self {
            upload_dir: upload_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.upload_dir
    }

    /// Creates the directory if missing. Run once during startup.
    pub fn ensure_upload_dir_exists(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }

    /// Generates a fresh storage key: `<unix millis>-<random token>.<ext>`.
    ///
    /// Only the extension of `original_name` is kept, and only when it names
    /// an image type; nothing else the client sent reaches the filesystem.
    pub fn generate_filename(original_name: &str) -> String {
        format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            image_extension(original_name)
        )
    }

    /// Writes `bytes` under `filename` and flushes them to stable storage.
    /// Fails rather than overwrite an existing file.
    pub async fn write_file(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let file_path = self.resolve(filename).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid upload filename {filename:?}"),
            )
        })?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;

        Ok(file_path)
    }

    pub async fn delete_file(&self, filename: &str) -> io::Result<()> {
        match self.resolve(filename) {
            Some(file_path) => tokio::fs::remove_file(file_path).await,
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid upload filename {filename:?}"),
            )),
        }
    }

    /// Maps a filename to its path inside the uploads directory. Returns `None`
    /// for anything that is not a single plain path component.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !filename.contains('\\') => {
                Some(self.upload_dir.join(name))
            }
            _ => None,
        }
    }
}

/// Lowercased extension of `original_name` if it is a short alphanumeric
/// image extension, the default extension otherwise.
fn image_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| {
            mime_guess::from_ext(e)
                .iter()
                .any(|m| m.type_() == mime::IMAGE)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn keeps_image_extensions() {
        assert_eq!(image_extension("cat.png"), "png");
        assert_eq!(image_extension("CAT.JPEG"), "jpeg");
        assert_eq!(image_extension("archive.tar.webp"), "webp");
    }

    #[test]
    fn falls_back_to_default_extension() {
        assert_eq!(image_extension("noext"), "jpg");
        assert_eq!(image_extension("notes.txt"), "jpg");
        assert_eq!(image_extension("evil.p/ng"), "jpg");
        assert_eq!(image_extension("weird.ab cd"), "jpg");
        assert_eq!(image_extension(""), "jpg");
    }

    #[test]
    fn generated_filenames_are_distinct_and_safe() {
        let names: HashSet<String> = (0..1000)
            .map(|_| UploadsDir::generate_filename("../../etc/passwd.png"))
            .collect();
        assert_eq!(names.len(), 1000);

        let dir = UploadsDir::new("uploads");
        for name in &names {
            assert!(name.ends_with(".png"));
            assert!(!name.contains("passwd"));
            assert!(dir.resolve(name).is_some());
        }
    }

    #[test]
    fn resolve_rejects_traversal() {
        let dir = UploadsDir::new("uploads");
        assert!(dir.resolve("../secret").is_none());
        assert!(dir.resolve("a/b.jpg").is_none());
        assert!(dir.resolve("..").is_none());
        assert!(dir.resolve("").is_none());
        assert!(dir.resolve("/etc/passwd").is_none());
        assert!(dir.resolve("a\\b.jpg").is_none());
        assert_eq!(
            dir.resolve("1-abc.jpg"),
            Some(PathBuf::from("uploads").join("1-abc.jpg"))
        );
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = UploadsDir::new(tmp.path().join("nested").join("uploads"));
        dir.ensure_upload_dir_exists().unwrap();
        dir.ensure_upload_dir_exists().unwrap();
        assert!(dir.path().is_dir());
    }

    #[tokio::test]
    async fn write_then_delete() {
        let tmp = TempDir::new().unwrap();
        let dir = UploadsDir::new(tmp.path());

        let path = dir.write_file("1-a.jpg", b"jpeg bytes").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg bytes");

        // never overwrites
        assert!(dir.write_file("1-a.jpg", b"other").await.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg bytes");

        dir.delete_file("1-a.jpg").await.unwrap();
        assert!(!path.exists());
    }
}
