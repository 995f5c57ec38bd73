use crate::error::{Error, Result};
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Clone)]
pub struct UploadService {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Validates and stores a question image, returning the relative path kept
    /// in the answer row. Nothing is written when validation fails.
    pub async fn store_question_image(
        &self,
        question_id: Option<i64>,
        filename: &str,
        data: &Bytes,
    ) -> Result<String> {
        if data.len() > self.max_bytes {
            return Err(Error::Validation(format!(
                "Image exceeds the maximum size of {} bytes",
                self.max_bytes
            )));
        }

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let valid = match ext.as_str() {
            "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
            "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
            "gif" => data.starts_with(b"GIF8"),
            _ => {
                return Err(Error::Validation(format!(
                    "File type .{} is not allowed for question images",
                    ext
                )))
            }
        };
        if !valid {
            return Err(Error::Validation(format!(
                "File content does not match .{} image format",
                ext
            )));
        }

        let dir = self.root.join("questions");
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Internal(format!("Failed to create uploads directory: {}", e)))?;

        let stem = question_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "new".to_string());
        let name = format!("q{}-{}.{}", stem, Utc::now().timestamp_millis(), ext);

        fs::write(dir.join(&name), data).await.map_err(|e| {
            tracing::error!("Failed to write question image: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(format!("uploads/questions/{}", name))
    }

    /// Removes a stored image. A missing file is not an error; anything else
    /// is logged and swallowed.
    pub async fn delete_image(&self, stored_path: &str) {
        let rel = stored_path.strip_prefix("uploads/").unwrap_or(stored_path);
        let path = self.root.join(rel);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "failed to delete question image")
            }
        }
    }
}
