//! Cover image upload service

use std::path::Path;

use chrono::Utc;

use crate::{
    config::UploadsConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct UploadsService {
    config: UploadsConfig,
}

impl UploadsService {
    pub fn new(config: UploadsConfig) -> Self {
        Self { config }
    }

    /// Directory where uploaded covers are stored
    pub fn dir(&self) -> &str {
        &self.config.dir
    }

    /// Create the uploads directory if missing
    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.config.dir).await?;
        Ok(())
    }

    /// Store a cover image and return the path the client should use as
    /// the book's cover reference.
    pub async fn store_cover(&self, original_name: &str, data: &[u8]) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::Validation("No file content provided".to_string()));
        }
        if data.len() as u64 > self.config.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "Cover image exceeds the maximum size of {} bytes",
                self.config.max_upload_bytes
            )));
        }

        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("png");
        let file_name = format!("cover_{}.{}", Utc::now().timestamp_millis(), extension);

        tokio::fs::create_dir_all(&self.config.dir).await?;
        let path = Path::new(&self.config.dir).join(&file_name);
        tokio::fs::write(&path, data).await?;

        tracing::debug!(file = %path.display(), size = data.len(), "stored cover image");
        Ok(format!("/uploads/{}", file_name))
    }
}
