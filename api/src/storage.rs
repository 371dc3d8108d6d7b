//! Object storage for screen images: a local directory or a GCS bucket.

use bytes::Bytes;
use chrono::Utc;
use google_cloud_storage::client::Storage;
use rand::Rng;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Local storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GCS upload failed: {0}")]
    Gcs(String),
}

/// Where uploaded images go
#[derive(Clone)]
pub enum ObjectStorage {
    /// Files under a directory, served back through `/media`
    Local(PathBuf),
    Gcs { client: Storage, bucket: String },
}

impl ObjectStorage {
    /// Directory served by `/media`, if any
    pub fn local_root(&self) -> Option<&PathBuf> {
        match self {
            ObjectStorage::Local(root) => Some(root),
            ObjectStorage::Gcs { .. } => None,
        }
    }

    /// Public URL of a stored object
    pub fn public_url(&self, path: &str) -> String {
        match self {
            ObjectStorage::Local(_) => format!("/media/{}", path),
            ObjectStorage::Gcs { bucket, .. } => {
                format!("https://storage.googleapis.com/{}/{}", bucket, path)
            }
        }
    }

    /// Store `data` at `path` and return its public URL
    pub async fn upload(&self, path: &str, data: Bytes) -> Result<String, UploadError> {
        match self {
            ObjectStorage::Local(root) => {
                let full_path = root.join(path);
                if let Some(parent) = full_path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&full_path, &data).await?;
            }
            ObjectStorage::Gcs { client, bucket } => {
                let bucket_path = format!("projects/_/buckets/{}", bucket);
                client
                    .write_object(&bucket_path, path, data)
                    .send_buffered()
                    .await
                    .map_err(|e| UploadError::Gcs(e.to_string()))?;
            }
        }
        Ok(self.public_url(path))
    }
}

/// Raster image types accepted for upload. SVG is excluded: it can carry
/// script and `/media` shares the session cookie's origin.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

pub fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// `screens/2026-05-01/1777593600000-3f9a1c.png`
pub fn image_object_path(extension: &str) -> String {
    let now = Utc::now();
    let suffix: u32 = rand::rng().random();
    format!(
        "screens/{}/{}-{:06x}.{}",
        now.format("%Y-%m-%d"),
        now.timestamp_millis(),
        suffix & 0xff_ffff,
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_paths_are_bucketed_by_day() {
        let path = image_object_path("png");
        assert!(path.starts_with("screens/"));
        assert!(path.ends_with(".png"));
        assert_eq!(path.split('/').count(), 3);
    }

    #[test]
    fn only_images_have_extensions() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("video/mp4"), None);
        assert_eq!(content_type_for(Some("webp")), "image/webp");
        assert_eq!(content_type_for(None), "application/octet-stream");
    }

    #[test]
    fn svg_is_neither_accepted_nor_served_as_image() {
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(content_type_for(Some("svg")), "application/octet-stream");
    }

    #[tokio::test]
    async fn local_upload_writes_file_and_returns_media_url() {
        let root = tempfile::tempdir().expect("tempdir");
        let storage = ObjectStorage::Local(root.path().to_path_buf());

        let url = storage
            .upload("screens/test/a.png", Bytes::from_static(b"png"))
            .await
            .expect("upload");

        assert_eq!(url, "/media/screens/test/a.png");
        assert_eq!(
            std::fs::read(root.path().join("screens/test/a.png")).expect("read back"),
            b"png"
        );
    }
}
