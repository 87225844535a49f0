/// Media upload validation and storage forwarding.
///
/// The service validates file count and size, infers the media type, and
/// forwards bytes to a [`MediaStorage`] implementor which answers with a
/// secure URL. The storage provider stays an external collaborator behind
/// the trait; the shipped implementor targets S3.
use crate::config::MediaConfig;
use crate::error::{AppError, Result};
use crate::models::MediaType;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Files accepted per upload request.
pub const MAX_UPLOAD_FILES: usize = 5;
/// Per-file size ceiling: 100 MB.
pub const MAX_UPLOAD_FILE_BYTES: usize = 100 * 1024 * 1024;

/// One file received from a multipart upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadResponse {
    pub file_name: String,
    pub media_type: MediaType,
    pub url: String,
}

/// Infer the media type from the content type, falling back to the file
/// extension.
pub fn infer_media_type(content_type: Option<&str>, file_name: &str) -> MediaType {
    if let Some(content_type) = content_type {
        if content_type.starts_with(mime::IMAGE.as_str()) {
            if content_type.eq_ignore_ascii_case("image/gif") {
                return MediaType::Gif;
            }
            return MediaType::Image;
        }
        if content_type.starts_with(mime::VIDEO.as_str()) {
            return MediaType::Video;
        }
    }

    let extension = file_name
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") | Some("png") | Some("webp") => MediaType::Image,
        Some("gif") => MediaType::Gif,
        Some("mp4") | Some("mov") | Some("avi") => MediaType::Video,
        _ => MediaType::Other,
    }
}

/// Validate count and per-file size of an upload batch.
pub fn validate_upload(files: &[UploadedFile]) -> Result<()> {
    if files.is_empty() {
        return Err(AppError::BadRequest("No files to upload".to_string()));
    }
    if files.len() > MAX_UPLOAD_FILES {
        return Err(AppError::BadRequest(format!(
            "At most {} files can be uploaded at once",
            MAX_UPLOAD_FILES
        )));
    }
    for file in files {
        if file.bytes.len() > MAX_UPLOAD_FILE_BYTES {
            return Err(AppError::BadRequest(format!(
                "File {} exceeds the 100MB size limit",
                file.file_name
            )));
        }
    }
    Ok(())
}

/// An external media store accepting raw bytes and answering with a secure
/// URL.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String>;
}

/// S3-backed media storage.
pub struct S3MediaStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3MediaStorage {
    pub fn new(client: aws_sdk_s3::Client, config: &MediaConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Media upload failed");
                AppError::FailedDependency(
                    "Sorry! We could not store the uploaded media, try again.".to_string(),
                )
            })?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

pub struct MediaService {
    storage: Arc<dyn MediaStorage>,
}

impl MediaService {
    pub fn new(storage: Arc<dyn MediaStorage>) -> Self {
        Self { storage }
    }

    /// Validate and forward an upload batch; answers one secure URL per
    /// file, in input order.
    pub async fn upload_files(
        &self,
        username: &str,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<MediaUploadResponse>> {
        validate_upload(&files)?;

        let mut responses = Vec::with_capacity(files.len());
        for file in files {
            let media_type = infer_media_type(file.content_type.as_deref(), &file.file_name);
            let content_type = file
                .content_type
                .clone()
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

            let key = format!("media/{}/{}-{}", username, Uuid::new_v4(), file.file_name);
            let url = self.storage.upload(&key, &content_type, file.bytes).await?;

            responses.push(MediaUploadResponse {
                file_name: file.file_name,
                media_type,
                url,
            });
        }

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: Option<&str>, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.map(|s| s.to_string()),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn content_type_wins_over_extension() {
        assert_eq!(
            infer_media_type(Some("image/png"), "weird.mp4"),
            MediaType::Image
        );
        assert_eq!(
            infer_media_type(Some("video/mp4"), "clip.bin"),
            MediaType::Video
        );
        assert_eq!(
            infer_media_type(Some("image/gif"), "loop.dat"),
            MediaType::Gif
        );
    }

    #[test]
    fn extension_fallback_when_content_type_is_missing() {
        assert_eq!(infer_media_type(None, "photo.JPG"), MediaType::Image);
        assert_eq!(infer_media_type(None, "loop.gif"), MediaType::Gif);
        assert_eq!(infer_media_type(None, "clip.mov"), MediaType::Video);
        assert_eq!(infer_media_type(None, "archive.zip"), MediaType::Other);
    }

    #[test]
    fn upload_batch_limits_are_enforced() {
        let files: Vec<UploadedFile> = (0..6).map(|i| file(&format!("f{i}.png"), None, 10)).collect();
        assert!(validate_upload(&files).is_err());

        let empty: Vec<UploadedFile> = vec![];
        assert!(validate_upload(&empty).is_err());

        let ok: Vec<UploadedFile> = (0..5).map(|i| file(&format!("f{i}.png"), None, 10)).collect();
        assert!(validate_upload(&ok).is_ok());
    }

    #[test]
    fn oversized_file_is_rejected() {
        let files = vec![file("big.mp4", None, MAX_UPLOAD_FILE_BYTES + 1)];
        assert!(validate_upload(&files).is_err());

        let files = vec![file("fits.mp4", None, MAX_UPLOAD_FILE_BYTES)];
        assert!(validate_upload(&files).is_ok());
    }
}
