/// Media upload handler.
///
/// Buffers each multipart file up to the configured limits and hands the
/// batch to the media service, which forwards bytes to the storage
/// provider.
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::media::{UploadedFile, MAX_UPLOAD_FILES, MAX_UPLOAD_FILE_BYTES};
use crate::services::MediaService;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;

/// POST /api/v1/media/upload
pub async fn upload(
    media: web::Data<MediaService>,
    user: AuthenticatedUser,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?;

        if files.len() >= MAX_UPLOAD_FILES {
            return Err(AppError::BadRequest(format!(
                "At most {} files can be uploaded at once",
                MAX_UPLOAD_FILES
            )));
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|name| name.to_string())
            .unwrap_or_else(|| "file".to_string());
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::BadRequest(format!("Failed reading upload: {}", e)))?;
            bytes.extend_from_slice(&chunk);
            if bytes.len() > MAX_UPLOAD_FILE_BYTES {
                return Err(AppError::BadRequest(format!(
                    "File {} exceeds the 100MB size limit",
                    file_name
                )));
            }
        }

        files.push(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    let uploaded = media.upload_files(&user.username, files).await?;
    Ok(response::created("Media uploaded successfully", uploaded))
}
