use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;

use crate::application::board_service::UploadedMedia;
use crate::domain::error::DomainError;

#[derive(MultipartForm)]
pub struct CreatePostForm {
    pub title: Text<String>,
    pub content: Text<String>,
    pub secret: Option<Text<String>>,
    #[multipart(rename = "image")]
    pub media: Option<TempFile>,
}

/// Shared by the comment and reply routes: a body plus optional image.
#[derive(MultipartForm)]
pub struct AttachmentForm {
    pub content: Text<String>,
    #[multipart(rename = "image")]
    pub media: Option<TempFile>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePostRequest {
    pub secret: String,
}

/// Reads the spooled upload back into memory for the media store. A file
/// field with an empty filename (a bare form submit) counts as absent.
pub async fn into_upload(file: Option<TempFile>) -> Result<Option<UploadedMedia>, DomainError> {
    let Some(file) = file else {
        return Ok(None);
    };
    let Some(filename) = file.file_name.clone().filter(|name| !name.is_empty()) else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(file.file.path())
        .await
        .map_err(|e| DomainError::MediaWrite(e.to_string()))?;
    Ok(Some(UploadedMedia { filename, bytes }))
}
