//! Multipart form parsing helpers

use axum::extract::Multipart;
use shoplens_core::ImageUpload;

use crate::error::ApiError;
use crate::validation::{validate_content_type, validate_file_size};

/// Name of the form field carrying the query image
pub const FILE_FIELD: &str = "file";

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

impl From<FileField> for ImageUpload {
    fn from(file: FileField) -> Self {
        Self {
            bytes: file.data,
            original_name: file.file_name.unwrap_or_default(),
            mime_type: file.content_type,
        }
    }
}

/// Parsed multipart upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<FileField>,
}

impl UploadForm {
    /// Parse the upload form, validating the image field on the way.
    ///
    /// Fields other than `file` are drained and ignored. When `file` occurs
    /// more than once the last one wins.
    pub async fn parse(multipart: &mut Multipart, max_file_size: usize) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let content_type = field.content_type().map(|s| s.to_string());
            let file_name = field.file_name().map(|s| s.to_string());

            validate_content_type(content_type.as_deref())?;

            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                .to_vec();

            validate_file_size(data.len(), max_file_size)?;

            file = Some(FileField {
                data,
                content_type,
                file_name,
            });
        }

        Ok(Self { file })
    }

    /// The uploaded image, or `None` when the form had no `file` field.
    pub fn into_upload(self) -> Option<ImageUpload> {
        self.file.map(Into::into)
    }
}
