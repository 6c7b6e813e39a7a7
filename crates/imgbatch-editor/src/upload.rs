//! Upload hook
//!
//! Freshly uploaded images larger than the configured maximum on either side
//! are downscaled in place before anything else sees them.

use std::sync::Arc;

use imgbatch_core::EditorError;
use serde::{Deserialize, Serialize};

use crate::session::{EditorContext, LambdaImageEditor};

/// A file that has just been written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Constrain an uploaded image to `max_image_size` and save it over itself.
///
/// Non-image uploads and missing files pass through untouched. Editor failures
/// are logged and never fail the upload; the upload is always returned as given.
pub async fn handle_upload(context: Arc<EditorContext>, upload: UploadedFile) -> UploadedFile {
    if !upload.mime_type.starts_with("image/") {
        return upload;
    }

    let exists = tokio::fs::metadata(&upload.file)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !exists {
        tracing::debug!(file = %upload.file, "Uploaded file not found, skipping");
        return upload;
    }

    if let Err(e) = constrain_upload(context, &upload.file).await {
        tracing::warn!(
            error = %e,
            error_type = e.error_type(),
            file = %upload.file,
            "Could not process uploaded image"
        );
    }

    upload
}

async fn constrain_upload(context: Arc<EditorContext>, file: &str) -> Result<(), EditorError> {
    let max = context.max_image_size;
    let mut editor = LambdaImageEditor::load(context, file).await?;
    let size = editor.size();

    if size.width > max || size.height > max {
        editor.resize(Some(max), Some(max), false)?;
        tracing::info!(
            file = %file,
            original = %size,
            resized = %editor.size(),
            "Downscaling oversized upload"
        );
    }

    editor.save(Some(file), None).await?;
    Ok(())
}
