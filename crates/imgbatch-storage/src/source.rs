//! Source reference classification.

use imgbatch_core::EditorError;

/// Where a source image lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Existing regular file on the local filesystem
    LocalFile,
    /// `http://` or `https://` URL
    Url,
    /// Reference that names the configured bucket
    Bucket,
}

pub fn is_url(file: &str) -> bool {
    file.starts_with("http://") || file.starts_with("https://")
}

/// Classify `file`, failing with `EditorError::Load` when it is none of the accepted kinds.
pub async fn classify_source(file: &str, bucket: &str) -> Result<SourceKind, EditorError> {
    if file.is_empty() {
        return Err(EditorError::Load("empty file reference".to_string()));
    }

    let is_file = tokio::fs::metadata(file)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);

    if is_file {
        Ok(SourceKind::LocalFile)
    } else if is_url(file) {
        Ok(SourceKind::Url)
    } else if !bucket.is_empty() && file.contains(bucket) {
        Ok(SourceKind::Bucket)
    } else {
        Err(EditorError::Load(format!("File doesn't exist: {}", file)))
    }
}
