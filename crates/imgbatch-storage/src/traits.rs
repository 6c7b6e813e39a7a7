//! Storage collaborator traits
//!
//! The editor depends on these traits instead of concrete types so tests and
//! embedding applications can supply their own key mapping and size probing.

use async_trait::async_trait;
use imgbatch_core::EditorError;

/// Maps a file reference to the storage key the remote processor understands.
pub trait KeyMapper: Send + Sync {
    /// Returns `EditorError::KeyMapping` when the reference lives outside any known root.
    fn to_key(&self, file: &str) -> Result<String, EditorError>;
}

/// Size and type of a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedImage {
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
}

/// Reads image metadata without decoding pixels.
#[async_trait]
pub trait SizeProbe: Send + Sync {
    /// Returns `EditorError::Probe` when the file cannot be read or is not an image.
    async fn probe(&self, file: &str) -> Result<ProbedImage, EditorError>;
}
