use serde::{Deserialize, Serialize};

/// Describes an image written by the remote processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
    /// File name without directory
    pub file: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "mime-type")]
    pub mime_type: String,
}

impl OutputDescriptor {
    /// Drop the full path, keeping only the bare file name. Used for multi-size results.
    pub fn without_path(mut self) -> Self {
        self.path = None;
        self
    }
}
