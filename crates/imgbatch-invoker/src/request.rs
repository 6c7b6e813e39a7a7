use imgbatch_core::Operation;
use serde::{Deserialize, Serialize};

/// Where the remote processor should deliver its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMode {
    /// Write the transformed image to `new_filename` in the bucket
    #[default]
    Bucket,
    /// Return the transformed image base64-encoded in the response payload
    Stream,
}

/// Payload sent to the remote image-processing function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub bucket: String,
    /// Source storage key
    pub filename: String,
    /// Destination storage key
    pub new_filename: String,
    pub quality: u8,
    pub operations: Vec<Operation>,
    #[serde(rename = "return")]
    pub return_mode: ReturnMode,
}

impl InvocationRequest {
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
