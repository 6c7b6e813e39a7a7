use base64::Engine;
use bytes::Bytes;
use imgbatch_core::EditorError;

/// Raw answer from the remote function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status_code: u16,
    /// Error reported by the function itself (e.g. "Unhandled")
    pub function_error: Option<String>,
    pub payload: Option<Bytes>,
}

impl InvocationResponse {
    pub fn ok(payload: Option<Bytes>) -> Self {
        Self {
            status_code: 200,
            function_error: None,
            payload,
        }
    }

    /// 2xx status and no function error.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code) && self.function_error.is_none()
    }

    /// Convert a failed response into `EditorError::RemoteExecution`.
    pub fn into_success(self) -> Result<Self, EditorError> {
        if self.is_success() {
            return Ok(self);
        }

        let message = match &self.function_error {
            Some(err) if !err.is_empty() => err.clone(),
            _ => format!("remote function returned status {}", self.status_code),
        };
        Err(EditorError::remote(message))
    }

    /// Decode a `return: "stream"` payload: a base64 string, either as a JSON
    /// string literal or as bare text.
    pub fn decode_stream_payload(&self) -> Result<Bytes, EditorError> {
        let payload = self
            .payload
            .as_ref()
            .ok_or_else(|| EditorError::StreamDecode("response has no payload".to_string()))?;

        let encoded = match serde_json::from_slice::<String>(payload) {
            Ok(decoded) => decoded,
            Err(_) => std::str::from_utf8(payload)
                .map_err(|e| EditorError::StreamDecode(format!("payload is not text: {}", e)))?
                .to_string(),
        };
        let encoded = encoded.trim();

        if encoded.is_empty() {
            return Err(EditorError::StreamDecode("payload is empty".to_string()));
        }

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(|e| EditorError::StreamDecode(format!("invalid base64 payload: {}", e)))
    }
}
