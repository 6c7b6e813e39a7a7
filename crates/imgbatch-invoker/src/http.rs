//! HTTP transport for Lambda function URLs and compatible endpoints.

use std::time::Duration;

use async_trait::async_trait;
use imgbatch_core::{EditorConfig, EditorError};
use reqwest::Client;

use crate::request::InvocationRequest;
use crate::response::InvocationResponse;
use crate::traits::RemoteInvoker;

const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";

pub struct HttpInvoker {
    client: Client,
    endpoint: String,
    function_name: String,
}

impl HttpInvoker {
    pub fn new(
        endpoint: impl Into<String>,
        function_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EditorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EditorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            function_name: function_name.into(),
        })
    }

    pub fn from_config(config: &EditorConfig) -> Result<Self, EditorError> {
        let endpoint = config.function_url.clone().ok_or_else(|| {
            EditorError::Config("AWS_LAMBDA_IMAGE_ENDPOINT not configured".to_string())
        })?;
        Self::new(
            endpoint,
            config.function_name.clone(),
            Duration::from_secs(config.invoke_timeout_secs),
        )
    }
}

#[async_trait]
impl RemoteInvoker for HttpInvoker {
    async fn send(&self, request: &InvocationRequest) -> Result<InvocationResponse, EditorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| EditorError::remote(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let header_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .bytes()
            .await
            .map_err(|e| EditorError::remote(format!("Failed to read response: {}", e)))?;

        let function_error = match header_error {
            Some(err) => Some(err),
            None if !status.is_success() => Some(if body.is_empty() {
                "Unknown error".to_string()
            } else {
                String::from_utf8_lossy(&body).into_owned()
            }),
            None => None,
        };

        Ok(InvocationResponse {
            status_code: status.as_u16(),
            function_error,
            payload: if body.is_empty() { None } else { Some(body) },
        })
    }

    fn function_name(&self) -> &str {
        &self.function_name
    }
}
