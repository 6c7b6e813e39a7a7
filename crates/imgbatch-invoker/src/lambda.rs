//! AWS Lambda transport
//!
//! Invokes the image-processing function synchronously (`RequestResponse`) through
//! the Lambda `Invoke` API.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_lambda::config::Credentials;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::Client as LambdaClient;
use bytes::Bytes;
use imgbatch_core::{EditorConfig, EditorError};

use crate::request::InvocationRequest;
use crate::response::InvocationResponse;
use crate::traits::RemoteInvoker;

pub struct LambdaInvoker {
    client: LambdaClient,
    function_name: String,
}

impl LambdaInvoker {
    /// Create an invoker from configuration.
    ///
    /// Uses the configured key and secret when both are set, otherwise the
    /// default AWS credential chain.
    pub async fn new(config: &EditorConfig) -> Result<Self, EditorError> {
        let region = config.region.clone().ok_or_else(|| {
            EditorError::Config("AWS_LAMBDA_IMAGE_REGION not configured".to_string())
        })?;

        let timeout = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.invoke_timeout_secs))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()))
            .timeout_config(timeout);

        if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key.clone(),
                secret.clone(),
                None,
                None,
                "imgbatch",
            ));
        } else {
            tracing::debug!("No explicit Lambda credentials configured, using default chain");
        }

        let sdk_config = loader.load().await;

        tracing::info!(
            function = %config.function_name,
            region = %region,
            "Lambda invoker initialized"
        );

        Ok(Self::from_client(
            LambdaClient::new(&sdk_config),
            config.function_name.clone(),
        ))
    }

    pub fn from_client(client: LambdaClient, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }
}

#[async_trait]
impl RemoteInvoker for LambdaInvoker {
    async fn send(&self, request: &InvocationRequest) -> Result<InvocationResponse, EditorError> {
        let payload = request.to_payload()?;

        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| {
                EditorError::remote(format!("Lambda invoke failed: {}", DisplayErrorContext(&e)))
            })?;

        Ok(InvocationResponse {
            status_code: u16::try_from(output.status_code()).unwrap_or(0),
            function_error: output.function_error().map(String::from),
            payload: output
                .payload()
                .map(|blob| Bytes::copy_from_slice(blob.as_ref())),
        })
    }

    fn function_name(&self) -> &str {
        &self.function_name
    }
}
