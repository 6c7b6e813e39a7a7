//! Remote invoker abstraction
//!
//! This module defines the RemoteInvoker trait that every transport must implement,
//! plus the handle returned for detached invocations.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use imgbatch_core::EditorError;
use tokio::task::JoinHandle;

use crate::request::InvocationRequest;
use crate::response::InvocationResponse;

/// Remote invoker abstraction trait
///
/// Transports implement `send`; status interpretation, logging and detaching are shared.
#[async_trait]
pub trait RemoteInvoker: Send + Sync + 'static {
    /// Deliver the request and return the raw response.
    ///
    /// Transport failures (network, serialization, SDK) are reported as
    /// `EditorError::RemoteExecution`. Non-2xx responses are returned as `Ok`.
    async fn send(&self, request: &InvocationRequest) -> Result<InvocationResponse, EditorError>;

    /// Name of the remote function, for logging
    fn function_name(&self) -> &str;

    /// Send and wait for a successful response.
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResponse, EditorError> {
        let start = Instant::now();
        let result = self.send(request).await.and_then(InvocationResponse::into_success);

        match &result {
            Ok(response) => tracing::info!(
                function = %self.function_name(),
                new_filename = %request.new_filename,
                status_code = response.status_code,
                operations = request.operations.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote image processing completed"
            ),
            Err(e) => tracing::error!(
                error = %e,
                function = %self.function_name(),
                new_filename = %request.new_filename,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote image processing failed"
            ),
        }

        result
    }

    /// Start the invocation on the tokio runtime and return immediately.
    ///
    /// The request is owned by the spawned task, so later changes to the caller's
    /// state cannot affect it.
    fn invoke_detached(self: Arc<Self>, request: InvocationRequest) -> PendingInvocation {
        let handle = tokio::spawn(async move { self.invoke(&request).await });
        PendingInvocation::new(handle)
    }
}

/// Joinable handle to a detached invocation.
#[derive(Debug)]
pub struct PendingInvocation {
    handle: JoinHandle<Result<InvocationResponse, EditorError>>,
}

impl PendingInvocation {
    pub fn new(handle: JoinHandle<Result<InvocationResponse, EditorError>>) -> Self {
        Self { handle }
    }

    /// Wait for the invocation to finish. A panicked task becomes a remote execution error.
    pub async fn wait(self) -> Result<InvocationResponse, EditorError> {
        self.handle
            .await
            .map_err(|e| EditorError::remote(format!("Invocation task failed: {}", e)))?
    }
}
