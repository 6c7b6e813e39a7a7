//! Test helpers for editor tests
//!
//! `RecordingInvoker` answers every request locally and records how it was
//! called (awaited or detached), what it received and when it finished.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use imgbatch_core::EditorError;

use crate::request::InvocationRequest;
use crate::response::InvocationResponse;
use crate::traits::{PendingInvocation, RemoteInvoker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    Awaited,
    Detached,
}

#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    pub mode: InvocationMode,
    pub request: InvocationRequest,
    pub started: Instant,
    pub finished: Option<Instant>,
}

pub struct RecordingInvoker {
    calls: Mutex<Vec<RecordedInvocation>>,
    failing: Mutex<HashSet<String>>,
    completed: AtomicUsize,
    delay: Duration,
    status_code: u16,
    payload: Option<Bytes>,
}

impl Default for RecordingInvoker {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            completed: AtomicUsize::new(0),
            delay: Duration::ZERO,
            status_code: 200,
            payload: None,
        }
    }
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Status code returned for every request not marked as failing
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Answer 500 for any request whose `new_filename` ends with `suffix`
    pub fn fail_for(self, suffix: &str) -> Self {
        self.failing.lock().unwrap().insert(suffix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn record(&self, mode: InvocationMode, request: &InvocationRequest) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(RecordedInvocation {
            mode,
            request: request.clone(),
            started: Instant::now(),
            finished: None,
        });
        calls.len() - 1
    }

    async fn answer(
        &self,
        index: usize,
        request: &InvocationRequest,
    ) -> Result<InvocationResponse, EditorError> {
        let result = self
            .send(request)
            .await
            .and_then(InvocationResponse::into_success);
        self.calls.lock().unwrap()[index].finished = Some(Instant::now());
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl RemoteInvoker for RecordingInvoker {
    async fn send(&self, request: &InvocationRequest) -> Result<InvocationResponse, EditorError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failing = self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|suffix| request.new_filename.ends_with(suffix.as_str()));

        if failing {
            return Ok(InvocationResponse {
                status_code: 500,
                function_error: Some("Unhandled".to_string()),
                payload: None,
            });
        }

        Ok(InvocationResponse {
            status_code: self.status_code,
            function_error: None,
            payload: self.payload.clone(),
        })
    }

    fn function_name(&self) -> &str {
        "recording"
    }

    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResponse, EditorError> {
        let index = self.record(InvocationMode::Awaited, request);
        self.answer(index, request).await
    }

    fn invoke_detached(self: Arc<Self>, request: InvocationRequest) -> PendingInvocation {
        let index = self.record(InvocationMode::Detached, &request);
        let handle = tokio::spawn(async move { self.answer(index, &request).await });
        PendingInvocation::new(handle)
    }
}
