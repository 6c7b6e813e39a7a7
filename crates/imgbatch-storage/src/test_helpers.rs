//! Test helpers for editor tests
//!
//! In-memory probe so sessions can be loaded without real image files.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use imgbatch_core::EditorError;

use crate::traits::{ProbedImage, SizeProbe};

/// Probe answering from a fixed table of file references.
#[derive(Clone, Default)]
pub struct StaticProbe {
    images: Arc<Mutex<HashMap<String, ProbedImage>>>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `file` with the given size and mime type
    pub fn with_image(self, file: &str, width: u32, height: u32, mime_type: &str) -> Self {
        self.set_image(file, width, height, mime_type);
        self
    }

    pub fn set_image(&self, file: &str, width: u32, height: u32, mime_type: &str) {
        self.images.lock().unwrap().insert(
            file.to_string(),
            ProbedImage {
                width,
                height,
                mime_type: mime_type.to_string(),
            },
        );
    }
}

#[async_trait]
impl SizeProbe for StaticProbe {
    async fn probe(&self, file: &str) -> Result<ProbedImage, EditorError> {
        self.images
            .lock()
            .unwrap()
            .get(file)
            .cloned()
            .ok_or_else(|| EditorError::Probe(format!("no image registered for {}", file)))
    }
}
