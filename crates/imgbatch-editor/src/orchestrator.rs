//! Multi-size fan-out
//!
//! Derives several sizes from one loaded image. The first size that needs work
//! is saved while the caller waits; every later one is dispatched without
//! waiting and joined before `multi_resize` returns.

use std::time::Instant;

use imgbatch_core::{EditorError, OutputDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::session::{LambdaImageEditor, PendingSave};

/// Requested bounds for one named size. At least one side should be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizeTarget {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub crop: Option<bool>,
}

impl SizeTarget {
    pub fn new(width: Option<u32>, height: Option<u32>, crop: bool) -> Self {
        Self {
            width,
            height,
            crop: Some(crop),
        }
    }
}

/// Named sizes in the order they are processed.
pub type SizeTargets = IndexMap<String, SizeTarget>;

/// Per-size results, in request order.
///
/// Sizes that did not apply (too large, identical to the original) have no entry.
#[derive(Debug, Default)]
pub struct MultiResizeOutput {
    results: IndexMap<String, Result<OutputDescriptor, EditorError>>,
}

impl MultiResizeOutput {
    pub fn get(&self, label: &str) -> Option<&Result<OutputDescriptor, EditorError>> {
        self.results.get(label)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Result<OutputDescriptor, EditorError>)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Successful sizes only.
    pub fn metadata(&self) -> IndexMap<String, OutputDescriptor> {
        self.results
            .iter()
            .filter_map(|(label, result)| {
                result
                    .as_ref()
                    .ok()
                    .map(|descriptor| (label.clone(), descriptor.clone()))
            })
            .collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &EditorError)> {
        self.results
            .iter()
            .filter_map(|(label, result)| result.as_ref().err().map(|e| (label.as_str(), e)))
    }
}

/// Save every size in `targets` derived from the editor's current image.
///
/// Each size starts from the operations recorded before the call, never from a
/// sibling's. On return the editor's size and operation log are as they were.
/// An error saving the first size aborts the call; later failures are reported
/// per size.
pub async fn multi_resize(
    editor: &mut LambdaImageEditor,
    targets: &SizeTargets,
) -> Result<MultiResizeOutput, EditorError> {
    let start = Instant::now();
    let orig_size = editor.size;
    let orig_operations = editor.operations.snapshot();

    let mut output = MultiResizeOutput::default();
    let mut pending: Vec<(String, PendingSave)> = Vec::new();
    let mut first = true;

    for (label, target) in targets {
        editor.operations.restore(orig_operations.clone());

        if target.width.is_none() && target.height.is_none() {
            tracing::debug!(size = %label, "Skipping size without width or height");
            continue;
        }

        let crop = target.crop.unwrap_or(false);
        if let Err(e) = editor.resize(target.width, target.height, crop) {
            tracing::debug!(size = %label, error = %e, "Skipping size that does not apply");
            editor.size = orig_size;
            continue;
        }

        if editor.size == orig_size {
            tracing::debug!(size = %label, "Skipping size identical to the original");
            continue;
        }

        if first {
            first = false;
            match editor.save_output(None, None).await {
                Ok(saved) => {
                    output.results.insert(label.clone(), Ok(saved.without_path()));
                }
                Err(e) => {
                    editor.size = orig_size;
                    editor.operations.restore(orig_operations);
                    return Err(e);
                }
            }
        } else {
            match editor.save_async(None, None).await {
                Ok(save) => {
                    output
                        .results
                        .insert(label.clone(), Ok(save.metadata.clone().without_path()));
                    pending.push((label.clone(), save));
                }
                Err(e) => {
                    tracing::warn!(size = %label, error = %e, "Could not dispatch size");
                    output.results.insert(label.clone(), Err(e));
                }
            }
        }

        editor.size = orig_size;
    }

    editor.operations.restore(orig_operations);

    let detached = pending.len();
    for (label, save) in pending {
        if let Err(e) = save.wait().await {
            tracing::warn!(size = %label, error = %e, "Detached save failed");
            output.results.insert(label, Err(e));
        }
    }

    tracing::info!(
        file = %editor.file(),
        sizes = output.len(),
        detached = detached,
        failed = output.errors().count(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Multi-size resize completed"
    );

    Ok(output)
}

impl LambdaImageEditor {
    /// See [`multi_resize`].
    pub async fn multi_resize(
        &mut self,
        targets: &SizeTargets,
    ) -> Result<MultiResizeOutput, EditorError> {
        multi_resize(self, targets).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_size_target_defaults() {
        let target: SizeTarget = serde_json::from_value(json!({"width": 150})).unwrap();
        assert_eq!(
            target,
            SizeTarget {
                width: Some(150),
                height: None,
                crop: None,
            }
        );
    }

    #[test]
    fn test_metadata_skips_failures() {
        let mut output = MultiResizeOutput::default();
        output.results.insert(
            "thumbnail".to_string(),
            Ok(OutputDescriptor {
                path: None,
                file: "a-150x150.jpg".to_string(),
                width: 150,
                height: 150,
                mime_type: "image/jpeg".to_string(),
            }),
        );
        output
            .results
            .insert("large".to_string(), Err(EditorError::remote("Unhandled")));

        let metadata = output.metadata();
        assert_eq!(metadata.len(), 1);
        assert!(metadata.contains_key("thumbnail"));
        assert_eq!(output.errors().count(), 1);
        assert_eq!(output.labels().collect::<Vec<_>>(), vec!["thumbnail", "large"]);
    }
}
