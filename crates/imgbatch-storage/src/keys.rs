//! Storage key mapping for the configured bucket.

use std::path::Path;

use imgbatch_core::EditorError;

use crate::traits::KeyMapper;

/// Key mapper for a single bucket, optionally rooted at a local upload directory.
#[derive(Debug, Clone)]
pub struct BucketKeyMapper {
    bucket: String,
    upload_base_dir: Option<String>,
}

impl BucketKeyMapper {
    pub fn new(bucket: impl Into<String>, upload_base_dir: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            upload_base_dir: upload_base_dir.map(|dir| dir.trim_end_matches('/').to_string()),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn strip_upload_dir<'a>(&self, file: &'a str) -> Option<&'a str> {
        let base = self.upload_base_dir.as_deref()?;
        if base.is_empty() {
            return None;
        }
        let rest = file.strip_prefix(base)?;
        // Reject sibling directories sharing the prefix (uploads-old vs uploads)
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

impl KeyMapper for BucketKeyMapper {
    fn to_key(&self, file: &str) -> Result<String, EditorError> {
        let bucket_pos = if self.bucket.is_empty() {
            None
        } else {
            file.find(self.bucket.as_str())
        };

        let raw = if let Some(pos) = bucket_pos {
            // Skip the separator that follows the bucket name
            file.get(pos + self.bucket.len() + 1..).unwrap_or_default()
        } else if let Some(rest) = self.strip_upload_dir(file) {
            rest
        } else {
            return Err(EditorError::KeyMapping(format!(
                "{} is neither inside bucket {} nor the upload directory",
                file, self.bucket
            )));
        };

        validate_key(raw.trim_start_matches('/'), file)
    }
}

fn validate_key(key: &str, file: &str) -> Result<String, EditorError> {
    if key.is_empty() {
        return Err(EditorError::KeyMapping(format!(
            "{} does not name an object",
            file
        )));
    }

    if Path::new(key)
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(EditorError::KeyMapping(format!(
            "{} escapes the storage root",
            file
        )));
    }

    Ok(key.to_string())
}
