//! Configuration module
//!
//! Editor configuration is read from the environment once, at the edge of the
//! program, and injected into the invoker, the key mapper and the editor context.

use std::env;

use crate::constants::{
    DEFAULT_FUNCTION_NAME, DEFAULT_INVOKE_TIMEOUT_SECS, DEFAULT_QUALITY, MAX_IMAGE_SIZE,
};
use crate::invoker_types::InvokerBackend;

/// Remote image editor configuration
#[derive(Clone, Debug)]
pub struct EditorConfig {
    // Storage / credentials
    pub bucket: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub bucket_url: Option<String>, // Public or signed-proxy base URL for bucket objects
    // Remote function
    pub function_name: String,
    pub invoker_backend: InvokerBackend,
    pub function_url: Option<String>, // Only used by the http invoker
    pub invoke_timeout_secs: u64,
    // Local paths
    pub upload_base_dir: Option<String>,
    // Image defaults
    pub default_quality: u8,
    pub max_image_size: u32,
}

impl EditorConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let invoker_backend = match env::var("IMAGE_INVOKER") {
            Ok(value) => value.parse::<InvokerBackend>()?,
            Err(_) => InvokerBackend::default(),
        };

        let config = EditorConfig {
            bucket: non_empty_var("AWS_LAMBDA_IMAGE_BUCKET"),
            access_key_id: non_empty_var("AWS_LAMBDA_IMAGE_KEY"),
            secret_access_key: non_empty_var("AWS_LAMBDA_IMAGE_SECRET"),
            region: non_empty_var("AWS_LAMBDA_IMAGE_REGION"),
            bucket_url: non_empty_var("AWS_LAMBDA_IMAGE_BUCKET_URL"),
            function_name: env::var("AWS_LAMBDA_IMAGE_FUNCTION")
                .unwrap_or_else(|_| DEFAULT_FUNCTION_NAME.to_string()),
            invoker_backend,
            function_url: non_empty_var("AWS_LAMBDA_IMAGE_ENDPOINT"),
            invoke_timeout_secs: env::var("IMAGE_INVOKE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_INVOKE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_INVOKE_TIMEOUT_SECS),
            upload_base_dir: non_empty_var("UPLOAD_BASE_DIR"),
            default_quality: env::var("IMAGE_DEFAULT_QUALITY")
                .unwrap_or_else(|_| DEFAULT_QUALITY.to_string())
                .parse()
                .unwrap_or(DEFAULT_QUALITY),
            max_image_size: env::var("MAX_IMAGE_SIZE")
                .unwrap_or_else(|_| MAX_IMAGE_SIZE.to_string())
                .parse()
                .unwrap_or(MAX_IMAGE_SIZE),
        };

        config.validate()?;
        Ok(config)
    }

    /// Minimal configuration pointing at `bucket`, with every other field defaulted.
    pub fn for_bucket(bucket: impl Into<String>) -> Self {
        EditorConfig {
            bucket: Some(bucket.into()),
            access_key_id: None,
            secret_access_key: None,
            region: None,
            bucket_url: None,
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            invoker_backend: InvokerBackend::Lambda,
            function_url: None,
            invoke_timeout_secs: DEFAULT_INVOKE_TIMEOUT_SECS,
            upload_base_dir: None,
            default_quality: DEFAULT_QUALITY,
            max_image_size: MAX_IMAGE_SIZE,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.default_quality > 100 {
            return Err(anyhow::anyhow!(
                "IMAGE_DEFAULT_QUALITY must be between 0 and 100"
            ));
        }

        if self.max_image_size == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE must be greater than 0"));
        }

        if self.function_name.trim().is_empty() {
            return Err(anyhow::anyhow!("AWS_LAMBDA_IMAGE_FUNCTION cannot be empty"));
        }

        if let Some(url) = &self.bucket_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "AWS_LAMBDA_IMAGE_BUCKET_URL must be an http(s) URL"
                ));
            }
        }

        if self.invoker_backend == InvokerBackend::Http {
            match &self.function_url {
                Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "AWS_LAMBDA_IMAGE_ENDPOINT must be an http(s) URL"
                    ));
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "IMAGE_INVOKER=http requires AWS_LAMBDA_IMAGE_ENDPOINT to be set"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Whether the remote editor can be offered at all: bucket, key, secret and region are set.
    pub fn is_available(&self) -> bool {
        self.bucket.is_some()
            && self.access_key_id.is_some()
            && self.secret_access_key.is_some()
            && self.region.is_some()
    }

    pub fn bucket(&self) -> &str {
        self.bucket.as_deref().unwrap_or_default()
    }

    /// Base URL that bucket keys are appended to when reading source objects.
    ///
    /// `AWS_LAMBDA_IMAGE_BUCKET_URL` wins; otherwise the virtual-hosted S3
    /// endpoint is derived from bucket and region.
    pub fn object_base_url(&self) -> Option<String> {
        if let Some(url) = &self.bucket_url {
            return Some(url.trim_end_matches('/').to_string());
        }
        match (&self.bucket, &self.region) {
            (Some(bucket), Some(region)) => {
                Some(format!("https://{}.s3.{}.amazonaws.com", bucket, region))
            }
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
