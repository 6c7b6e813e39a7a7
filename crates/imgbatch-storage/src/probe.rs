//! Image size probe backed by the `image` crate.
//!
//! Only the header is read; pixels are never decoded.
//!
//! Bucket references (`s3://media-bucket/2024/05/a.jpg`) are read over HTTP
//! from the bucket's object URL with a ranged GET covering the first
//! [`HEADER_RANGE_BYTES`]. The whole object is fetched only when the header
//! does not fit in that range.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageReader;
use imgbatch_core::EditorError;
use reqwest::StatusCode;

use crate::keys::BucketKeyMapper;
use crate::source::{classify_source, is_url, SourceKind};
use crate::traits::{KeyMapper, ProbedImage, SizeProbe};

/// Bytes requested when reading an object header from the bucket.
pub const HEADER_RANGE_BYTES: u64 = 64 * 1024;

#[derive(Debug, Clone)]
struct BucketObjects {
    key_mapper: BucketKeyMapper,
    base_url: String,
}

/// Probes local files directly and fetches URLs and bucket objects over HTTP.
#[derive(Debug, Clone)]
pub struct ImageProbe {
    client: reqwest::Client,
    bucket: Option<BucketObjects>,
}

impl ImageProbe {
    pub fn new(timeout: Duration) -> Result<Self, EditorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EditorError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            bucket: None,
        })
    }

    /// Resolve bucket references to `<base_url>/<key>`, keys computed by `key_mapper`.
    pub fn with_bucket(mut self, key_mapper: BucketKeyMapper, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.bucket = Some(BucketObjects {
            key_mapper,
            base_url,
        });
        self
    }

    /// Object URL for `file` when it is a bucket reference this probe can read.
    async fn object_url(&self, file: &str) -> Option<Result<String, EditorError>> {
        let objects = self.bucket.as_ref()?;
        match classify_source(file, objects.key_mapper.bucket()).await {
            Ok(SourceKind::Bucket) => Some(
                objects
                    .key_mapper
                    .to_key(file)
                    .map(|key| format!("{}/{}", objects.base_url, key)),
            ),
            _ => None,
        }
    }

    async fn probe_bucket(&self, file: &str, url: &str) -> Result<ProbedImage, EditorError> {
        let (body, partial) = self.fetch(url, Some(HEADER_RANGE_BYTES)).await?;

        match read_header(ImageReader::new(Cursor::new(body.as_ref())), file) {
            Err(e) if partial => {
                tracing::debug!(
                    file = %file,
                    error = %e,
                    range_bytes = HEADER_RANGE_BYTES,
                    "Header not within range, fetching whole object"
                );
                let (body, _) = self.fetch(url, None).await?;
                read_header(ImageReader::new(Cursor::new(body.as_ref())), file)
            }
            result => result,
        }
    }

    /// GET `url`, optionally limited to the first `range` bytes. The flag is set
    /// when the server answered with a partial body.
    async fn fetch(&self, url: &str, range: Option<u64>) -> Result<(Bytes, bool), EditorError> {
        let mut request = self.client.get(url);
        if let Some(bytes) = range {
            request = request.header(reqwest::header::RANGE, format!("bytes=0-{}", bytes - 1));
        }

        let response = request
            .send()
            .await
            .map_err(|e| EditorError::Probe(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EditorError::Probe(format!("{}: HTTP {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EditorError::Probe(format!("{}: {}", url, e)))?;

        Ok((body, status == StatusCode::PARTIAL_CONTENT))
    }

    async fn probe_local(&self, file: &str) -> Result<ProbedImage, EditorError> {
        let path = PathBuf::from(file);
        tokio::task::spawn_blocking(move || {
            let reader = ImageReader::open(&path)
                .map_err(|e| EditorError::Probe(format!("{}: {}", path.display(), e)))?;
            read_header(reader, &path.display().to_string())
        })
        .await
        .map_err(|e| EditorError::Probe(format!("Probe task failed: {}", e)))?
    }

    async fn probe_url(&self, url: &str) -> Result<ProbedImage, EditorError> {
        let (body, _) = self.fetch(url, None).await?;
        read_header(ImageReader::new(Cursor::new(body.as_ref())), url)
    }
}

fn read_header<R: std::io::BufRead + std::io::Seek>(
    reader: ImageReader<R>,
    name: &str,
) -> Result<ProbedImage, EditorError> {
    let reader = reader
        .with_guessed_format()
        .map_err(|e| EditorError::Probe(format!("{}: {}", name, e)))?;

    let format = reader
        .format()
        .ok_or_else(|| EditorError::Probe(format!("{}: unrecognised image format", name)))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| EditorError::Probe(format!("{}: {}", name, e)))?;

    Ok(ProbedImage {
        width,
        height,
        mime_type: format.to_mime_type().to_string(),
    })
}

#[async_trait]
impl SizeProbe for ImageProbe {
    async fn probe(&self, file: &str) -> Result<ProbedImage, EditorError> {
        let start = Instant::now();
        let result = if is_url(file) {
            self.probe_url(file).await
        } else if let Some(url) = self.object_url(file).await {
            match url {
                Ok(url) => self.probe_bucket(file, &url).await,
                Err(e) => Err(e),
            }
        } else {
            self.probe_local(file).await
        };

        match &result {
            Ok(probed) => tracing::debug!(
                file = %file,
                width = probed.width,
                height = probed.height,
                mime_type = %probed.mime_type,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Probed image"
            ),
            Err(e) => tracing::warn!(error = %e, file = %file, "Image probe failed"),
        }

        result
    }
}
