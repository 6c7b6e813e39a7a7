//! Transform session
//!
//! A `LambdaImageEditor` tracks the size, mime type and quality of one source
//! image plus the operations applied to it so far. Geometry is updated eagerly
//! on every operation; pixels are only touched by the remote processor when the
//! session is saved or streamed.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use imgbatch_core::constants::MAX_IMAGE_SIZE;
use imgbatch_core::{EditorConfig, EditorError, ImageSize, Operation, OutputDescriptor, Quality};
use imgbatch_invoker::{
    create_invoker, InvocationRequest, PendingInvocation, RemoteInvoker, ReturnMode,
};
use imgbatch_storage::{classify_source, create_key_mapper, create_size_probe, KeyMapper, SizeProbe};

use crate::dimensions::resolve;
use crate::format::{
    extension_for_mime, file_name, generate_filename, is_supported_mime_type,
    DefaultFormatNegotiator, OutputFormatNegotiator,
};
use crate::operations::OperationLog;

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct EditorContext {
    pub invoker: Arc<dyn RemoteInvoker>,
    pub key_mapper: Arc<dyn KeyMapper>,
    pub probe: Arc<dyn SizeProbe>,
    pub negotiator: Arc<dyn OutputFormatNegotiator>,
    pub bucket: String,
    pub default_quality: Quality,
    pub max_image_size: u32,
}

impl EditorContext {
    pub fn new(
        invoker: Arc<dyn RemoteInvoker>,
        key_mapper: Arc<dyn KeyMapper>,
        probe: Arc<dyn SizeProbe>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            invoker,
            key_mapper,
            probe,
            negotiator: Arc::new(DefaultFormatNegotiator::new()),
            bucket: bucket.into(),
            default_quality: Quality::default(),
            max_image_size: MAX_IMAGE_SIZE,
        }
    }

    /// Build the invoker, key mapper and probe described by `config`.
    pub async fn from_config(config: &EditorConfig) -> Result<Self, EditorError> {
        let invoker = create_invoker(config).await?;
        let key_mapper = create_key_mapper(config)?;
        let probe = create_size_probe(config)?;

        let mut context = Self::new(invoker, key_mapper, probe, config.bucket());
        context.default_quality = Quality::new(u32::from(config.default_quality))?;
        context.max_image_size = config.max_image_size;
        Ok(context)
    }

    pub fn with_negotiator(mut self, negotiator: Arc<dyn OutputFormatNegotiator>) -> Self {
        self.negotiator = negotiator;
        self
    }

    pub fn with_default_quality(mut self, quality: Quality) -> Self {
        self.default_quality = quality;
        self
    }

    pub fn with_max_image_size(mut self, max_image_size: u32) -> Self {
        self.max_image_size = max_image_size;
        self
    }
}

/// Handle to a save running on the runtime, with the metadata it will produce.
#[derive(Debug)]
pub struct PendingSave {
    pub pending: PendingInvocation,
    pub metadata: OutputDescriptor,
}

impl PendingSave {
    /// Wait for the remote call; on success returns the metadata computed at save time.
    pub async fn wait(self) -> Result<OutputDescriptor, EditorError> {
        let filename = self.metadata.path.clone().unwrap_or_else(|| self.metadata.file.clone());
        self.pending
            .wait()
            .await
            .map(|_| self.metadata)
            .map_err(|e| e.with_filename(filename))
    }
}

/// Image bytes returned by `stream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedImage {
    pub mime_type: String,
    pub data: Bytes,
}

/// Request and metadata for one output, computed before anything is sent.
struct PreparedOutput {
    request: InvocationRequest,
    metadata: OutputDescriptor,
}

pub struct LambdaImageEditor {
    context: Arc<EditorContext>,
    file: String,
    pub(crate) size: ImageSize,
    mime_type: String,
    quality: Quality,
    pub(crate) operations: OperationLog,
}

impl std::fmt::Debug for LambdaImageEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaImageEditor")
            .field("file", &self.file)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .field("quality", &self.quality)
            .field("operations", &self.operations.len())
            .finish()
    }
}

impl LambdaImageEditor {
    /// Open `file` for editing.
    ///
    /// The reference must be an existing local file, an http(s) URL, or name the
    /// configured bucket. Size and mime type come from the probe.
    pub async fn load(
        context: Arc<EditorContext>,
        file: impl Into<String>,
    ) -> Result<Self, EditorError> {
        let file = file.into();
        let kind = classify_source(&file, &context.bucket).await?;

        let probed = context.probe.probe(&file).await?;
        if probed.width == 0 || probed.height == 0 {
            return Err(EditorError::Probe(format!(
                "{} reports an empty size ({}x{})",
                file, probed.width, probed.height
            )));
        }

        tracing::debug!(
            file = %file,
            source = ?kind,
            width = probed.width,
            height = probed.height,
            mime_type = %probed.mime_type,
            "Loaded image"
        );

        let quality = context.default_quality;
        Ok(Self {
            context,
            file,
            size: ImageSize::new(probed.width, probed.height),
            mime_type: probed.mime_type,
            quality,
            operations: OperationLog::new(),
        })
    }

    pub fn supports_mime_type(mime_type: &str) -> bool {
        is_supported_mime_type(mime_type)
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn set_quality(&mut self, quality: u32) -> Result<(), EditorError> {
        self.quality = Quality::new(quality)?;
        Ok(())
    }

    pub fn operations(&self) -> &OperationLog {
        &self.operations
    }

    pub fn context(&self) -> &Arc<EditorContext> {
        &self.context
    }

    /// Resize to fit `max_w x max_h`, or crop to exactly that size when `crop` is set.
    ///
    /// Requesting the current size is a no-op.
    pub fn resize(
        &mut self,
        max_w: Option<u32>,
        max_h: Option<u32>,
        crop: bool,
    ) -> Result<(), EditorError> {
        if max_w == Some(self.size.width) && max_h == Some(self.size.height) {
            return Ok(());
        }

        let dims = resolve(self.size, max_w, max_h, crop).ok_or_else(|| {
            EditorError::Dimension(format!(
                "no resize of {} to {:?}x{:?} (crop: {})",
                self.size, max_w, max_h, crop
            ))
        })?;

        if crop {
            return self.crop(
                dims.src_x,
                dims.src_y,
                dims.src_w,
                dims.src_h,
                Some(dims.dst_w),
                Some(dims.dst_h),
                false,
            );
        }

        self.operations.add(Operation::Resize {
            width: dims.dst_w,
            height: dims.dst_h,
        });
        self.size = dims.destination();
        Ok(())
    }

    /// Crop the `src_w x src_h` rectangle at (`src_x`, `src_y`), optionally scaling it to `dst_w x dst_h`.
    ///
    /// With `src_abs` the width and height are end coordinates instead.
    #[allow(clippy::too_many_arguments)]
    pub fn crop(
        &mut self,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
        dst_w: Option<u32>,
        dst_h: Option<u32>,
        src_abs: bool,
    ) -> Result<(), EditorError> {
        let (src_w, src_h) = if src_abs {
            (src_w.saturating_sub(src_x), src_h.saturating_sub(src_y))
        } else {
            (src_w, src_h)
        };

        let dst_w = dst_w.filter(|w| *w > 0);
        let dst_h = dst_h.filter(|h| *h > 0);
        let new_size = ImageSize::new(dst_w.unwrap_or(src_w), dst_h.unwrap_or(src_h));

        if new_size.width == 0 || new_size.height == 0 {
            return Err(EditorError::Dimension(format!(
                "crop of {}x{} at ({}, {}) is empty",
                src_w, src_h, src_x, src_y
            )));
        }

        self.operations.add(Operation::Crop {
            src_x,
            src_y,
            src_width: src_w,
            src_height: src_h,
            destination_width: dst_w,
            destination_height: dst_h,
        });
        self.size = new_size;
        Ok(())
    }

    /// Rotate counter-clockwise by `angle` degrees.
    ///
    /// Width and height swap for odd multiples of 90 (integer part of the angle).
    /// Other angles leave the tracked size unchanged.
    pub fn rotate(&mut self, angle: f64) {
        self.operations.add(Operation::Rotate { angle });

        let whole = angle.abs().trunc() as u64;
        if whole % 180 != 0 && whole % 90 == 0 {
            self.size = self.size.transposed();
        }
    }

    pub fn flip(&mut self, horizontal: bool, vertical: bool) {
        self.operations.add(Operation::Flip {
            horizontal,
            vertical,
        });
    }

    fn prepare_output(
        &self,
        filename: Option<&str>,
        mime_type: Option<&str>,
        return_mode: ReturnMode,
    ) -> Result<PreparedOutput, EditorError> {
        let format = self
            .context
            .negotiator
            .negotiate(filename, mime_type, &self.file, &self.mime_type);

        let path = format.filename.unwrap_or_else(|| {
            generate_filename(&self.file, self.size, None, Some(&format.extension))
        });

        let new_filename = match return_mode {
            ReturnMode::Bucket => self.context.key_mapper.to_key(&path)?,
            ReturnMode::Stream => path.clone(),
        };
        let source_key = self.context.key_mapper.to_key(&self.file)?;

        Ok(PreparedOutput {
            request: InvocationRequest {
                bucket: self.context.bucket.clone(),
                filename: source_key,
                new_filename,
                quality: self.quality.value(),
                operations: self.operations.to_vec(),
                return_mode,
            },
            metadata: OutputDescriptor {
                file: file_name(&path),
                path: Some(path),
                width: self.size.width,
                height: self.size.height,
                mime_type: format.mime_type,
            },
        })
    }

    /// Run the pending operations remotely and wait. The session keeps its source.
    pub(crate) async fn save_output(
        &mut self,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<OutputDescriptor, EditorError> {
        let prepared = self.prepare_output(filename, mime_type, ReturnMode::Bucket)?;
        let start = Instant::now();

        match self.context.invoker.invoke(&prepared.request).await {
            Ok(_) => {
                self.operations.clear();
                tracing::debug!(
                    new_filename = %prepared.request.new_filename,
                    size = %self.size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Saved image"
                );
                Ok(prepared.metadata)
            }
            Err(e) => {
                let path = prepared.metadata.path.unwrap_or_default();
                Err(e.with_filename(path))
            }
        }
    }

    /// Save the edited image, by default next to the source as `<name>-<W>x<H>.<ext>`.
    ///
    /// On success the saved file becomes the session's source. On failure the
    /// operation log is left intact.
    pub async fn save(
        &mut self,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<OutputDescriptor, EditorError> {
        let saved = self.save_output(filename, mime_type).await?;

        if let Some(path) = &saved.path {
            self.file = path.clone();
        }
        self.mime_type = saved.mime_type.clone();

        Ok(saved)
    }

    /// Start a save without waiting for it.
    ///
    /// The operation log is cleared immediately; the spawned request owns its own copy.
    pub async fn save_async(
        &mut self,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<PendingSave, EditorError> {
        let prepared = self.prepare_output(filename, mime_type, ReturnMode::Bucket)?;

        tracing::debug!(
            new_filename = %prepared.request.new_filename,
            operations = prepared.request.operations.len(),
            "Dispatching detached save"
        );

        let pending = Arc::clone(&self.context.invoker).invoke_detached(prepared.request);
        self.operations.clear();

        Ok(PendingSave {
            pending,
            metadata: prepared.metadata,
        })
    }

    /// Run the pending operations remotely and return the resulting image bytes.
    pub async fn stream(&self, mime_type: Option<&str>) -> Result<StreamedImage, EditorError> {
        let extension = extension_for_mime(mime_type.unwrap_or(&self.mime_type)).unwrap_or("jpg");
        let stream_name = format!("stream.{}", extension);

        let prepared = self.prepare_output(Some(&stream_name), mime_type, ReturnMode::Stream)?;

        let response = self.context.invoker.invoke(&prepared.request).await?;
        let data = response.decode_stream_payload()?;

        tracing::debug!(
            mime_type = %prepared.metadata.mime_type,
            bytes = data.len(),
            "Streamed image"
        );

        Ok(StreamedImage {
            mime_type: prepared.metadata.mime_type,
            data,
        })
    }
}
