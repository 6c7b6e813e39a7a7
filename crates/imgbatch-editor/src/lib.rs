//! imgbatch Editor Library
//!
//! Deferred image editing: transforms are recorded against a loaded image and
//! dispatched to the remote processor as one batch when the image is saved or
//! streamed.
//!
//! ```ignore
//! let context = Arc::new(EditorContext::from_config(&config).await?);
//! let mut editor = LambdaImageEditor::load(context, "/var/www/uploads/2024/05/photo.jpg").await?;
//! editor.rotate(90.0);
//! editor.resize(Some(1024), None, false)?;
//! let saved = editor.save(None, None).await?;
//! ```

pub mod dimensions;
pub mod format;
pub mod operations;
pub mod orchestrator;
pub mod session;
pub mod traits;
pub mod upload;

// Re-export commonly used types
pub use dimensions::{constrain_dimensions, resolve, ResizeDimensions};
pub use format::{DefaultFormatNegotiator, OutputFormat, OutputFormatNegotiator};
pub use operations::OperationLog;
pub use orchestrator::{multi_resize, MultiResizeOutput, SizeTarget, SizeTargets};
pub use session::{EditorContext, LambdaImageEditor, PendingSave, StreamedImage};
pub use traits::ImageEditor;
pub use upload::{handle_upload, UploadedFile};
