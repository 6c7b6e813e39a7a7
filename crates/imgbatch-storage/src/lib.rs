//! imgbatch Storage Library
//!
//! This crate translates between the references callers hand to the editor
//! (local paths, URLs, bucket-qualified names) and the storage keys the remote
//! processor reads from and writes to. It also probes source images for their
//! size and mime type.
//!
//! # Storage key format
//!
//! Keys are paths relative to the bucket root:
//!
//! - **Bucket-qualified references** (`.../media-bucket/2024/05/a.jpg`): everything after the bucket name
//! - **Upload directory paths** (`/var/www/uploads/2024/05/a.jpg`): the path with the upload directory stripped
//!
//! Keys never contain `..` segments or a leading `/`.

pub mod factory;
pub mod keys;
pub mod probe;
pub mod source;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_key_mapper, create_size_probe};
pub use keys::BucketKeyMapper;
pub use probe::ImageProbe;
pub use source::{classify_source, SourceKind};
pub use traits::{KeyMapper, ProbedImage, SizeProbe};
