//! Application-wide constants.

/// Remote function invoked when `AWS_LAMBDA_IMAGE_FUNCTION` is not set.
pub const DEFAULT_FUNCTION_NAME: &str = "wordpress_image_processor-production";

/// Compression quality applied to a freshly loaded image.
pub const DEFAULT_QUALITY: u8 = 82;

/// Uploads larger than this on either side are downscaled before being stored.
pub const MAX_IMAGE_SIZE: u32 = 2600;

pub const DEFAULT_INVOKE_TIMEOUT_SECS: u64 = 60;

/// Mime type used when the requested output format is not supported.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Mime types the remote processor accepts.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "image/gif",
    "image/jpeg",
    "image/pjpeg",
    "image/png",
    "image/svg+xml",
    "image/vnd.wap.wbmp",
    "image/webp",
];
