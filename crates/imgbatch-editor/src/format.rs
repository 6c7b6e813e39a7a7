//! Output format negotiation and derived file names.

use std::collections::HashMap;
use std::path::Path;

use imgbatch_core::constants::{DEFAULT_MIME_TYPE, SUPPORTED_MIME_TYPES};
use imgbatch_core::ImageSize;

/// Extension to mime type. The first extension listed for a mime type is its canonical one.
const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("gif", "image/gif"),
    ("png", "image/png"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("heic", "image/heic"),
    ("svg", "image/svg+xml"),
    ("wbmp", "image/vnd.wap.wbmp"),
];

pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_lowercase();
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    // pjpeg shares the jpeg extension
    let mime_type = match mime_type {
        "image/pjpeg" => "image/jpeg",
        other => other,
    };
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(_, mime)| *mime == mime_type)
        .map(|(ext, _)| *ext)
}

pub fn is_supported_mime_type(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&mime_type)
}

/// Lowercased extension of `file`, or an empty string.
pub fn file_extension(file: &str) -> String {
    Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Final name of `file`, without its directory.
pub fn file_name(file: &str) -> String {
    Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_string()
}

fn replace_extension(file: &str, extension: &str) -> String {
    Path::new(file)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}

/// `<dir>/<stem>-<suffix>.<ext>` next to `file`. The suffix defaults to the size (`150x100`).
pub fn generate_filename(
    file: &str,
    size: ImageSize,
    suffix: Option<&str>,
    extension: Option<&str>,
) -> String {
    let path = Path::new(file);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let suffix = suffix.map(String::from).unwrap_or_else(|| size.to_string());

    let extension = match extension.filter(|e| !e.is_empty()) {
        Some(ext) => ext.to_lowercase(),
        None => file_extension(file),
    };

    let name = if extension.is_empty() {
        format!("{}-{}", stem, suffix)
    } else {
        format!("{}-{}.{}", stem, suffix, extension)
    };

    path.with_file_name(name).to_string_lossy().into_owned()
}

/// Result of negotiating an output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    /// Requested file name with its extension corrected, if a name was requested
    pub filename: Option<String>,
    pub extension: String,
    pub mime_type: String,
}

/// Decides the file name, extension and mime type of a save.
pub trait OutputFormatNegotiator: Send + Sync {
    fn negotiate(
        &self,
        filename: Option<&str>,
        mime_type: Option<&str>,
        current_file: &str,
        current_mime: &str,
    ) -> OutputFormat;
}

/// Negotiator preferring the explicit mime type, then the file name's extension,
/// then the current image's type. Unsupported types fall back to the default mime type.
#[derive(Debug, Clone)]
pub struct DefaultFormatNegotiator {
    output_formats: HashMap<String, String>,
    default_mime_type: String,
}

impl Default for DefaultFormatNegotiator {
    fn default() -> Self {
        Self {
            output_formats: HashMap::new(),
            default_mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }
}

impl DefaultFormatNegotiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always convert `from` images to `to` (e.g. png to webp)
    pub fn with_output_format(mut self, from: &str, to: &str) -> Self {
        self.output_formats.insert(from.to_string(), to.to_string());
        self
    }

    /// Mime type used when neither the request nor the source names a supported type
    pub fn with_default_mime_type(mut self, mime_type: &str) -> Self {
        self.default_mime_type = mime_type.to_string();
        self
    }
}

impl OutputFormatNegotiator for DefaultFormatNegotiator {
    fn negotiate(
        &self,
        filename: Option<&str>,
        mime_type: Option<&str>,
        current_file: &str,
        current_mime: &str,
    ) -> OutputFormat {
        let mut new_ext = mime_type.and_then(extension_for_mime).map(String::from);

        let (file_ext, file_mime) = match filename {
            Some(name) => {
                let ext = file_extension(name);
                let mime = mime_for_extension(&ext).map(String::from);
                (ext, mime)
            }
            None => (file_extension(current_file), Some(current_mime.to_string())),
        };

        // An explicit mime type matching the file's type keeps the file's extension
        let mut mime = mime_type.map(String::from);
        if mime.is_none() || mime == file_mime {
            mime = file_mime;
            new_ext = Some(file_ext);
        }

        if let Some(mapped) = mime.as_ref().and_then(|m| self.output_formats.get(m)) {
            if is_supported_mime_type(mapped) {
                new_ext = extension_for_mime(mapped).map(String::from);
                mime = Some(mapped.clone());
            }
        }

        let mime = match mime {
            Some(m) if is_supported_mime_type(&m) => m,
            _ => {
                new_ext = extension_for_mime(&self.default_mime_type).map(String::from);
                self.default_mime_type.clone()
            }
        };

        let extension = new_ext.unwrap_or_default();
        let filename = filename.map(|name| {
            if extension.is_empty() {
                name.to_string()
            } else {
                replace_extension(name, &extension)
            }
        });

        OutputFormat {
            filename,
            extension,
            mime_type: mime,
        }
    }
}
