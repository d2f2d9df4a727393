use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use std::fs;
use std::path::Path;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// An image payload with any `data:image/...;base64,` prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage<'a> {
    pub mime_type: &'static str,
    pub data: &'a str,
}

/// Strips the data-URI prefix for the formats the model accepts
/// (png, jpeg, jpg, webp). Anything else is passed through untouched.
pub fn strip_data_uri(image: &str) -> InlineImage<'_> {
    let untouched = InlineImage {
        mime_type: DEFAULT_MIME_TYPE,
        data: image,
    };

    let Some(rest) = image.strip_prefix("data:image/") else {
        return untouched;
    };
    let Some((kind, data)) = rest.split_once(";base64,") else {
        return untouched;
    };

    let mime_type = match kind {
        "png" => "image/png",
        "jpeg" | "jpg" => "image/jpeg",
        "webp" => "image/webp",
        _ => return untouched,
    };

    InlineImage { mime_type, data }
}

/// Reads an image file and returns it as a base64 data URI.
pub fn load_data_uri(path: &Path) -> Result<String> {
    let image_data = fs::read(path)?;
    let encoded = general_purpose::STANDARD.encode(&image_data);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => DEFAULT_MIME_TYPE,
    };

    log::debug!("📊 Image file size: {} bytes", image_data.len());
    log::debug!("🔄 Base64 encoded size: {} bytes", encoded.len());

    Ok(format!("data:{};base64,{}", mime_type, encoded))
}
