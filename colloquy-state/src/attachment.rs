//! Inline image attachments

use crate::error::{StateError, StateResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use colloquy_core::Image;
use std::path::Path;
use tracing::{trace, warn};

/// MIME type used when the extension is not recognised
pub const FALLBACK_MIME: &str = "image/jpeg";

/// MIME type for an image path, judged by its extension
///
/// Returns `None` for extensions that are not a known image format.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read an image file and encode it for inline transport
pub async fn encode_image(path: &Path) -> StateResult<Image> {
    let mime = mime_for(path).unwrap_or_else(|| {
        warn!(
            path = %path.display(),
            "Unrecognised image extension, sending as {}", FALLBACK_MIME
        );
        FALLBACK_MIME
    });

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| StateError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;
    trace!(path = %path.display(), bytes = bytes.len(), "Encoding image");

    Ok(Image::new(mime, STANDARD.encode(bytes)))
}

/// Decode the payload of an inline image
pub fn decode_image(image: &Image) -> StateResult<Vec<u8>> {
    STANDARD
        .decode(image.data.as_bytes())
        .map_err(|e| StateError::invalid_data(format!("image is not valid base64: {}", e)))
}
