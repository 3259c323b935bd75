use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    core::premultiply_rgba8_in_place,
    error::{StampError, StampResult},
};

#[derive(Clone, Debug)]
/// Decoded source bitmap in premultiplied RGBA8 form.
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StampResult<SourceImage> {
    if bytes.is_empty() {
        return Err(StampError::decode("image data is empty"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StampError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(StampError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(SourceImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Read and decode an image file.
#[tracing::instrument]
pub fn load_image(path: &Path) -> StampResult<SourceImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))?;
    let img = decode_image(&bytes)?;
    tracing::debug!(width = img.width, height = img.height, "decoded source image");
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
