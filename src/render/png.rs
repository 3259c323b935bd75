use std::{io::Cursor, path::Path};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::unpremul_px,
        error::{StampError, StampResult},
    },
    render::backend::FrameRGBA,
};

/// Encode a premultiplied frame as a straight-alpha PNG.
pub fn encode_png(frame: &FrameRGBA) -> StampResult<Vec<u8>> {
    let mut straight = Vec::with_capacity(frame.data.len());
    for px in frame.data.chunks_exact(4) {
        straight.extend_from_slice(&unpremul_px([px[0], px[1], px[2], px[3]]));
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| StampError::render("frame byte len does not match its dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| StampError::render(format!("encode png: {e}")))?;
    Ok(buf)
}

/// Encode `frame` and write it to `path`, creating parent directories.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> StampResult<()> {
    let bytes = encode_png(frame)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/png.rs"]
mod tests;
