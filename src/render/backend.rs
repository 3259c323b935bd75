use crate::{
    assets::decode::SourceImage,
    form::fields::RenderParams,
    foundation::error::StampResult,
};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; [`crate::encode_png`] converts back to straight alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Copy of a source image; the starting point of every composite.
    pub fn from_image(image: &SourceImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            data: image.rgba8_premul.as_ref().clone(),
        }
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Produces composites: the source image with one line of text drawn over it.
///
/// Implementations must not perform IO and must return a frame the same size as `image`.
pub trait CompositeBackend {
    /// Draw `image` at the origin, then `text` at the position, size, color and font in
    /// `params`. Empty text yields the image unchanged.
    fn render_composite(
        &mut self,
        image: &SourceImage,
        text: &str,
        params: &RenderParams,
    ) -> StampResult<FrameRGBA>;
}

impl<B: CompositeBackend + ?Sized> CompositeBackend for &mut B {
    fn render_composite(
        &mut self,
        image: &SourceImage,
        text: &str,
        params: &RenderParams,
    ) -> StampResult<FrameRGBA> {
        (**self).render_composite(image, text, params)
    }
}

impl<B: CompositeBackend + ?Sized> CompositeBackend for Box<B> {
    fn render_composite(
        &mut self,
        image: &SourceImage,
        text: &str,
        params: &RenderParams,
    ) -> StampResult<FrameRGBA> {
        (**self).render_composite(image, text, params)
    }
}
