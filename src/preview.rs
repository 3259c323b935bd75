use std::path::Path;

use crate::{
    assets::decode::load_image,
    form::fields::StampForm,
    foundation::error::StampResult,
    render::{
        backend::{CompositeBackend, FrameRGBA},
        png::write_png,
    },
};

/// Persistent preview surface. Each successful preview replaces its contents and resizes it to
/// the source image.
#[derive(Debug, Default)]
pub struct Previewer {
    surface: Option<FrameRGBA>,
}

impl Previewer {
    /// Create a previewer with an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current surface contents, if anything has been previewed yet.
    pub fn surface(&self) -> Option<&FrameRGBA> {
        self.surface.as_ref()
    }

    /// Render the first text line (or nothing if there are no lines) onto the surface.
    ///
    /// On any error the previous surface is left as it was.
    #[tracing::instrument(skip_all)]
    pub fn preview(
        &mut self,
        form: &StampForm,
        backend: &mut dyn CompositeBackend,
    ) -> StampResult<&FrameRGBA> {
        let form = form.validate()?;
        let image = load_image(&form.image)?;
        let frame = backend.render_composite(&image, form.lines.first_or_empty(), &form.params)?;
        tracing::debug!(
            width = frame.width,
            height = frame.height,
            lines = form.lines.len(),
            "preview rendered"
        );
        Ok(self.surface.insert(frame))
    }

    /// Write the current surface as PNG. Returns `false` if nothing has been previewed.
    pub fn save(&self, path: &Path) -> StampResult<bool> {
        match &self.surface {
            Some(frame) => {
                write_png(frame, path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
