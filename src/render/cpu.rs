use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{
        decode::SourceImage,
        fonts::{FontLibrary, ResolvedFont},
        text::{TextBrushRgba8, TextLayoutEngine, first_baseline},
    },
    form::fields::RenderParams,
    foundation::{
        core::premul_over_in_place,
        error::{StampError, StampResult},
    },
    render::backend::{CompositeBackend, FrameRGBA},
};

/// CPU compositor powered by `vello_cpu` for glyph rasterization.
///
/// The source image is copied verbatim; text is rasterized on a transparent layer and blended
/// over it, so pixels the text does not touch are bit-identical to the input.
pub struct CpuCompositor {
    fonts: FontLibrary,
    text_engine: TextLayoutEngine,
    font_data: HashMap<(usize, u32), vello_cpu::peniko::FontData>,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuCompositor {
    /// Create a compositor resolving font families through `fonts`.
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            text_engine: TextLayoutEngine::new(),
            font_data: HashMap::new(),
            ctx: None,
        }
    }

    /// Borrow the font library, e.g. for diagnostics.
    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> StampResult<R>,
    ) -> StampResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn font_data_for(&mut self, font: &ResolvedFont) -> vello_cpu::peniko::FontData {
        let key = (Arc::as_ptr(&font.bytes) as usize, font.index);
        self.font_data
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                    font.index,
                )
            })
            .clone()
    }

    /// Rasterize `text` into a layer covering only its extent clipped to the image.
    ///
    /// Returns `None` when the text lies entirely outside the image.
    fn draw_text_layer(
        &mut self,
        width: u32,
        height: u32,
        text: &str,
        anchor: (i32, i32),
        params: &RenderParams,
    ) -> StampResult<Option<TextLayer>> {
        let [r, g, b, a] = params.fill_color().to_straight_rgba();
        let brush = TextBrushRgba8 { r, g, b, a };
        let size_px = params.effective_font_size();
        let font = self.fonts.resolve(&params.font_family)?;
        let layout = self.text_engine.layout_line(text, &font, size_px, brush)?;
        let font_data = self.font_data_for(&font);

        // Canvas text is anchored at the alphabetic baseline; the layout origin is its top edge.
        let top = f64::from(anchor.1) - f64::from(first_baseline(&layout));
        let left = f64::from(anchor.0);

        // Glyph ink may overhang the advance box by up to about one em.
        let pad = f64::from(size_px).ceil().max(1.0);
        let Some(region) = ClipRegion::new(
            (left - pad, top - pad),
            (
                left + f64::from(layout.full_width()) + pad,
                top + f64::from(layout.height()) + pad,
            ),
            (width, height),
        ) else {
            return Ok(None);
        };
        let w: u16 = region
            .width
            .try_into()
            .map_err(|_| StampError::render("text extent wider than 65535 px"))?;
        let h: u16 = region
            .height
            .try_into()
            .map_err(|_| StampError::render("text extent taller than 65535 px"))?;

        let origin = vello_cpu::kurbo::Affine::translate((
            left - f64::from(region.x),
            top - f64::from(region.y),
        ));

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |_, ctx| {
            ctx.set_transform(origin);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font_data)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;
        Ok(Some(TextLayer { region, pixmap }))
    }
}

/// Integer pixel rectangle inside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClipRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl ClipRegion {
    /// Pixel-aligned cover of `min..max`, clipped to `0..bounds`. `None` when nothing is left.
    fn new(min: (f64, f64), max: (f64, f64), bounds: (u32, u32)) -> Option<Self> {
        let clamp = |v: f64, hi: u32| -> u32 {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                v.min(f64::from(hi)) as u32
            }
        };
        let x0 = clamp(min.0.floor(), bounds.0);
        let y0 = clamp(min.1.floor(), bounds.1);
        let x1 = clamp(max.0.ceil(), bounds.0);
        let y1 = clamp(max.1.ceil(), bounds.1);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

struct TextLayer {
    region: ClipRegion,
    pixmap: vello_cpu::Pixmap,
}

impl TextLayer {
    fn blend_onto(&self, frame: &mut FrameRGBA) {
        let frame_stride = frame.width as usize * 4;
        let row_len = self.region.width as usize * 4;
        let src = self.pixmap.data_as_u8_slice();
        for row in 0..self.region.height as usize {
            let dst_start = (self.region.y as usize + row) * frame_stride + self.region.x as usize * 4;
            let (Some(dst), Some(src)) = (
                frame.data.get_mut(dst_start..dst_start + row_len),
                src.get(row * row_len..(row + 1) * row_len),
            ) else {
                break;
            };
            premul_over_in_place(dst, src);
        }
    }
}

impl CompositeBackend for CpuCompositor {
    /// Only the text's own extent is rasterized, so image size is unbounded; a single line
    /// whose extent exceeds 65535 px in either direction fails with [`StampError::Render`].
    #[tracing::instrument(skip(self, image), fields(width = image.width, height = image.height))]
    fn render_composite(
        &mut self,
        image: &SourceImage,
        text: &str,
        params: &RenderParams,
    ) -> StampResult<FrameRGBA> {
        let mut frame = FrameRGBA::from_image(image);
        if text.is_empty() {
            return Ok(frame);
        }
        let Some(anchor) = params.anchor() else {
            tracing::debug!("text anchor is not a number, text omitted");
            return Ok(frame);
        };
        if params.fill_color().a == 0 {
            return Ok(frame);
        }

        if let Some(layer) = self.draw_text_layer(image.width, image.height, text, anchor, params)? {
            layer.blend_onto(&mut frame);
        }
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
