use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::fonts::ResolvedFont,
    foundation::error::{StampError, StampResult},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Stateful helper for building single-line Parley layouts from resolved fonts.
///
/// Font bytes are registered with Parley once per distinct face and reused afterwards, so one
/// engine can lay out every line of a batch export.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<(usize, u32), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn family_name_for(&mut self, font: &ResolvedFont) -> StampResult<String> {
        let key = (Arc::as_ptr(&font.bytes) as usize, font.index);
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let mut names = Vec::with_capacity(families.len());
        for (id, _) in &families {
            if let Some(name) = self.font_ctx.collection.family_name(*id) {
                names.push(name.to_string());
            }
        }
        let name = names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(&font.family))
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| StampError::render("no font families registered from font bytes"))?;

        self.registered.insert(key, name.clone());
        Ok(name)
    }

    /// Shape one line of plain text. Line breaking is disabled; the canvas draws a single run.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StampResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StampError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_name_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Distance from the top of `layout` to the alphabetic baseline of its first line.
pub(crate) fn first_baseline(layout: &parley::Layout<TextBrushRgba8>) -> f32 {
    layout
        .lines()
        .next()
        .map(|line| line.metrics().baseline)
        .unwrap_or(0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
