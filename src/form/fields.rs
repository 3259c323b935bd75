use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    assets::color::parse_css_color,
    form::lines::TextLines,
    foundation::{
        core::Rgba8Premul,
        error::{StampError, StampResult},
    },
};

/// Canvas default font size when the requested size is unusable.
pub const FALLBACK_FONT_SIZE_PX: f32 = 10.0;

/// Raw form values, exactly as typed. Nothing here is validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    /// Text anchor x.
    pub x: String,
    /// Text anchor y (alphabetic baseline).
    pub y: String,
    /// Font size in pixels.
    pub font_size: String,
    /// CSS color.
    pub color: String,
    /// CSS font-family list.
    pub font_family: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            x: "0".to_string(),
            y: "0".to_string(),
            font_size: "16".to_string(),
            color: "#000000".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }
}

/// Parameters for one text draw, read fresh for every render.
///
/// Numeric fields are `None` when the form value was not a number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderParams {
    /// Anchor x in pixels.
    pub x: Option<i32>,
    /// Anchor y (alphabetic baseline) in pixels.
    pub y: Option<i32>,
    /// Font size in pixels.
    pub font_size_px: Option<i32>,
    /// CSS color string.
    pub color: String,
    /// CSS font-family list.
    pub font_family: String,
}

impl RenderParams {
    /// Text anchor, or `None` if either coordinate is not a number. Such text is not drawn.
    pub fn anchor(&self) -> Option<(i32, i32)> {
        Some((self.x?, self.y?))
    }

    /// Font size to draw with; non-numbers and non-positive sizes fall back to 10 px.
    pub fn effective_font_size(&self) -> f32 {
        match self.font_size_px {
            Some(px) if px > 0 => px as f32,
            _ => FALLBACK_FONT_SIZE_PX,
        }
    }

    /// Fill color; unparsable colors fall back to opaque black.
    pub fn fill_color(&self) -> Rgba8Premul {
        parse_css_color(&self.color).unwrap_or_else(Rgba8Premul::black)
    }
}

impl FormFields {
    /// Coerce the form the way a browser form handler does: never fails, malformed numbers
    /// become `None`.
    pub fn coerce(&self) -> RenderParams {
        RenderParams {
            x: parse_int_prefix(&self.x),
            y: parse_int_prefix(&self.y),
            font_size_px: parse_int_prefix(&self.font_size),
            color: self.color.clone(),
            font_family: self.font_family.clone(),
        }
    }

    /// Strict parse. Reports the first invalid field by name.
    pub fn validate(&self) -> StampResult<RenderParams> {
        let x = parse_strict_int(&self.x).ok_or_else(|| StampError::invalid_field("x", &self.x))?;
        let y = parse_strict_int(&self.y).ok_or_else(|| StampError::invalid_field("y", &self.y))?;
        let font_size_px = parse_strict_int(&self.font_size)
            .filter(|v| *v > 0)
            .ok_or_else(|| StampError::invalid_field("font_size", &self.font_size))?;
        if parse_css_color(&self.color).is_none() {
            return Err(StampError::invalid_field("color", &self.color));
        }
        if self.font_family.trim().is_empty() {
            return Err(StampError::invalid_field("font_family", &self.font_family));
        }

        Ok(RenderParams {
            x: Some(x),
            y: Some(y),
            font_size_px: Some(font_size_px),
            color: self.color.trim().to_string(),
            font_family: self.font_family.trim().to_string(),
        })
    }
}

/// One user action's worth of input: image, text block and form fields.
#[derive(Clone, Debug, Default)]
pub struct StampForm {
    /// Selected image file, if any.
    pub image: Option<PathBuf>,
    /// Multi-line text block.
    pub text: String,
    /// Render fields.
    pub fields: FormFields,
}

/// A form that passed validation.
#[derive(Clone, Debug)]
pub struct ValidatedForm {
    /// Image file to decode.
    pub image: PathBuf,
    /// Lines to render.
    pub lines: TextLines,
    /// Render parameters shared by every line.
    pub params: RenderParams,
}

impl StampForm {
    /// Check that an image is selected and every field is valid.
    pub fn validate(&self) -> StampResult<ValidatedForm> {
        let image = match &self.image {
            Some(p) if !p.as_os_str().is_empty() => p.clone(),
            _ => return Err(StampError::validation("no image file selected")),
        };
        let params = self.fields.validate()?;
        Ok(ValidatedForm {
            image,
            lines: TextLines::parse(&self.text),
            params,
        })
    }
}

/// `parseInt(s, 10)`: skip leading whitespace, optional sign, then as many ASCII digits as
/// follow. No digits means not-a-number. Out-of-range values saturate.
pub fn parse_int_prefix(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (neg, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let mut v: i64 = 0;
    for b in rest.as_bytes()[..digits].iter() {
        v = (v * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    let v = if neg { -v } else { v };
    Some(v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

fn parse_strict_int(s: &str) -> Option<i32> {
    s.trim().parse::<i32>().ok()
}

#[cfg(test)]
#[path = "../../tests/unit/form/fields.rs"]
mod tests;
