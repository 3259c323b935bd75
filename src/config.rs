use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    assets::fonts::FontLibraryOpts,
    export::pacing::PacingPolicy,
    form::fields::FormFields,
    foundation::error::{StampError, StampResult},
};

/// JSON preset for the command-line tool. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Default form values.
    pub form: PartialFields,
    /// Delay between exported images, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Extra font directories.
    pub font_dirs: Vec<PathBuf>,
    /// Whether system fonts are loaded. Defaults to `true`.
    pub load_system_fonts: Option<bool>,
}

/// Form fields that may or may not be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialFields {
    /// Text anchor x.
    pub x: Option<String>,
    /// Text anchor y.
    pub y: Option<String>,
    /// Font size in pixels.
    pub font_size: Option<String>,
    /// CSS color.
    pub color: Option<String>,
    /// CSS font-family list.
    pub font_family: Option<String>,
}

impl PartialFields {
    /// Values from `self` win over `base`.
    pub fn overlay_onto(&self, base: FormFields) -> FormFields {
        FormFields {
            x: self.x.clone().unwrap_or(base.x),
            y: self.y.clone().unwrap_or(base.y),
            font_size: self.font_size.clone().unwrap_or(base.font_size),
            color: self.color.clone().unwrap_or(base.color),
            font_family: self.font_family.clone().unwrap_or(base.font_family),
        }
    }
}

impl ToolConfig {
    /// Read a JSON preset.
    pub fn load(path: &Path) -> StampResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let r = BufReader::new(f);
        serde_json::from_reader(r).map_err(|e| {
            StampError::validation(format!("invalid config '{}': {e}", path.display()))
        })
    }

    /// Resolve form fields: `flags` over this config over built-in defaults.
    pub fn resolve_fields(&self, flags: &PartialFields) -> FormFields {
        flags.overlay_onto(self.form.overlay_onto(FormFields::default()))
    }

    /// Pacing policy, with `delay_ms_flag` taking precedence.
    pub fn pacing(&self, delay_ms_flag: Option<u64>) -> PacingPolicy {
        match delay_ms_flag.or(self.delay_ms) {
            Some(ms) => PacingPolicy::new(Duration::from_millis(ms)),
            None => PacingPolicy::default(),
        }
    }

    /// Font loading options. Config directories come before `extra_dirs`.
    pub fn font_opts(&self, extra_dirs: &[PathBuf]) -> FontLibraryOpts {
        let mut font_dirs = self.font_dirs.clone();
        font_dirs.extend(extra_dirs.iter().cloned());
        FontLibraryOpts {
            load_system_fonts: self.load_system_fonts.unwrap_or(true),
            font_dirs,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
