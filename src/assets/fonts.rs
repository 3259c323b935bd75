use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{StampError, StampResult};

/// Font bytes resolved for a CSS font-family list.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Raw font file bytes (may be a collection).
    pub bytes: Arc<Vec<u8>>,
    /// Face index within `bytes`.
    pub index: u32,
    /// Family name of the chosen face.
    pub family: String,
    /// Whether the requested family list was matched, as opposed to a generic fallback.
    pub exact: bool,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("family", &self.family)
            .field("exact", &self.exact)
            .finish()
    }
}

/// Options controlling which fonts a [`FontLibrary`] loads.
#[derive(Clone, Debug)]
pub struct FontLibraryOpts {
    /// Load fonts installed on the system.
    pub load_system_fonts: bool,
    /// Extra directories scanned (non-recursively) for `.ttf`, `.otf` and `.ttc` files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontLibraryOpts {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Resolves CSS font-family names to font bytes using a `fontdb` database.
pub struct FontLibrary {
    db: usvg::fontdb::Database,
    cache: HashMap<usvg::fontdb::ID, Arc<Vec<u8>>>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new(&FontLibraryOpts::default())
    }
}

impl FontLibrary {
    /// Build a library from system fonts and/or extra font directories.
    pub fn new(opts: &FontLibraryOpts) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if opts.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &opts.font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font library loaded");
        Self {
            db,
            cache: HashMap::new(),
        }
    }

    /// A library with no faces at all.
    pub fn empty() -> Self {
        Self::new(&FontLibraryOpts {
            load_system_fonts: false,
            font_dirs: Vec::new(),
        })
    }

    /// Add a single font from memory.
    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Resolve a CSS font-family list such as `"Noto Sans", Arial, sans-serif`.
    ///
    /// Names are tried in order, then sans-serif, serif, monospace, then the first face.
    pub fn resolve(&mut self, font_family: &str) -> StampResult<ResolvedFont> {
        let requested = parse_family_list(font_family);
        let mut families: Vec<usvg::fontdb::Family<'_>> =
            requested.iter().map(|f| family_for(f)).collect();
        let n_requested = families.len();
        families.push(usvg::fontdb::Family::SansSerif);
        families.push(usvg::fontdb::Family::Serif);
        families.push(usvg::fontdb::Family::Monospace);

        let mut picked = None;
        for (i, family) in families.iter().enumerate() {
            let query = usvg::fontdb::Query {
                families: std::slice::from_ref(family),
                ..Default::default()
            };
            if let Some(id) = self.db.query(&query) {
                picked = Some((id, i < n_requested));
                break;
            }
        }
        let (id, exact) = match picked {
            Some(p) => p,
            None => {
                let first = self.db.faces().next().ok_or_else(|| {
                    StampError::validation("no fonts available to draw text")
                })?;
                (first.id, false)
            }
        };

        if !exact {
            tracing::warn!(requested = font_family, "font family not found, using fallback");
        }

        let face = self
            .db
            .face(id)
            .ok_or_else(|| StampError::render("resolved font face disappeared"))?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let index = face.index;

        let bytes = match self.cache.get(&id) {
            Some(b) => b.clone(),
            None => {
                let data = self
                    .db
                    .with_face_data(id, |data, _| data.to_vec())
                    .ok_or_else(|| StampError::render(format!("load font data for '{family}'")))?;
                let data = Arc::new(data);
                self.cache.insert(id, data.clone());
                data
            }
        };

        Ok(ResolvedFont {
            bytes,
            index,
            family,
            exact,
        })
    }
}

/// Split a CSS font-family list into unquoted names.
pub(crate) fn parse_family_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn family_for(name: &str) -> usvg::fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => usvg::fontdb::Family::Serif,
        "sans-serif" => usvg::fontdb::Family::SansSerif,
        "cursive" => usvg::fontdb::Family::Cursive,
        "fantasy" => usvg::fontdb::Family::Fantasy,
        "monospace" => usvg::fontdb::Family::Monospace,
        _ => usvg::fontdb::Family::Name(name),
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
