use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use thiserror::Error;
use ttf_parser::Face;

/// Upper bound on cached `(text, size)` width entries; the oldest
/// entry is evicted once the cap is reached.
pub const MEASUREMENT_CACHE_CAP: usize = 1000;

static FONT_DB: Lazy<Mutex<SharedFontDb>> = Lazy::new(|| Mutex::new(SharedFontDb::new()));

#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("text measurement failed for {0:?}")]
    Failed(String),
}

/// The drawing-surface capability the label engine consumes: width of
/// a rendered string. A measurer is bound to one font family, the way
/// a canvas context holds one `font` string per frame.
pub trait MeasureText {
    fn measure_text(&mut self, text: &str, font_size: f32) -> Result<f32, MeasureError>;
}

struct SharedFontDb {
    db: Database,
    loaded_system_fonts: bool,
}

impl SharedFontDb {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
        }
    }

    fn face_bytes(&mut self, font_family: &str) -> Option<(Vec<u8>, u32)> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Option<Family<'static>>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Some(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" => {
                    generics.push(Some(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => generics.push(Some(Family::Monospace)),
                "cursive" => generics.push(Some(Family::Cursive)),
                "fantasy" => generics.push(Some(Family::Fantasy)),
                _ => {
                    names.push(raw.to_string());
                    generics.push(None);
                }
            }
        }

        let mut name_iter = names.iter();
        let mut families: Vec<Family<'_>> = Vec::with_capacity(generics.len().max(1));
        for generic in &generics {
            match generic {
                Some(family) => families.push(*family),
                None => {
                    if let Some(name) = name_iter.next() {
                        families.push(Family::Name(name.as_str()));
                    }
                }
            }
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut bytes: Option<(Vec<u8>, u32)> = None;
        self.db.with_face_data(id, |data, index| {
            bytes = Some((data.to_vec(), index));
        });
        bytes
    }
}

struct LoadedFace {
    _data: Vec<u8>,
    face: Face<'static>,
    units_per_em: f32,
    advance_cache: HashMap<char, Option<f32>>,
}

impl LoadedFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        // Face borrows from `data`; both move together, so the 'static
        // lifetime never outlives the backing buffer.
        let face = Face::parse(&data, index)
            .ok()
            .map(|parsed| unsafe { std::mem::transmute::<Face<'_>, Face<'static>>(parsed) })?;
        let units_per_em = face.units_per_em().max(1) as f32;
        Some(Self {
            _data: data,
            face,
            units_per_em,
            advance_cache: HashMap::new(),
        })
    }

    fn width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = match self.advance_cache.get(&ch) {
                Some(cached) => *cached,
                None => {
                    let advance = self
                        .face
                        .glyph_index(ch)
                        .and_then(|id| self.face.glyph_hor_advance(id))
                        .map(|units| units as f32);
                    self.advance_cache.insert(ch, advance);
                    advance
                }
            };
            width += advance.map(|units| units * scale).unwrap_or(fallback);
        }
        width.max(0.0)
    }
}

/// Rough per-character width factors for environments with no usable
/// system fonts. Coarser than a real face but stable and monotone in
/// string length, which is all the wrapper and rect builder need.
pub fn approx_char_factor(ch: char) -> f32 {
    match ch {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 0.31,
        'i' | 'j' | 'l' | 'I' | '1' => 0.26,
        'f' | 'r' | 't' | '(' | ')' | '[' | ']' => 0.35,
        'm' | 'M' | 'w' | 'W' | '@' => 0.9,
        'A'..='Z' | '0'..='9' => 0.66,
        _ => 0.55,
    }
}

fn approx_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(approx_char_factor).sum::<f32>() * font_size
}

type CacheKey = (String, u32);

/// Font-backed measurer with a bounded FIFO width cache. Falls back to
/// the approximate character table when no system face resolves.
pub struct FontMeasurer {
    font_family: String,
    face: Option<LoadedFace>,
    face_lookup_done: bool,
    cache: HashMap<CacheKey, f32>,
    cache_order: VecDeque<CacheKey>,
}

impl FontMeasurer {
    pub fn new(font_family: &str) -> Self {
        Self {
            font_family: font_family.to_string(),
            face: None,
            face_lookup_done: false,
            cache: HashMap::new(),
            cache_order: VecDeque::new(),
        }
    }

    fn ensure_face(&mut self) {
        if self.face_lookup_done {
            return;
        }
        self.face_lookup_done = true;
        let bytes = FONT_DB
            .lock()
            .ok()
            .and_then(|mut db| db.face_bytes(&self.font_family));
        if let Some((data, index)) = bytes {
            self.face = LoadedFace::parse(data, index);
        }
    }

    fn cache_insert(&mut self, key: CacheKey, width: f32) {
        if self.cache.len() >= MEASUREMENT_CACHE_CAP
            && let Some(oldest) = self.cache_order.pop_front()
        {
            self.cache.remove(&oldest);
        }
        self.cache_order.push_back(key.clone());
        self.cache.insert(key, width);
    }
}

impl MeasureText for FontMeasurer {
    fn measure_text(&mut self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        if text.is_empty() || font_size <= 0.0 {
            return Ok(0.0);
        }
        let key = (text.to_string(), font_size.to_bits());
        if let Some(width) = self.cache.get(&key) {
            return Ok(*width);
        }
        self.ensure_face();
        let width = match self.face.as_mut() {
            Some(face) => face.width(text, font_size),
            None => approx_text_width(text, font_size),
        };
        self.cache_insert(key, width);
        Ok(width)
    }
}

/// Deterministic measurer over the approximate character table. Used
/// in tests and as the no-font worker fallback.
#[derive(Debug, Default, Clone)]
pub struct CharTableMeasurer;

impl MeasureText for CharTableMeasurer {
    fn measure_text(&mut self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        if font_size <= 0.0 {
            return Ok(0.0);
        }
        Ok(approx_text_width(text, font_size))
    }
}
