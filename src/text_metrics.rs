use crate::config::{LayoutConfig, TextMeasurement};
use crate::theme::Theme;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Box occupied by a rendered label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMetrics {
    pub width: f64,
    /// Height of the glyph line itself.
    pub glyph_height: f64,
    /// Extra space above the glyphs for overhead-arrow notation.
    pub arrow_gap: f64,
}

impl LabelMetrics {
    pub fn height(&self) -> f64 {
        self.glyph_height + self.arrow_gap
    }
}

pub fn label_metrics(text: &str, is_vector: bool, theme: &Theme, config: &LayoutConfig) -> LabelMetrics {
    let approx = approximate_text_width(text, theme.font_size, config.glyph_width_factor);
    let width = match config.text_measurement {
        TextMeasurement::Approximate => approx,
        TextMeasurement::Font => {
            measure_text_width(text, theme.font_size, &theme.font_family).unwrap_or(approx)
        }
    };
    LabelMetrics {
        width,
        glyph_height: theme.font_size * config.label_line_height,
        arrow_gap: if is_vector {
            theme.font_size * config.overhead_arrow_gap
        } else {
            0.0
        },
    }
}

/// Character count times average glyph width. Errs wide on purpose.
pub fn approximate_text_width(text: &str, font_size: f64, glyph_width_factor: f64) -> f64 {
    text.chars().filter(|c| *c != '\n').count() as f64 * glyph_width_factor * font_size
}

pub fn measure_text_width(text: &str, font_size: f64, font_family: &str) -> Option<f64> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f64, font_family: &str) -> Option<f64> {
        let key = normalize_family_key(font_family);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family);
            self.cache.insert(key.clone(), face);
        }
        self.cache.get(&key)?.as_ref()?.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" => Family::SansSerif,
                "monospace" => Family::Monospace,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let units_per_em = Face::parse(&data, index).ok()?.units_per_em().max(1);
        Some(Self {
            data,
            index,
            units_per_em,
        })
    }

    fn measure_width(&self, text: &str, font_size: f64) -> Option<f64> {
        let face = Face::parse(&self.data, self.index).ok()?;
        let scale = font_size / f64::from(self.units_per_em);
        let fallback = font_size * 0.56;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| f64::from(advance) * scale)
                    .unwrap_or(fallback)
            })
            .sum::<f64>();
        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
