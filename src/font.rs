use crate::error::GridShotError;
use rustybuzz::{Direction as HbDirection, Face as HbFace, UnicodeBuffer};
use std::collections::HashMap;
use std::sync::Arc;

// A font is a pixel size plus an optional embedded TTF/OTF program. Without a
// program the font still measures (heuristic advance) but paints no glyphs.
#[derive(Debug, Clone)]
pub struct Font {
    name: String,
    size: i32,
    data: Option<Arc<Vec<u8>>>,
}

impl Font {
    pub fn from_bytes(
        name: impl Into<String>,
        size: i32,
        data: Vec<u8>,
    ) -> Result<Font, GridShotError> {
        let name = name.into();
        if ttf_parser::Face::parse(&data, 0).is_err() {
            return Err(GridShotError::Configuration(format!(
                "invalid font data for {name}"
            )));
        }
        Ok(Font {
            name,
            size,
            data: Some(Arc::new(data)),
        })
    }

    pub fn fallback(name: impl Into<String>, size: i32) -> Font {
        Font {
            name: name.into(),
            size,
            data: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn with_size(&self, size: i32) -> Font {
        Font {
            name: self.name.clone(),
            size,
            data: self.data.clone(),
        }
    }

    pub(crate) fn data(&self) -> Option<&[u8]> {
        self.data.as_deref().map(|v| v.as_slice())
    }

    // Measurement surface for one render. The parsed face and per-line widths
    // are cached for the lifetime of the measurer, never across renders.
    pub(crate) fn measurer(&self) -> FontMeasure<'_> {
        let face = self
            .data
            .as_deref()
            .and_then(|data| HbFace::from_slice(data, 0));
        FontMeasure {
            face,
            size: self.size,
            cache: HashMap::new(),
        }
    }
}

pub(crate) struct FontMeasure<'a> {
    face: Option<HbFace<'a>>,
    size: i32,
    cache: HashMap<String, i32>,
}

impl FontMeasure<'_> {
    pub(crate) fn line_width(&mut self, text: &str) -> i32 {
        if text.is_empty() {
            return 0;
        }
        if let Some(width) = self.cache.get(text) {
            return *width;
        }
        let width = match &self.face {
            Some(face) => shaped_line_width(face, self.size, text),
            None => fallback_line_width(self.size, text),
        };
        self.cache.insert(text.to_string(), width);
        width
    }

    // Widest line of a multi-line content string.
    pub(crate) fn content_width(&mut self, content: &str) -> i32 {
        content
            .split('\n')
            .map(|line| self.line_width(line))
            .max()
            .unwrap_or(0)
    }
}

pub(crate) fn shaped_line_width(face: &HbFace<'_>, size: i32, text: &str) -> i32 {
    let units_per_em = face.units_per_em().max(1) as i64;
    let mut buffer = UnicodeBuffer::new();
    buffer.set_direction(detect_direction(text));
    buffer.push_str(text);
    let output = rustybuzz::shape(face, &[], buffer);
    let mut total_units: i64 = 0;
    for pos in output.glyph_positions() {
        total_units = total_units.saturating_add(pos.x_advance as i64);
    }
    if total_units <= 0 {
        return 0;
    }
    ((total_units * size as i64 + units_per_em / 2) / units_per_em) as i32
}

pub(crate) fn fallback_line_width(size: i32, text: &str) -> i32 {
    let count = text.chars().count() as f32;
    (count * (size as f32) * 0.6).round() as i32
}

pub(crate) fn detect_direction(text: &str) -> HbDirection {
    for ch in text.chars() {
        let code = ch as u32;
        let rtl = matches!(
            code,
            0x0590..=0x08FF
                | 0xFB1D..=0xFDFF
                | 0xFE70..=0xFEFF
                | 0x1EE00..=0x1EEFF
        );
        if rtl {
            return HbDirection::RightToLeft;
        }
    }
    HbDirection::LeftToRight
}
