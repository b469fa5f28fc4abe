use crate::cell::Cell;
use crate::error::GridShotError;
use crate::font::{self, Font};
use crate::style::TableStyle;
use crate::types::Color;
use log::info;
use rustybuzz::{Face as HbFace, UnicodeBuffer};
use std::collections::BTreeMap;
use tiny_skia::{
    FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};
use ttf_parser::{GlyphId, OutlineBuilder};

pub(crate) const PLACEHOLDER_WIDTH: u32 = 400;
pub(crate) const PLACEHOLDER_HEIGHT: u32 = 200;

// The single paint routine; the two renderer variants differ only in this
// capability set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PaintMode {
    pub(crate) per_cell_color: bool,
    pub(crate) header_rows: u32,
}

pub(crate) fn paint(
    cells: &[Cell],
    style: &TableStyle,
    table_height: i32,
    mode: PaintMode,
) -> Result<Pixmap, GridShotError> {
    if cells.is_empty() {
        return placeholder();
    }

    let table_width = cells.iter().map(|cell| cell.x + cell.width).max().unwrap_or(0);
    let width = table_width + style.margin_x * 2;
    let height = table_height + style.margin_y * 2;
    let mut pixmap = new_canvas(width, height)?;

    let mut rows: BTreeMap<u32, Vec<&Cell>> = BTreeMap::new();
    for cell in cells {
        rows.entry(cell.row).or_default().push(cell);
    }

    let header_pen = GlyphPen::new(&style.header_font);
    let body_pen = GlyphPen::new(&style.body_font);
    let border = if mode.per_cell_color {
        Color::BLACK
    } else {
        Color::RED
    };

    for (row, row_cells) in &rows {
        let is_header = mode.header_rows > 0 && *row <= mode.header_rows;
        for cell in row_cells {
            if mode.per_cell_color {
                fill_cell(&mut pixmap, cell, cell.background.unwrap_or(Color::WHITE));
            } else if is_header {
                fill_cell(&mut pixmap, cell, style.header_background);
            }
            stroke_cell(&mut pixmap, cell, border);
            let (pen, font_size) = if is_header {
                (&header_pen, style.header_font.size())
            } else {
                (&body_pen, style.body_font.size())
            };
            draw_cell_text(&mut pixmap, pen, cell, font_size);
        }
    }

    Ok(pixmap)
}

pub(crate) fn placeholder() -> Result<Pixmap, GridShotError> {
    let mut pixmap = Pixmap::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)
        .ok_or_else(|| GridShotError::Canvas("placeholder allocation failed".to_string()))?;
    pixmap.fill(Color::WHITE.to_skia());
    Ok(pixmap)
}

// Uniform rescale against the 72-dpi baseline; scaled dimensions truncate.
pub(crate) fn rescale(pixmap: Pixmap, dpi: i32) -> Result<Pixmap, GridShotError> {
    if dpi <= 0 || dpi == 72 {
        info!("dpi {dpi} is the 72-dpi baseline; canvas returned unscaled");
        return Ok(pixmap);
    }
    let width = (pixmap.width() as i64 * dpi as i64 / 72) as i32;
    let height = (pixmap.height() as i64 * dpi as i64 / 72) as i32;
    let mut scaled = new_canvas(width, height)?;
    let mut paint = PixmapPaint::default();
    paint.quality = FilterQuality::Bicubic;
    let factor = dpi as f32 / 72.0;
    scaled.draw_pixmap(
        0,
        0,
        pixmap.as_ref(),
        &paint,
        Transform::from_scale(factor, factor),
        None,
    );
    Ok(scaled)
}

fn new_canvas(width: i32, height: i32) -> Result<Pixmap, GridShotError> {
    if width <= 0 || height <= 0 {
        return Err(GridShotError::Canvas(format!(
            "invalid canvas size {width}x{height}"
        )));
    }
    let mut pixmap = Pixmap::new(width as u32, height as u32)
        .ok_or_else(|| GridShotError::Canvas(format!("invalid canvas size {width}x{height}")))?;
    pixmap.fill(Color::WHITE.to_skia());
    Ok(pixmap)
}

fn fill_cell(pixmap: &mut Pixmap, cell: &Cell, color: Color) {
    let Some(rect) = Rect::from_xywh(
        cell.x as f32,
        cell.y as f32,
        cell.width as f32,
        cell.height as f32,
    ) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    pixmap.fill_path(
        &path,
        &flat_paint(color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
}

// 1-px border at half-pixel offsets so the stroke lands on whole pixels.
fn stroke_cell(pixmap: &mut Pixmap, cell: &Cell, color: Color) {
    let Some(rect) = Rect::from_xywh(
        cell.x as f32 + 0.5,
        cell.y as f32 + 0.5,
        cell.width as f32,
        cell.height as f32,
    ) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &flat_paint(color), &stroke, Transform::identity(), None);
}

fn flat_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = false;
    paint
}

fn glyph_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn draw_cell_text(pixmap: &mut Pixmap, pen: &GlyphPen<'_>, cell: &Cell, font_size: i32) {
    let content = if cell.content.trim().is_empty() {
        "-"
    } else {
        cell.content.as_str()
    };
    let lines: Vec<&str> = content.split('\n').collect();
    let count = lines.len() as i32;
    // first line's offset centers the whole block inside the cell
    let block_offset = (cell.height - font_size * count) / 2;
    let color = cell.text_color.unwrap_or(Color::BLACK);
    for (i, line) in lines.iter().enumerate() {
        let mut x = cell.x + 1;
        if cell.center {
            x += (cell.width - pen.line_width(line)) / 2;
        }
        let baseline = cell.y + font_size + block_offset + (font_size + 1) * i as i32;
        pen.draw_line(pixmap, line, x, baseline, color);
    }
}

struct GlyphPlacement {
    glyph_id: u16,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

// Per-font glyph source for one paint pass. Fonts without an embedded
// program measure via the heuristic and paint no glyphs.
struct GlyphPen<'a> {
    face: Option<ttf_parser::Face<'a>>,
    hb: Option<HbFace<'a>>,
    size: i32,
}

impl<'a> GlyphPen<'a> {
    fn new(font: &'a Font) -> GlyphPen<'a> {
        let data = font.data();
        GlyphPen {
            face: data.and_then(|bytes| ttf_parser::Face::parse(bytes, 0).ok()),
            hb: data.and_then(|bytes| HbFace::from_slice(bytes, 0)),
            size: font.size(),
        }
    }

    fn line_width(&self, text: &str) -> i32 {
        match &self.hb {
            Some(face) => font::shaped_line_width(face, self.size, text),
            None => font::fallback_line_width(self.size, text),
        }
    }

    fn draw_line(&self, pixmap: &mut Pixmap, text: &str, x: i32, baseline_y: i32, color: Color) {
        if text.is_empty() {
            return;
        }
        let Some(face) = &self.face else {
            return;
        };
        let placements = match &self.hb {
            Some(hb) => shaped_placements(hb, self.size, text, x as f32, baseline_y as f32),
            None => unshaped_placements(face, self.size, text, x as f32, baseline_y as f32),
        };
        let paint = glyph_paint(color);
        for placement in placements {
            let mut builder = GlyphPathBuilder::new(
                placement.origin_x,
                placement.origin_y,
                placement.scale,
            );
            if face
                .outline_glyph(GlyphId(placement.glyph_id), &mut builder)
                .is_none()
            {
                continue;
            }
            let Some(path) = builder.finish() else {
                continue;
            };
            pixmap.fill_path(
                &path,
                &paint,
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}

fn shaped_placements(
    face: &HbFace<'_>,
    font_size: i32,
    text: &str,
    baseline_x: f32,
    baseline_y: f32,
) -> Vec<GlyphPlacement> {
    let units_per_em = face.units_per_em().max(1) as f32;
    let size = font_size as f32;
    let scale = size / units_per_em;
    let mut buffer = UnicodeBuffer::new();
    buffer.set_direction(font::detect_direction(text));
    buffer.push_str(text);
    let output = rustybuzz::shape(face, &[], buffer);
    let infos = output.glyph_infos();
    let positions = output.glyph_positions();
    if infos.is_empty() || infos.len() != positions.len() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(infos.len());
    let mut pen_x = 0.0f32;
    for (info, pos) in infos.iter().zip(positions.iter()) {
        let gid = info.glyph_id as u16;
        if gid == 0 {
            pen_x += (pos.x_advance as f32 / units_per_em) * size;
            continue;
        }
        let x_off = (pos.x_offset as f32 / units_per_em) * size;
        let y_off = (pos.y_offset as f32 / units_per_em) * size;
        out.push(GlyphPlacement {
            glyph_id: gid,
            origin_x: baseline_x + pen_x + x_off,
            origin_y: baseline_y - y_off,
            scale,
        });
        pen_x += (pos.x_advance as f32 / units_per_em) * size;
    }
    out
}

fn unshaped_placements(
    face: &ttf_parser::Face<'_>,
    font_size: i32,
    text: &str,
    baseline_x: f32,
    baseline_y: f32,
) -> Vec<GlyphPlacement> {
    let units_per_em = face.units_per_em().max(1) as f32;
    let size = font_size as f32;
    let scale = size / units_per_em;

    let mut out = Vec::new();
    let mut pen_x = 0.0f32;
    for ch in text.chars() {
        let gid = face.glyph_index(ch).map(|id| id.0).unwrap_or(0);
        if gid == 0 {
            pen_x += size * 0.5;
            continue;
        }
        out.push(GlyphPlacement {
            glyph_id: gid,
            origin_x: baseline_x + pen_x,
            origin_y: baseline_y,
            scale,
        });
        let advance_units = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0) as f32;
        let mut advance = (advance_units / units_per_em) * size;
        if advance <= 0.0 {
            advance = size * 0.5;
        }
        pen_x += advance;
    }
    out
}

// Glyph outlines are y-up; the canvas is y-down, so the builder mirrors
// around the baseline.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x2 * self.scale,
            self.origin_y - y2 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
