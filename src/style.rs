use crate::error::GridShotError;
use crate::font::Font;
use crate::types::Color;

pub const ROW_HEIGHT_FLOOR: i32 = 30;
pub const DEFAULT_DPI: i32 = 72;

#[derive(Debug, Clone)]
pub struct TableStyle {
    pub header_font: Font,
    pub body_font: Font,
    pub header_background: Color,
    pub row_height: i32,
    pub margin_x: i32,
    pub margin_y: i32,
    pub dpi: i32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_font: Font::fallback("header", 15),
            body_font: Font::fallback("body", 12),
            header_background: Color::GRAY,
            row_height: ROW_HEIGHT_FLOOR,
            margin_x: 10,
            margin_y: 10,
            dpi: DEFAULT_DPI,
        }
    }
}

impl TableStyle {
    // The only repairs the engine performs: the row-height floor and the
    // defaults baked into Default. Everything else is fail-fast.
    pub(crate) fn normalized(&self) -> Result<TableStyle, GridShotError> {
        if self.margin_x < 0 || self.margin_y < 0 {
            return Err(GridShotError::Configuration(
                "table margins must not be negative".to_string(),
            ));
        }
        let mut style = self.clone();
        if style.row_height <= ROW_HEIGHT_FLOOR {
            style.row_height = ROW_HEIGHT_FLOOR;
        }
        Ok(style)
    }
}
