use crate::error::GridShotError;
use crate::types::Color;

// Contract with the spreadsheet-reading collaborator: cell values already
// resolved to display strings, colors already resolved from the workbook's
// style model, merged regions as 0-based inclusive rectangles.
pub trait SheetReader {
    fn read_sheets(&mut self) -> Result<Vec<SheetGrid>, GridShotError>;
}

#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<SourceCell>>,
    pub merges: Vec<MergedRegion>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> SheetGrid {
        SheetGrid {
            name: name.into(),
            ..SheetGrid::default()
        }
    }

    pub(crate) fn region_at(&self, row: usize, col: usize) -> Option<&MergedRegion> {
        self.merges.iter().find(|region| region.contains(row, col))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCell {
    pub text: String,
    pub background: Option<Color>,
    pub text_color: Option<Color>,
}

impl SourceCell {
    pub fn new(text: impl Into<String>) -> SourceCell {
        SourceCell {
            text: text.into(),
            ..SourceCell::default()
        }
    }

    pub fn with_background(mut self, color: Color) -> SourceCell {
        self.background = Some(color);
        self
    }

    pub fn with_text_color(mut self, color: Color) -> SourceCell {
        self.text_color = Some(color);
        self
    }
}

// 0-based inclusive bounds, the spreadsheet convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRegion {
    pub first_row: usize,
    pub last_row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

impl MergedRegion {
    pub fn new(first_row: usize, last_row: usize, first_col: usize, last_col: usize) -> Self {
        Self {
            first_row,
            last_row,
            first_col,
            last_col,
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.first_row && row <= self.last_row && col >= self.first_col && col <= self.last_col
    }

    pub fn is_top_left(&self, row: usize, col: usize) -> bool {
        row == self.first_row && col == self.first_col
    }

    pub fn row_span(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    pub fn col_span(&self) -> usize {
        self.last_col - self.first_col + 1
    }
}
