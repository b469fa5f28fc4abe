use crate::types::Color;

// One laid-out table slot. Slot identity is (row, column); geometry is in
// device pixels with the table margins already applied.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub content: String,
    pub background: Option<Color>,
    pub text_color: Option<Color>,
    pub center: bool,
    pub belongs_to_column: u32,
}

impl Cell {
    // Header cells are supplied with their initial width and the parent
    // column they nest under (0 = top level); layout resolves the rest.
    pub fn header(row: u32, column: u32, width: i32, belongs_to_column: u32) -> Cell {
        Cell {
            row,
            column,
            width,
            belongs_to_column,
            ..Cell::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Cell {
        self.content = content.into();
        self
    }

    pub fn centered(mut self, center: bool) -> Cell {
        self.center = center;
        self
    }

    pub(crate) fn slot(&self) -> (u32, u32) {
        (self.row, self.column)
    }

    pub(crate) fn line_breaks(&self) -> usize {
        self.content.matches('\n').count()
    }
}

// Body cell input for the colored render variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledCell {
    pub content: String,
    pub background: Option<Color>,
    pub text_color: Option<Color>,
}

impl StyledCell {
    pub fn new(content: impl Into<String>) -> StyledCell {
        StyledCell {
            content: content.into(),
            ..StyledCell::default()
        }
    }

    pub fn with_background(mut self, color: Color) -> StyledCell {
        self.background = Some(color);
        self
    }

    pub fn with_text_color(mut self, color: Color) -> StyledCell {
        self.text_color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeDirective {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
    pub orientation: Orientation,
}

impl MergeDirective {
    pub fn horizontal(start_row: u32, end_row: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start_row,
            end_row,
            start_col,
            end_col,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn vertical(start_row: u32, end_row: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start_row,
            end_row,
            start_col,
            end_col,
            orientation: Orientation::Vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_counts_embedded_newlines_only() {
        assert_eq!(Cell::default().with_content("plain").line_breaks(), 0);
        assert_eq!(Cell::default().with_content("a\nb\nc").line_breaks(), 2);
        assert_eq!(Cell::default().with_content("").line_breaks(), 0);
    }

    #[test]
    fn header_constructor_carries_the_belongs_relation() {
        let cell = Cell::header(2, 3, 100, 1);
        assert_eq!(cell.slot(), (2, 3));
        assert_eq!(cell.width, 100);
        assert_eq!(cell.belongs_to_column, 1);
        assert!(!cell.center);
    }
}
