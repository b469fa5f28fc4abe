use crate::cell::{Cell, StyledCell};
use crate::error::GridShotError;
use crate::font::FontMeasure;
use crate::header::HeaderForest;
use crate::types::Color;
use log::debug;

pub(crate) const MIN_COLUMN_WIDTH: i32 = 100;
pub(crate) const COLUMN_PADDING: i32 = 20;

// Body rows come in two flavors (bare strings, styled cells); layout only
// needs the text plus optional colors, so one routine serves both.
pub(crate) trait BodyContent {
    fn text(&self) -> &str;
    fn background(&self) -> Option<Color> {
        None
    }
    fn text_color(&self) -> Option<Color> {
        None
    }
}

impl BodyContent for String {
    fn text(&self) -> &str {
        self
    }
}

impl BodyContent for StyledCell {
    fn text(&self) -> &str {
        &self.content
    }

    fn background(&self) -> Option<Color> {
        self.background
    }

    fn text_color(&self) -> Option<Color> {
        self.text_color
    }
}

pub(crate) fn column_widths<T: BodyContent>(
    rows: &[Vec<T>],
    measure: &mut FontMeasure<'_>,
) -> Vec<i32> {
    let max_cols = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    (0..max_cols)
        .map(|col| {
            let mut max_width = MIN_COLUMN_WIDTH;
            for row in rows {
                if let Some(cell) = row.get(col) {
                    max_width = max_width.max(measure.content_width(cell.text()));
                }
            }
            MIN_COLUMN_WIDTH.max(max_width + COLUMN_PADDING)
        })
        .collect()
}

// Row height = floor + font_size per embedded line break. A row with no
// cells at all counts as one break.
pub(crate) fn row_heights<T: BodyContent>(
    rows: &[Vec<T>],
    row_height: i32,
    font_size: i32,
) -> Vec<i32> {
    rows.iter()
        .map(|row| {
            let breaks = row
                .iter()
                .map(|cell| cell.text().matches('\n').count())
                .max()
                .unwrap_or(1);
            row_height + font_size * breaks as i32
        })
        .collect()
}

pub(crate) fn header_row_heights(
    forest: &HeaderForest,
    row_height: i32,
    font_size: i32,
) -> Vec<i32> {
    (1..=forest.row_count())
        .map(|row| {
            let breaks = forest.max_line_breaks_in_row(row).unwrap_or(1);
            row_height + font_size * breaks as i32
        })
        .collect()
}

// Headerless body layout: columns run left-to-right from margin_x, rows
// stack from margin_y.
pub(crate) fn layout_body<T: BodyContent>(
    rows: &[Vec<T>],
    widths: &[i32],
    heights: &[i32],
    margin_x: i32,
    margin_y: i32,
) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut y = margin_y;
    for (i, row) in rows.iter().enumerate() {
        let mut x = margin_x;
        for (j, content) in row.iter().enumerate() {
            cells.push(Cell {
                row: i as u32 + 1,
                column: j as u32 + 1,
                x,
                y,
                width: widths[j],
                height: heights[i],
                content: content.text().to_string(),
                background: content.background(),
                text_color: content.text_color(),
                center: true,
                belongs_to_column: 0,
            });
            x += widths[j];
        }
        y += heights[i];
    }
    cells
}

// One leaf header column: the geometry body cells inherit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LeafColumn {
    pub(crate) column: u32,
    pub(crate) x: i32,
    pub(crate) width: i32,
    pub(crate) bottom: i32,
}

// Positions every header cell. A cell's width is the sum of its leaf
// descendants' caller-supplied widths; a leaf spans every header row from
// its own down to the last one.
pub(crate) fn layout_header(
    forest: &HeaderForest,
    heights: &[i32],
    margin_x: i32,
    margin_y: i32,
) -> Result<(Vec<Cell>, Vec<LeafColumn>), GridShotError> {
    let leaf_indices = forest.leaves();
    let leaf_widths: Vec<i32> = leaf_indices
        .iter()
        .map(|index| forest.cell(*index).width)
        .collect();

    let mut placed: Vec<Cell> = Vec::new();
    let mut geometry: Vec<Option<(i32, i32, i32, i32)>> = vec![None; forest.len()];

    for row in 1..=forest.row_count() {
        let nodes = forest.nodes_in_row(row);
        let mut x = margin_x;
        if row > 1 {
            if let Some(first) = nodes.first() {
                let first_column = forest.cell(*first).column;
                if first_column > 1 {
                    x += leaf_widths
                        .iter()
                        .take(first_column as usize - 1)
                        .sum::<i32>();
                }
            }
        }
        let y = margin_y + heights[..row as usize - 1].iter().sum::<i32>();
        for index in nodes {
            let source = forest.cell(index);
            let width: i32 = forest
                .leaf_descendants(index)
                .iter()
                .map(|leaf| forest.cell(*leaf).width)
                .sum();
            if width <= 0 {
                return Err(GridShotError::Geometry {
                    row: source.row,
                    column: source.column,
                });
            }
            let height = if forest.is_leaf(index) {
                heights[row as usize - 1..].iter().sum::<i32>()
            } else {
                heights[row as usize - 1]
            };
            let mut cell = source.clone();
            cell.x = x;
            cell.y = y;
            cell.width = width;
            cell.height = height;
            geometry[index] = Some((x, y, width, height));
            placed.push(cell);
            x += width;
        }
    }

    let leaves = leaf_indices
        .iter()
        .map(|index| {
            let (x, y, width, height) = geometry[*index].expect("leaf laid out");
            LeafColumn {
                column: forest.cell(*index).column,
                x,
                width,
                bottom: y + height,
            }
        })
        .collect();

    Ok((placed, leaves))
}

// Body rows beneath a header inherit x/width/column from their leaf column;
// row numbering continues after the header rows.
pub(crate) fn layout_body_under_header<T: BodyContent>(
    rows: &[Vec<T>],
    leaves: &[LeafColumn],
    header_rows: u32,
    heights: &[i32],
) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut offset = 0;
    for (i, row) in rows.iter().enumerate() {
        for (j, content) in row.iter().enumerate() {
            let Some(leaf) = leaves.get(j) else {
                debug!(
                    "body row {} has more cells than leaf columns; dropping cell {}",
                    i + 1,
                    j + 1
                );
                continue;
            };
            cells.push(Cell {
                row: i as u32 + 1 + header_rows,
                column: leaf.column,
                x: leaf.x,
                y: leaf.bottom + offset,
                width: leaf.width,
                height: heights[i],
                content: content.text().to_string(),
                background: content.background(),
                text_color: content.text_color(),
                center: true,
                belongs_to_column: 0,
            });
        }
        offset += heights[i];
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Font;
    use crate::header;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn column_width_has_a_floor_of_120() {
        // max(100, max(100, measured) + 20): short content always lands on 120
        let font = Font::fallback("body", 12);
        let mut measure = font.measurer();
        let widths = column_widths(&rows(&[&["ab", "cd"]]), &mut measure);
        assert_eq!(widths, vec![120, 120]);
    }

    #[test]
    fn column_width_tracks_the_widest_line_plus_padding() {
        let font = Font::fallback("body", 10);
        let mut measure = font.measurer();
        let long = "a".repeat(40); // 40 * 6 = 240 measured
        let widths = column_widths(&rows(&[&[long.as_str()], &["short"]]), &mut measure);
        assert_eq!(widths, vec![260]);
    }

    #[test]
    fn widening_content_never_shrinks_a_column() {
        let font = Font::fallback("body", 12);
        let mut measure = font.measurer();
        let narrow = column_widths(&rows(&[&["aaaa"]]), &mut measure)[0];
        let wide = column_widths(&rows(&[&["aaaaaaaaaaaaaaaaaaaaaaaaaaaa"]]), &mut measure)[0];
        assert!(wide >= narrow);
    }

    #[test]
    fn multiline_content_measures_per_line() {
        let font = Font::fallback("body", 10);
        let mut measure = font.measurer();
        let long = "b".repeat(30); // 180 measured
        let content = format!("ab\n{long}");
        let widths = column_widths(&vec![vec![content]], &mut measure);
        assert_eq!(widths, vec![200]);
    }

    #[test]
    fn row_height_adds_font_size_per_break() {
        let heights = row_heights(&rows(&[&["plain"], &["a\nb\nc"]]), 30, 12);
        assert_eq!(heights, vec![30, 54]);
    }

    #[test]
    fn empty_row_counts_as_one_break() {
        let heights = row_heights(&rows(&[&[]]), 30, 12);
        assert_eq!(heights, vec![42]);
    }

    #[test]
    fn body_positions_accumulate_from_margins() {
        let body = rows(&[&["a", "b"], &["c", "d"]]);
        let cells = layout_body(&body, &[120, 150], &[30, 40], 10, 5);
        assert_eq!(cells.len(), 4);
        assert_eq!((cells[0].x, cells[0].y), (10, 5));
        assert_eq!((cells[1].x, cells[1].y), (130, 5));
        assert_eq!((cells[2].x, cells[2].y), (10, 35));
        assert_eq!(cells[3].height, 40);
        assert!(cells.iter().all(|c| c.center));
    }

    fn nested_forest() -> crate::header::HeaderForest {
        header::build(&[
            Cell::header(1, 1, 100, 0).with_content("info"),
            Cell::header(2, 1, 100, 1).with_content("name"),
            Cell::header(2, 2, 100, 1).with_content("age"),
            Cell::header(2, 3, 100, 1).with_content("city"),
        ])
        .unwrap()
    }

    #[test]
    fn parent_width_is_the_sum_of_its_leaves() {
        let forest = nested_forest();
        let (placed, leaves) = layout_header(&forest, &[30, 30], 10, 10).unwrap();
        let parent = placed.iter().find(|c| c.row == 1).unwrap();
        assert_eq!(parent.width, 300);
        assert_eq!(parent.height, 30);
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0].x, 10);
        assert_eq!(leaves[1].x, 110);
        assert_eq!(leaves[2].x, 210);
    }

    #[test]
    fn leaf_in_an_early_row_spans_the_remaining_rows() {
        let forest = header::build(&[
            Cell::header(1, 1, 100, 0),
            Cell::header(1, 2, 100, 0),
            Cell::header(2, 2, 100, 2),
        ])
        .unwrap();
        let (placed, _) = layout_header(&forest, &[30, 45], 0, 0).unwrap();
        let early_leaf = placed
            .iter()
            .find(|c| c.row == 1 && c.column == 1)
            .unwrap();
        assert_eq!(early_leaf.height, 75);
        let parent = placed.iter().find(|c| c.row == 1 && c.column == 2).unwrap();
        assert_eq!(parent.height, 30);
    }

    #[test]
    fn later_row_starting_past_column_one_is_offset_by_leaf_widths() {
        let forest = header::build(&[
            Cell::header(1, 1, 150, 0),
            Cell::header(1, 2, 100, 0),
            Cell::header(2, 2, 100, 2),
        ])
        .unwrap();
        let (placed, _) = layout_header(&forest, &[30, 30], 10, 0).unwrap();
        let child = placed.iter().find(|c| c.row == 2).unwrap();
        assert_eq!(child.x, 160);
    }

    #[test]
    fn zero_width_leaf_is_a_geometry_error() {
        let forest = header::build(&[Cell::header(1, 1, 0, 0)]).unwrap();
        let err = layout_header(&forest, &[30], 10, 10).unwrap_err();
        assert!(matches!(
            err,
            GridShotError::Geometry { row: 1, column: 1 }
        ));
    }

    #[test]
    fn body_under_header_inherits_leaf_geometry() {
        let forest = nested_forest();
        let (_, leaves) = layout_header(&forest, &[30, 30], 10, 10).unwrap();
        let body = rows(&[&["x", "y", "z"], &["u", "v", "w"]]);
        let cells = layout_body_under_header(&body, &leaves, forest.row_count(), &[30, 30]);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0].row, 3);
        assert_eq!(cells[0].column, 1);
        assert_eq!(cells[0].x, 10);
        assert_eq!(cells[0].y, 70); // header block is 10 + 30 + 30
        assert_eq!(cells[3].row, 4);
        assert_eq!(cells[3].y, 100);
        assert_eq!(cells[1].x, 110);
    }

    #[test]
    fn extra_body_cells_without_a_leaf_are_dropped() {
        let forest = nested_forest();
        let (_, leaves) = layout_header(&forest, &[30, 30], 10, 10).unwrap();
        let body = rows(&[&["x", "y", "z", "extra"]]);
        let cells = layout_body_under_header(&body, &leaves, forest.row_count(), &[30]);
        assert_eq!(cells.len(), 3);
    }
}
