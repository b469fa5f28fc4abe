use crate::cell::{Cell, MergeDirective, Orientation};
use std::collections::HashSet;

// Directives are applied in the order given; a later directive sees the
// result of earlier ones. Overlapping directives are therefore
// order-sensitive, which callers rely on and tests pin down.
pub(crate) fn apply(cells: Vec<Cell>, directives: &[MergeDirective]) -> Vec<Cell> {
    let mut cells = cells;
    for directive in directives {
        cells = apply_one(cells, directive);
    }
    cells
}

fn apply_one(cells: Vec<Cell>, directive: &MergeDirective) -> Vec<Cell> {
    let mut selected: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| match directive.orientation {
            Orientation::Horizontal => {
                cell.row == directive.start_row
                    && cell.column >= directive.start_col
                    && cell.column <= directive.end_col
            }
            Orientation::Vertical => {
                cell.column == directive.start_col
                    && cell.row >= directive.start_row
                    && cell.row <= directive.end_row
            }
        })
        .map(|(index, _)| index)
        .collect();
    match directive.orientation {
        Orientation::Horizontal => selected.sort_by_key(|index| cells[*index].column),
        Orientation::Vertical => selected.sort_by_key(|index| cells[*index].row),
    }

    if selected.len() < 2 {
        return cells;
    }

    let content = selected
        .iter()
        .map(|index| cells[*index].content.as_str())
        .filter(|content| !content.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let first = &cells[selected[0]];
    let mut merged = Cell {
        row: directive.start_row,
        column: directive.start_col,
        x: first.x,
        y: first.y,
        width: first.width,
        height: first.height,
        content,
        background: first.background,
        text_color: first.text_color,
        center: first.center,
        belongs_to_column: 0,
    };
    match directive.orientation {
        Orientation::Horizontal => {
            merged.width = selected.iter().map(|index| cells[*index].width).sum();
        }
        Orientation::Vertical => {
            merged.height = selected.iter().map(|index| cells[*index].height).sum();
        }
    }

    // Removal is by slot: only cells still sitting at their original
    // (row, column) are consumed by the directive.
    let slots: HashSet<(u32, u32)> = selected.iter().map(|index| cells[*index].slot()).collect();
    let mut out: Vec<Cell> = cells
        .into_iter()
        .filter(|cell| !slots.contains(&cell.slot()))
        .collect();
    out.push(merged);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: u32, cols: u32, width: i32, height: i32) -> Vec<Cell> {
        let mut cells = Vec::new();
        for r in 1..=rows {
            for c in 1..=cols {
                cells.push(Cell {
                    row: r,
                    column: c,
                    x: (c as i32 - 1) * width,
                    y: (r as i32 - 1) * height,
                    width,
                    height,
                    content: format!("r{r}c{c}"),
                    center: true,
                    ..Cell::default()
                });
            }
        }
        cells
    }

    #[test]
    fn horizontal_merge_sums_widths_and_joins_content() {
        let cells = grid(1, 3, 120, 30);
        let merged = apply(cells, &[MergeDirective::horizontal(1, 1, 1, 2)]);
        assert_eq!(merged.len(), 2);
        let cell = merged.iter().find(|c| c.column == 1).unwrap();
        assert_eq!(cell.width, 240);
        assert_eq!(cell.height, 30);
        assert_eq!(cell.content, "r1c1\nr1c2");
        assert!(!merged.iter().any(|c| c.slot() == (1, 2)));
    }

    #[test]
    fn vertical_merge_sums_heights() {
        let cells = grid(3, 1, 120, 30);
        let merged = apply(cells, &[MergeDirective::vertical(1, 3, 1, 1)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].height, 90);
        assert_eq!(merged[0].width, 120);
        assert_eq!(merged[0].content, "r1c1\nr2c1\nr3c1");
    }

    #[test]
    fn blank_contents_are_skipped_when_joining() {
        let mut cells = grid(1, 2, 120, 30);
        cells[1].content = "   ".to_string();
        let merged = apply(cells, &[MergeDirective::horizontal(1, 1, 1, 2)]);
        assert_eq!(merged[0].content, "r1c1");
    }

    #[test]
    fn single_match_is_a_no_op() {
        let cells = grid(1, 3, 120, 30);
        let merged = apply(cells, &[MergeDirective::horizontal(1, 1, 5, 9)]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn merged_cell_takes_colors_and_alignment_from_the_first() {
        use crate::types::Color;
        let mut cells = grid(1, 2, 120, 30);
        cells[0].background = Some(Color::RED);
        cells[0].text_color = Some(Color::GRAY);
        cells[0].center = false;
        let merged = apply(cells, &[MergeDirective::horizontal(1, 1, 1, 2)]);
        assert_eq!(merged[0].background, Some(Color::RED));
        assert_eq!(merged[0].text_color, Some(Color::GRAY));
        assert!(!merged[0].center);
    }

    #[test]
    fn overlapping_directives_are_order_sensitive() {
        // Known sharp edge: the first directive consumes the shared slot, so
        // the second one sees only a single survivor and becomes a no-op.
        let first_then_second = apply(
            grid(1, 3, 100, 30),
            &[
                MergeDirective::horizontal(1, 1, 1, 2),
                MergeDirective::horizontal(1, 1, 2, 3),
            ],
        );
        assert_eq!(first_then_second.len(), 2);
        let combined = first_then_second.iter().find(|c| c.column == 1).unwrap();
        assert_eq!(combined.width, 200);

        let second_then_first = apply(
            grid(1, 3, 100, 30),
            &[
                MergeDirective::horizontal(1, 1, 2, 3),
                MergeDirective::horizontal(1, 1, 1, 2),
            ],
        );
        // now columns 2-3 fused first; the later 1-2 directive only finds
        // column 1 plus the merged cell still indexed at column 2
        let wide = second_then_first
            .iter()
            .find(|c| c.width == 300)
            .expect("1-2 directive swallowed the merged 2-3 cell");
        assert_eq!(wide.content, "r1c1\nr1c2\nr1c3");
    }

    #[test]
    fn vertical_merge_selects_a_single_column_only() {
        let cells = grid(2, 2, 100, 30);
        let merged = apply(cells, &[MergeDirective::vertical(1, 2, 1, 2)]);
        // end_col is ignored for vertical merges; column 2 stays untouched
        assert_eq!(merged.len(), 3);
        let fused = merged.iter().find(|c| c.height == 60).unwrap();
        assert_eq!(fused.column, 1);
    }
}
