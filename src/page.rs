use crate::cell::{MergeDirective, StyledCell};
use crate::error::GridShotError;
use crate::source::SheetGrid;

#[derive(Debug, Clone)]
pub struct TablePage {
    pub number: usize,
    pub rows: Vec<Vec<StyledCell>>,
    pub merges: Vec<MergeDirective>,
}

// Slices a sheet into fixed-size row chunks. Cells covered by a merged
// region (but not its top-left corner) become "\n" filler so the later merge
// pass can fold them away; the region itself is translated into per-page
// directives with 1-based, chunk-relative row numbers. Detected header rows
// are re-injected at the top of every page after the first.
pub fn paginate(
    grid: &SheetGrid,
    chunk_rows: usize,
    header_rows: &[usize],
) -> Result<Vec<TablePage>, GridShotError> {
    if chunk_rows == 0 {
        return Err(GridShotError::Configuration(
            "chunk_rows must be at least 1".to_string(),
        ));
    }

    let mut pages: Vec<TablePage> = Vec::new();
    let mut current_rows: Vec<Vec<StyledCell>> = Vec::new();
    let mut current_merges: Vec<MergeDirective> = Vec::new();
    let mut header_content: Vec<Vec<StyledCell>> = Vec::new();

    for (r, row) in grid.rows.iter().enumerate() {
        let mut out_row: Vec<StyledCell> = Vec::new();
        for (c, cell) in row.iter().enumerate() {
            if let Some(region) = grid.region_at(r, c) {
                if !region.is_top_left(r, c) {
                    out_row.push(StyledCell {
                        content: "\n".to_string(),
                        background: cell.background,
                        text_color: cell.text_color,
                    });
                    continue;
                }
                let first = (region.first_row % chunk_rows + 1) as u32;
                let last = (region.last_row % chunk_rows + 1) as u32;
                let start_col = (region.first_col + 1) as u32;
                let end_col = (region.last_col + 1) as u32;
                if region.row_span() > 1 {
                    current_merges.push(MergeDirective::vertical(first, last, start_col, end_col));
                }
                if region.col_span() > 1 {
                    current_merges.push(MergeDirective::horizontal(first, last, start_col, end_col));
                }
            }
            out_row.push(StyledCell {
                content: cell.text.clone(),
                background: cell.background,
                text_color: cell.text_color,
            });
        }
        if header_rows.contains(&r) {
            header_content.push(out_row.clone());
        }
        current_rows.push(out_row);
        if (r + 1) % chunk_rows == 0 {
            flush(&mut pages, &mut current_rows, &mut current_merges, &header_content);
        }
    }
    if !current_rows.is_empty() {
        flush(&mut pages, &mut current_rows, &mut current_merges, &header_content);
    }

    Ok(pages)
}

fn flush(
    pages: &mut Vec<TablePage>,
    rows: &mut Vec<Vec<StyledCell>>,
    merges: &mut Vec<MergeDirective>,
    header_content: &[Vec<StyledCell>],
) {
    let number = pages.len();
    let mut page_rows = std::mem::take(rows);
    if number != 0 && !header_content.is_empty() {
        page_rows.splice(0..0, header_content.iter().cloned());
    }
    pages.push(TablePage {
        number,
        rows: page_rows,
        merges: std::mem::take(merges),
    });
}
