use crate::source::SheetGrid;

// HTML rendition of a sheet, with merged regions expressed as
// rowspan/colspan. Cells covered by a region but not its top-left corner are
// skipped entirely.
pub fn sheet_to_html(grid: &SheetGrid) -> String {
    let mut html = String::from("<table border='1' cellspacing='0' cellpadding='4'>\n");
    for (r, row) in grid.rows.iter().enumerate() {
        if row.is_empty() {
            html.push_str("<tr></tr>\n");
            continue;
        }
        html.push_str("<tr>");
        for (c, cell) in row.iter().enumerate() {
            if let Some(region) = grid.region_at(r, c) {
                if !region.is_top_left(r, c) {
                    continue;
                }
                html.push_str("<td");
                if region.row_span() > 1 {
                    html.push_str(&format!(" rowspan='{}'", region.row_span()));
                }
                if region.col_span() > 1 {
                    html.push_str(&format!(" colspan='{}'", region.col_span()));
                }
                html.push('>');
            } else {
                html.push_str("<td>");
            }
            html.push_str(&escape(&cell.text));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MergedRegion, SourceCell};

    #[test]
    fn plain_rows_become_table_rows() {
        let mut grid = SheetGrid::new("s");
        grid.rows.push(vec![SourceCell::new("a"), SourceCell::new("b")]);
        grid.rows.push(vec![]);
        let html = sheet_to_html(&grid);
        assert!(html.starts_with("<table"));
        assert!(html.contains("<tr><td>a</td><td>b</td></tr>"));
        assert!(html.contains("<tr></tr>"));
    }

    #[test]
    fn merged_regions_emit_spans_and_skip_covered_cells() {
        let mut grid = SheetGrid::new("s");
        grid.rows.push(vec![SourceCell::new("top"), SourceCell::new("right")]);
        grid.rows.push(vec![SourceCell::new("hidden"), SourceCell::new("below")]);
        grid.merges.push(MergedRegion::new(0, 1, 0, 0));
        let html = sheet_to_html(&grid);
        assert!(html.contains("<td rowspan='2'>top</td>"));
        assert!(!html.contains("hidden"));
    }

    #[test]
    fn text_is_escaped() {
        let mut grid = SheetGrid::new("s");
        grid.rows.push(vec![SourceCell::new("a<b & c>d")]);
        let html = sheet_to_html(&grid);
        assert!(html.contains("a&lt;b &amp; c&gt;d"));
    }
}
