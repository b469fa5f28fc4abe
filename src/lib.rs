mod cell;
mod classify;
mod convert;
mod error;
mod font;
mod header;
mod html;
mod layout;
mod merge;
mod page;
mod palette;
mod raster;
mod source;
mod style;
mod types;

pub use cell::{Cell, MergeDirective, Orientation, StyledCell};
pub use classify::{HeaderClassifier, NumberedRow, RowClassification, numbered_rows};
pub use convert::{
    RenderOptions, RenderedPage, render_sheet, render_sheets, render_sheets_to_dir,
};
pub use error::{Axis, GridShotError, StructureError};
pub use font::Font;
pub use html::sheet_to_html;
pub use page::{TablePage, paginate};
pub use palette::indexed_color;
pub use source::{MergedRegion, SheetGrid, SheetReader, SourceCell};
pub use style::{DEFAULT_DPI, ROW_HEIGHT_FLOOR, TableStyle};
pub use tiny_skia::Pixmap;
pub use types::Color;

use layout::BodyContent;
use raster::PaintMode;

// The geometry model for one render: style, optional hierarchical header
// cells, merge directives. Single-use; nothing is retained across renders.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub style: TableStyle,
    pub head_cells: Vec<Cell>,
    pub merges: Vec<MergeDirective>,
}

// Plain variant: bare text body, optional hierarchical header. Red borders,
// header rows filled with the style's header background.
pub fn draw_table(table: &Table, rows: &[Vec<String>]) -> Result<Pixmap, GridShotError> {
    let style = table.style.normalized()?;

    if table.head_cells.is_empty() {
        return draw_without_header(
            &style,
            rows,
            &table.merges,
            PaintMode {
                per_cell_color: false,
                header_rows: 0,
            },
        );
    }

    let forest = header::build(&table.head_cells)?;
    let head_heights =
        layout::header_row_heights(&forest, style.row_height, style.header_font.size());
    let body_heights = layout::row_heights(rows, style.row_height, style.body_font.size());
    let (head_cells, leaves) =
        layout::layout_header(&forest, &head_heights, style.margin_x, style.margin_y)?;
    let body_cells =
        layout::layout_body_under_header(rows, &leaves, forest.row_count(), &body_heights);
    // directives only ever operate on a non-empty body working set
    let body_is_empty = body_cells.is_empty();
    let mut cells = body_cells;
    cells.extend(head_cells);
    let cells = if body_is_empty {
        cells
    } else {
        merge::apply(cells, &table.merges)
    };

    let table_height: i32 =
        head_heights.iter().sum::<i32>() + body_heights.iter().sum::<i32>();
    let pixmap = raster::paint(
        &cells,
        &style,
        table_height,
        PaintMode {
            per_cell_color: false,
            header_rows: forest.row_count(),
        },
    )?;
    raster::rescale(pixmap, style.dpi)
}

// Colored variant: per-cell backgrounds and text colors, black borders.
// Header cells are validated but never laid out on this path.
pub fn draw_table_styled(
    table: &Table,
    rows: &[Vec<StyledCell>],
) -> Result<Pixmap, GridShotError> {
    let style = table.style.normalized()?;
    if !table.head_cells.is_empty() {
        header::build(&table.head_cells)?;
    }
    draw_without_header(
        &style,
        rows,
        &table.merges,
        PaintMode {
            per_cell_color: true,
            header_rows: 0,
        },
    )
}

fn draw_without_header<T: BodyContent>(
    style: &TableStyle,
    rows: &[Vec<T>],
    merges: &[MergeDirective],
    mode: PaintMode,
) -> Result<Pixmap, GridShotError> {
    // an empty body with no header is the placeholder, never an error
    if rows.is_empty() {
        return raster::placeholder();
    }
    let mut measure = style.body_font.measurer();
    let widths = layout::column_widths(rows, &mut measure);
    let heights = layout::row_heights(rows, style.row_height, style.body_font.size());
    let cells = layout::layout_body(rows, &widths, &heights, style.margin_x, style.margin_y);
    let cells = merge::apply(cells, merges);
    if cells.is_empty() {
        return raster::placeholder();
    }
    let table_height: i32 = heights.iter().sum();
    let pixmap = raster::paint(&cells, style, table_height, mode)?;
    raster::rescale(pixmap, style.dpi)
}
