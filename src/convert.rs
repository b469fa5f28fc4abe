use crate::classify::{HeaderClassifier, numbered_rows};
use crate::error::GridShotError;
use crate::page::{self, TablePage};
use crate::source::{SheetGrid, SheetReader};
use crate::style::TableStyle;
use crate::{Table, draw_table_styled};
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tiny_skia::Pixmap;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub chunk_rows: usize,
    pub need_header: bool,
    pub style: TableStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            chunk_rows: 100,
            need_header: false,
            style: TableStyle::default(),
        }
    }
}

pub struct RenderedPage {
    pub name: String,
    pub image: Pixmap,
}

impl RenderedPage {
    pub fn encode_png(&self) -> Result<Vec<u8>, GridShotError> {
        self.image
            .encode_png()
            .map_err(|err| GridShotError::Canvas(format!("png encode failed: {err}")))
    }
}

// One sheet in, one rendered image per page out. Pages are independent
// renders, so they run in parallel; style and fonts are shared read-only.
pub fn render_sheet(
    grid: &SheetGrid,
    options: &RenderOptions,
    classifier: Option<&dyn HeaderClassifier>,
) -> Result<Vec<RenderedPage>, GridShotError> {
    let header_rows = detect_header_rows(grid, options, classifier);
    let pages = page::paginate(grid, options.chunk_rows, &header_rows)?;
    info!("rendering sheet {} as {} page(s)", grid.name, pages.len());
    pages
        .par_iter()
        .map(|page| render_page(grid, options, page))
        .collect()
}

pub fn render_sheets(
    reader: &mut dyn SheetReader,
    options: &RenderOptions,
    classifier: Option<&dyn HeaderClassifier>,
) -> Result<Vec<RenderedPage>, GridShotError> {
    let mut rendered = Vec::new();
    for (index, grid) in reader.read_sheets()?.iter().enumerate() {
        info!("processing sheet {} {}", index + 1, grid.name);
        rendered.extend(render_sheet(grid, options, classifier)?);
    }
    Ok(rendered)
}

pub fn render_sheets_to_dir(
    reader: &mut dyn SheetReader,
    options: &RenderOptions,
    classifier: Option<&dyn HeaderClassifier>,
    dir: &Path,
) -> Result<Vec<PathBuf>, GridShotError> {
    std::fs::create_dir_all(dir)?;
    let pages = render_sheets(reader, options, classifier)?;
    let mut paths = Vec::with_capacity(pages.len());
    for page in pages {
        let path = dir.join(&page.name);
        std::fs::write(&path, page.encode_png()?)?;
        paths.push(path);
    }
    Ok(paths)
}

fn render_page(
    grid: &SheetGrid,
    options: &RenderOptions,
    page: &TablePage,
) -> Result<RenderedPage, GridShotError> {
    let table = Table {
        style: options.style.clone(),
        head_cells: Vec::new(),
        merges: page.merges.clone(),
    };
    let image = draw_table_styled(&table, &page.rows)?;
    Ok(RenderedPage {
        name: format!("{}_{}.png", grid.name, page.number),
        image,
    })
}

// A classifier failure only disables header re-injection; the render itself
// must still go through.
fn detect_header_rows(
    grid: &SheetGrid,
    options: &RenderOptions,
    classifier: Option<&dyn HeaderClassifier>,
) -> Vec<usize> {
    if !options.need_header {
        return Vec::new();
    }
    let Some(classifier) = classifier else {
        return Vec::new();
    };
    match classifier.classify(&numbered_rows(grid)) {
        Ok(classification) => classification.header_rows,
        Err(err) => {
            warn!(
                "header classification failed for sheet {}; rendering without headers: {err}",
                grid.name
            );
            Vec::new()
        }
    }
}
