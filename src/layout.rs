//! Grid layout: how many cells, where they sit, and which image each shows.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wall_config::{CellMetrics, GridOptions};

use crate::color::BackgroundColor;
use crate::events::CellId;
use crate::image_ref::ImageRef;
use crate::viewport::ViewportState;

/// Shown when no images are available.
pub const PLACEHOLDER_IMAGES: [&str; 8] = [
    "https://images.unsplash.com/photo-1506744038136-46273834b3fb?auto=format&fit=crop&w=400&q=80",
    "https://images.unsplash.com/photo-1465101046530-73398c7f28ca?auto=format&fit=crop&w=400&q=80",
    "https://images.unsplash.com/photo-1519125323398-675f0ddb6308?auto=format&fit=crop&w=400&q=80",
    "https://images.unsplash.com/photo-1500534314209-a25ddb2bd429?auto=format&fit=crop&w=400&q=80",
    "https://images.unsplash.com/photo-1465101178521-c1a9136a3b99?auto=format&fit=crop&w=400&q=80",
    "https://images.unsplash.com/photo-1465101046530-73398c7f28ca?auto=format&fit=crop&w=400&q=80",
    "https://images.unsplash.com/photo-1519125323398-675f0ddb6308?auto=format&fit=crop&w=400&q=80",
    "https://images.unsplash.com/photo-1500534314209-a25ddb2bd429?auto=format&fit=crop&w=400&q=80",
];

/// Which wall variant is laid out, and therefore which drag track is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridMode {
    /// Full 2D grid panned freely, with momentum on release.
    #[default]
    Wall,
    /// Single-row carousel dragged horizontally, snapping to a cell on release.
    Dock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub id: CellId,
    pub row: usize,
    pub col: usize,
    /// Index into [`GridLayout::images`].
    pub image: usize,
    pub rendered_scale: f64,
    /// Stacking hint; `None` means default stacking.
    pub z_order: Option<i32>,
    pub hovered: bool,
    /// Horizontally centered in the viewport.
    pub focused: bool,
}

impl GridCell {
    fn new(id: usize, row: usize, col: usize, image: usize) -> Self {
        Self {
            id: CellId(id),
            row,
            col,
            image,
            rendered_scale: 1.0,
            z_order: None,
            hovered: false,
            focused: false,
        }
    }

    pub fn reset_visual(&mut self) {
        self.rendered_scale = 1.0;
        self.z_order = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub cols: usize,
    pub rows: usize,
    pub metrics: CellMetrics,
    pub content_width: f64,
    pub content_height: f64,
}

impl GridGeometry {
    pub fn compute(
        viewport_width: f64,
        viewport_height: f64,
        options: &GridOptions,
        mode: GridMode,
    ) -> Self {
        let metrics = options.metrics_for(viewport_width);
        let overscan = options.overscan.max(1) as usize;
        // Degenerate metrics count as one pixel per cell so the grid stays finite.
        let pitch = match metrics.pitch() {
            p if p.is_finite() && p >= 1.0 => p,
            _ => 1.0,
        };
        let visible = |extent: f64| {
            let extent = if extent.is_finite() { extent.max(0.0) } else { 0.0 };
            (extent / pitch).ceil().max(1.0) as usize
        };
        let cols = visible(viewport_width).saturating_mul(overscan);
        let rows = match mode {
            GridMode::Wall => visible(viewport_height).saturating_mul(overscan),
            GridMode::Dock => 1,
        };
        Self {
            cols,
            rows,
            metrics,
            content_width: span(cols, metrics),
            content_height: span(rows, metrics),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Cell center in content coordinates.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let half = self.metrics.cell_size / 2.0;
        (
            col as f64 * self.metrics.pitch() + half,
            row as f64 * self.metrics.pitch() + half,
        )
    }

    /// Cell center relative to the viewport's top-left corner.
    pub fn screen_center(&self, cell: &GridCell, viewport: &ViewportState) -> (f64, f64) {
        let (x, y) = self.cell_center(cell.row, cell.col);
        (x - viewport.scroll_x(), y - viewport.scroll_y())
    }
}

fn span(count: usize, metrics: CellMetrics) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * metrics.cell_size + (count - 1) as f64 * metrics.gap
}

/// What a cell paints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellFill<'a> {
    Image(&'a ImageRef),
    Background(BackgroundColor),
}

pub struct LayoutRequest<'a> {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub images: &'a [String],
    /// Used when `images` is empty; the built-in set is used if this is empty too.
    pub placeholders: &'a [String],
    pub background: BackgroundColor,
    pub grid: &'a GridOptions,
    pub mode: GridMode,
}

#[derive(Debug, Clone)]
pub struct GridLayout {
    geometry: GridGeometry,
    mode: GridMode,
    cells: Vec<GridCell>,
    images: Vec<String>,
    parsed: Vec<Option<ImageRef>>,
    background: BackgroundColor,
    initial_scroll: (f64, f64),
    placeholders: bool,
}

/// Fisher–Yates shuffled copy of `images`.
pub fn shuffled<R: Rng + ?Sized>(images: &[String], rng: &mut R) -> Vec<String> {
    let mut copy = images.to_vec();
    copy.shuffle(rng);
    copy
}

pub fn build_grid<R: Rng + ?Sized>(request: &LayoutRequest<'_>, rng: &mut R) -> GridLayout {
    let (source, placeholders): (Vec<String>, bool) = if !request.images.is_empty() {
        (request.images.to_vec(), false)
    } else if !request.placeholders.is_empty() {
        (request.placeholders.to_vec(), true)
    } else {
        (PLACEHOLDER_IMAGES.iter().map(|s| s.to_string()).collect(), true)
    };

    let images = shuffled(&source, rng);
    let parsed: Vec<Option<ImageRef>> = images
        .iter()
        .map(|raw| match ImageRef::parse(raw) {
            Ok(image) => Some(image),
            Err(err) => {
                debug!(%err, "cell image will fall back to background");
                None
            }
        })
        .collect();

    let geometry = GridGeometry::compute(
        request.viewport_width,
        request.viewport_height,
        request.grid,
        request.mode,
    );

    let mut cells = Vec::with_capacity(geometry.cell_count());
    for row in 0..geometry.rows {
        for col in 0..geometry.cols {
            let image = rng.random_range(0..images.len());
            cells.push(GridCell::new(cells.len(), row, col, image));
        }
    }

    let initial_scroll = (
        ((geometry.content_width - request.viewport_width) / 2.0).max(0.0),
        ((geometry.content_height - request.viewport_height) / 2.0).max(0.0),
    );

    info!(
        mode = ?request.mode,
        cols = geometry.cols,
        rows = geometry.rows,
        cells = cells.len(),
        images = images.len(),
        malformed = parsed.iter().filter(|p| p.is_none()).count(),
        placeholders,
        "grid built"
    );

    GridLayout {
        geometry,
        mode: request.mode,
        cells,
        images,
        parsed,
        background: request.background,
        initial_scroll,
        placeholders,
    }
}

impl GridLayout {
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [GridCell] {
        &mut self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&GridCell> {
        self.cells.get(id.0)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut GridCell> {
        self.cells.get_mut(id.0)
    }

    /// Shuffled image list that cells index into.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn background(&self) -> BackgroundColor {
        self.background
    }

    pub fn set_background(&mut self, background: BackgroundColor) {
        self.background = background;
    }

    pub fn uses_placeholders(&self) -> bool {
        self.placeholders
    }

    pub fn initial_scroll(&self) -> (f64, f64) {
        self.initial_scroll
    }

    /// Viewport over this layout, scrolled to the centered starting position.
    pub fn viewport(&self, width: f64, height: f64) -> ViewportState {
        let mut viewport = ViewportState::new(
            width,
            height,
            self.geometry.content_width,
            self.geometry.content_height,
        );
        viewport.scroll_to(self.initial_scroll.0, self.initial_scroll.1);
        viewport
    }

    pub fn image_ref(&self, id: CellId) -> Option<&ImageRef> {
        let cell = self.cell(id)?;
        self.parsed.get(cell.image)?.as_ref()
    }

    pub fn fill(&self, id: CellId) -> CellFill<'_> {
        match self.image_ref(id) {
            Some(image) => CellFill::Image(image),
            None => CellFill::Background(self.background),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn request<'a>(images: &'a [String], grid: &'a GridOptions, mode: GridMode) -> LayoutRequest<'a> {
        LayoutRequest {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            images,
            placeholders: &[],
            background: BackgroundColor::default(),
            grid,
            mode,
        }
    }

    #[test]
    fn malformed_reference_fills_with_background() {
        let grid = GridOptions::default();
        let images = vec!["not a url".to_string()];
        let mut rng = StdRng::seed_from_u64(1);
        let layout = build_grid(&request(&images, &grid, GridMode::Wall), &mut rng);
        let first = layout.cells()[0].id;
        assert_eq!(
            layout.fill(first),
            CellFill::Background(BackgroundColor::default())
        );
        assert!(layout.image_ref(first).is_none());
    }

    #[test]
    fn zero_pitch_still_yields_a_finite_grid() {
        let grid = GridOptions {
            wide: CellMetrics {
                cell_size: 0.0,
                gap: 0.0,
            },
            ..GridOptions::default()
        };
        let overscan = grid.overscan as usize;
        let geometry = GridGeometry::compute(1280.0, 800.0, &grid, GridMode::Wall);
        assert_eq!(geometry.cols, 1280 * overscan);
        assert_eq!(geometry.rows, 800 * overscan);
        assert!(geometry.content_width.is_finite());
        assert!(geometry.content_height.is_finite());

        let dock = GridGeometry::compute(f64::INFINITY, 800.0, &grid, GridMode::Dock);
        assert_eq!(dock.cols, overscan);
        assert_eq!(dock.rows, 1);
    }

    #[test]
    fn dock_mode_is_one_row() {
        let grid = GridOptions::default();
        let images = vec!["https://example.com/a.jpg".to_string()];
        let mut rng = StdRng::seed_from_u64(2);
        let layout = build_grid(&request(&images, &grid, GridMode::Dock), &mut rng);
        assert_eq!(layout.geometry().rows, 1);
        assert_eq!(layout.geometry().content_height, 120.0);
        assert_eq!(layout.initial_scroll().1, 0.0);
    }

    #[test]
    fn content_span_excludes_trailing_gap() {
        let metrics = CellMetrics {
            cell_size: 120.0,
            gap: 91.0,
        };
        assert_eq!(span(3, metrics), 3.0 * 120.0 + 2.0 * 91.0);
        assert_eq!(span(0, metrics), 0.0);
    }
}
