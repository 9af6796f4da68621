use infinity_wall::color::BackgroundColor;
use infinity_wall::layout::{
    GridGeometry, GridMode, LayoutRequest, PLACEHOLDER_IMAGES, build_grid, shuffled,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wall_config::GridOptions;

fn images(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("https://example.com/{i}.jpg"))
        .collect()
}

fn request<'a>(
    width: f64,
    height: f64,
    images: &'a [String],
    grid: &'a GridOptions,
) -> LayoutRequest<'a> {
    LayoutRequest {
        viewport_width: width,
        viewport_height: height,
        images,
        placeholders: &[],
        background: BackgroundColor::default(),
        grid,
        mode: GridMode::Wall,
    }
}

#[test]
fn cell_counts_follow_viewport() {
    let grid = GridOptions::default();
    for (width, height) in [
        (320.0, 568.0),
        (600.0, 900.0),
        (601.0, 900.0),
        (1280.0, 800.0),
        (1920.0, 1080.0),
        (2560.0, 1440.0),
    ] {
        let geometry = GridGeometry::compute(width, height, &grid, GridMode::Wall);
        let (cell, gap) = if width <= 600.0 {
            (80.0, 51.0)
        } else {
            (120.0, 91.0)
        };
        let cols = (width / (cell + gap)).ceil() as usize * 3;
        let rows = (height / (cell + gap)).ceil() as usize * 3;
        assert_eq!(geometry.cols, cols, "cols at {width}x{height}");
        assert_eq!(geometry.rows, rows, "rows at {width}x{height}");
        assert_eq!(geometry.cell_count(), cols * rows);
        assert_eq!(
            geometry.content_width,
            cols as f64 * cell + (cols - 1) as f64 * gap
        );
        assert_eq!(
            geometry.content_height,
            rows as f64 * cell + (rows - 1) as f64 * gap
        );
    }
}

#[test]
fn initial_scroll_centers_content() {
    let grid = GridOptions::default();
    let images = images(5);
    let mut rng = StdRng::seed_from_u64(7);
    let layout = build_grid(&request(1280.0, 800.0, &images, &grid), &mut rng);
    let geometry = layout.geometry();
    let (x, y) = layout.initial_scroll();
    assert_eq!(x, (geometry.content_width - 1280.0) / 2.0);
    assert_eq!(y, (geometry.content_height - 800.0) / 2.0);
    assert_eq!(layout.viewport(1280.0, 800.0).offset(), (x, y));
}

#[test]
fn shuffle_is_a_permutation() {
    let mut input = images(12);
    input.push(input[3].clone());
    let mut rng = StdRng::seed_from_u64(99);
    let mut out = shuffled(&input, &mut rng);
    assert_eq!(out.len(), input.len());
    let mut sorted = input.clone();
    sorted.sort();
    out.sort();
    assert_eq!(out, sorted);
}

#[test]
fn every_cell_indexes_the_shuffled_list() {
    let grid = GridOptions::default();
    let images = images(4);
    let mut rng = StdRng::seed_from_u64(3);
    let layout = build_grid(&request(1280.0, 800.0, &images, &grid), &mut rng);
    assert_eq!(layout.cells().len(), layout.geometry().cell_count());
    assert!(layout.cells().iter().all(|c| c.image < layout.images().len()));
    for (idx, cell) in layout.cells().iter().enumerate() {
        assert_eq!(cell.id.0, idx);
        assert_eq!(idx, cell.row * layout.geometry().cols + cell.col);
    }
    assert!(!layout.uses_placeholders());
}

#[test]
fn empty_list_falls_back_to_placeholders() {
    let grid = GridOptions::default();
    let mut rng = StdRng::seed_from_u64(5);
    let layout = build_grid(&request(1280.0, 800.0, &[], &grid), &mut rng);
    assert!(layout.uses_placeholders());
    assert_eq!(layout.images().len(), PLACEHOLDER_IMAGES.len());

    let custom = images(2);
    let mut req = request(1280.0, 800.0, &[], &grid);
    req.placeholders = &custom;
    let layout = build_grid(&req, &mut rng);
    assert!(layout.uses_placeholders());
    assert_eq!(layout.images().len(), 2);
}

#[test]
fn same_seed_same_layout() {
    let grid = GridOptions::default();
    let images = images(9);
    let a = build_grid(
        &request(1024.0, 768.0, &images, &grid),
        &mut StdRng::seed_from_u64(21),
    );
    let b = build_grid(
        &request(1024.0, 768.0, &images, &grid),
        &mut StdRng::seed_from_u64(21),
    );
    assert_eq!(a.images(), b.images());
    assert_eq!(a.cells(), b.cells());
}
