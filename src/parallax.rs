//! Focus/parallax scaling of cells around the viewport center.

use std::time::Instant;

use wall_config::{ParallaxOptions, ParallaxPolicy};

use crate::layout::{GridCell, GridLayout};
use crate::scheduler::{Flow, FrameStep};
use crate::viewport::ViewportState;

/// Cells whose horizontal center is closer than this to the viewport center are highlighted.
pub const CENTER_HIGHLIGHT_TOLERANCE: f64 = 10.0;

/// `min + (max - min) * (1 - t²)` for `t` in `[0, 1]`.
fn eased(t: f64, options: &ParallaxOptions) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let t = t * t;
    options.min_scale + (options.max_scale - options.min_scale) * (1.0 - t)
}

/// Global falloff: normalized, clamped and quadratically eased distance.
pub fn falloff_scale(dist: f64, max_dist: f64, options: &ParallaxOptions) -> f64 {
    let reach = max_dist * options.falloff_reach;
    let t = if reach > 0.0 {
        (dist / reach).min(1.0)
    } else if dist > 0.0 {
        1.0
    } else {
        0.0
    };
    eased(t, options)
}

fn stacking(scale: f64) -> Option<i32> {
    Some((scale * 100.0).round() as i32)
}

/// Scale actually displayed, with the hover emphasis composed on top.
pub fn displayed_scale(cell: &GridCell, options: &ParallaxOptions) -> f64 {
    if cell.hovered {
        cell.rendered_scale * options.hover_scale
    } else {
        cell.rendered_scale
    }
}

pub fn displayed_z_order(cell: &GridCell, options: &ParallaxOptions) -> Option<i32> {
    if cell.hovered {
        Some(options.hover_z_order)
    } else {
        cell.z_order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassSummary {
    /// Cells given a scale above the unfocused/reset value.
    pub focused: usize,
    pub suppressed: bool,
}

/// One render pass: recompute every cell's scale and stacking hint.
///
/// A suppressed pass resets every cell to scale 1.0 with default stacking.
pub fn render_pass(
    layout: &mut GridLayout,
    viewport: &ViewportState,
    options: &ParallaxOptions,
    suppressed: bool,
) -> PassSummary {
    if suppressed {
        layout.cells_mut().iter_mut().for_each(GridCell::reset_visual);
        return PassSummary {
            focused: 0,
            suppressed: true,
        };
    }

    let geometry = *layout.geometry();
    let (center_x, center_y) = viewport.center();
    let max_dist = viewport.max_distance();
    let distances: Vec<f64> = layout
        .cells()
        .iter()
        .map(|cell| {
            let (x, y) = geometry.screen_center(cell, viewport);
            (x - center_x).hypot(y - center_y)
        })
        .collect();

    let cells = layout.cells_mut();
    let focused = match options.policy {
        ParallaxPolicy::Falloff => {
            for (cell, dist) in cells.iter_mut().zip(&distances) {
                let scale = falloff_scale(*dist, max_dist, options);
                cell.rendered_scale = scale;
                cell.z_order = stacking(scale);
            }
            distances
                .iter()
                .filter(|d| falloff_scale(**d, max_dist, options) > options.min_scale)
                .count()
        }
        ParallaxPolicy::FocusBand => {
            let radius = options.focus_radius(max_dist);
            let mut band: Vec<(usize, f64)> = distances
                .iter()
                .copied()
                .enumerate()
                .filter(|(_, dist)| *dist < radius)
                .collect();
            band.sort_by(|a, b| a.1.total_cmp(&b.1));

            for cell in cells.iter_mut() {
                cell.rendered_scale = options.unfocused_scale;
                cell.z_order = None;
            }
            let steps = band.len().saturating_sub(1).max(1) as f64;
            for (rank, (idx, _)) in band.iter().enumerate() {
                let scale = eased(rank as f64 / steps, options);
                cells[*idx].rendered_scale = scale;
                cells[*idx].z_order = stacking(scale);
            }
            band.len()
        }
    };

    PassSummary {
        focused,
        suppressed: false,
    }
}

/// Flags the cells whose horizontal center sits on the viewport's horizontal center.
pub fn highlight_center(layout: &mut GridLayout, viewport: &ViewportState) -> usize {
    let geometry = *layout.geometry();
    let (center_x, _) = viewport.center();
    let mut count = 0;
    for cell in layout.cells_mut() {
        let (x, _) = geometry.screen_center(cell, viewport);
        cell.focused = (center_x - x).abs() < CENTER_HIGHLIGHT_TOLERANCE;
        count += usize::from(cell.focused);
    }
    count
}

/// Inputs the scale loop reads each frame.
pub struct RenderContext<'a> {
    pub layout: &'a mut GridLayout,
    pub viewport: &'a ViewportState,
    pub options: &'a ParallaxOptions,
    pub suppressed: bool,
    /// Momentum or snap is still moving the viewport.
    pub motion_active: bool,
}

/// The per-frame scale loop. Runs until its stop deadline passes, but never
/// while the viewport is still being animated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleLoop {
    stop_at: Instant,
    passes: u32,
}

impl ScaleLoop {
    pub fn until(stop_at: Instant) -> Self {
        Self { stop_at, passes: 0 }
    }

    /// Pushes the stop deadline out to `deadline` if it is later.
    pub fn keep_until(&mut self, deadline: Instant) {
        self.stop_at = self.stop_at.max(deadline);
    }

    pub fn stop_at(&self) -> Instant {
        self.stop_at
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }
}

impl FrameStep<RenderContext<'_>> for ScaleLoop {
    fn step(&mut self, ctx: &mut RenderContext<'_>, now: Instant) -> Flow {
        render_pass(ctx.layout, ctx.viewport, ctx.options, ctx.suppressed);
        self.passes += 1;
        Flow::continue_if(ctx.motion_active || now < self.stop_at)
    }
}
