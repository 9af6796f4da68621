use std::time::Instant;

use wall_config::SnapOptions;

use crate::events::CellId;
use crate::layout::GridLayout;
use crate::scheduler::{Flow, FrameStep};
use crate::viewport::ViewportState;

/// Index and value of the center closest to `target`. Ties keep the first one.
pub fn nearest_to_center<I>(centers: I, target: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64, f64)> = None;
    for (idx, center) in centers.into_iter().enumerate() {
        let dist = (target - center).abs();
        if best.is_none_or(|(_, _, min)| dist < min) {
            best = Some((idx, center, dist));
        }
    }
    best.map(|(idx, center, _)| (idx, center))
}

/// Eases the scroll offset toward a fixed target.
#[derive(Debug, Clone, PartialEq)]
pub struct Snap {
    target: (f64, f64),
    easing: f64,
    epsilon: f64,
}

impl Snap {
    /// Snap toward `target`, clamped to what `viewport` can actually reach.
    pub fn toward(target: (f64, f64), viewport: &ViewportState, options: &SnapOptions) -> Self {
        let (max_x, max_y) = viewport.max_scroll();
        Self {
            target: (target.0.clamp(0.0, max_x), target.1.clamp(0.0, max_y)),
            easing: options.easing,
            epsilon: options.epsilon,
        }
    }

    /// Horizontal snap bringing the cell nearest the viewport center onto it.
    pub fn to_center(
        layout: &GridLayout,
        viewport: &ViewportState,
        options: &SnapOptions,
    ) -> Option<(CellId, Self)> {
        let geometry = layout.geometry();
        let (center_x, _) = viewport.center();
        let centers = layout
            .cells()
            .iter()
            .map(|cell| geometry.screen_center(cell, viewport).0);
        let (idx, cell_center) = nearest_to_center(centers, center_x)?;
        let target_x = viewport.scroll_x() + (cell_center - center_x);
        let snap = Self::toward((target_x, viewport.scroll_y()), viewport, options);
        Some((layout.cells()[idx].id, snap))
    }

    pub fn target(&self) -> (f64, f64) {
        self.target
    }
}

impl FrameStep<ViewportState> for Snap {
    fn step(&mut self, viewport: &mut ViewportState, _now: Instant) -> Flow {
        let (x, y) = viewport.offset();
        let dx = self.target.0 - x;
        let dy = self.target.1 - y;
        let far = dx.abs() > self.epsilon || dy.abs() > self.epsilon;
        if far && viewport.scroll_to(x + dx * self.easing, y + dy * self.easing) {
            return Flow::Continue;
        }
        viewport.scroll_to(self.target.0, self.target.1);
        Flow::Done
    }
}
