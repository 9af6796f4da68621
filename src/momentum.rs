use std::time::Instant;

use wall_config::MomentumOptions;

use crate::scheduler::{Flow, FrameStep};
use crate::viewport::ViewportState;

/// Inertial scroll seeded from the release velocity of a free drag.
///
/// Each frame subtracts the current speed from the scroll offset and then
/// multiplies the speed by the friction factor, until both axes are at or
/// below the stop threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Momentum {
    vx: f64,
    vy: f64,
    friction: f64,
    stop_threshold: f64,
}

impl Momentum {
    /// `velocity` is in px/ms as measured by the drag tracker.
    pub fn from_release(velocity: (f64, f64), options: &MomentumOptions) -> Self {
        Self {
            vx: velocity.0 * options.amplification,
            vy: velocity.1 * options.amplification,
            friction: options.friction,
            stop_threshold: options.stop_threshold,
        }
    }

    /// Current speed in px/frame.
    pub fn speed(&self) -> (f64, f64) {
        (self.vx, self.vy)
    }

    pub fn is_settled(&self) -> bool {
        self.vx.abs() <= self.stop_threshold && self.vy.abs() <= self.stop_threshold
    }
}

impl FrameStep<ViewportState> for Momentum {
    fn step(&mut self, viewport: &mut ViewportState, _now: Instant) -> Flow {
        viewport.scroll_by(-self.vx, -self.vy);
        self.vx *= self.friction;
        self.vy *= self.friction;
        Flow::continue_if(!self.is_settled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_viewport() -> ViewportState {
        let mut vp = ViewportState::new(100.0, 100.0, 1_000_000.0, 1_000_000.0);
        vp.scroll_to(500_000.0, 500_000.0);
        vp
    }

    #[test]
    fn decays_in_a_fixed_number_of_steps() {
        let options = MomentumOptions::default();
        let mut momentum = Momentum::from_release((10.0, 0.0), &options);
        assert_eq!(momentum.speed(), (200.0, 0.0));

        let mut vp = open_viewport();
        let start = vp.scroll_x();
        let now = Instant::now();
        let mut steps = 0;
        loop {
            steps += 1;
            if momentum.step(&mut vp, now) == Flow::Done {
                break;
            }
        }

        let expected_steps = ((0.5_f64 / 200.0).ln() / 0.92_f64.ln()).ceil() as u32;
        assert_eq!(steps, expected_steps);
        assert_eq!(steps, 72);

        // Dragging right scrolls left.
        let displacement = start - vp.scroll_x();
        let closed_form = 200.0 / (1.0 - 0.92);
        let tail = options.stop_threshold / (1.0 - options.friction);
        assert!(
            (closed_form - displacement).abs() <= tail,
            "displacement {displacement} too far from {closed_form}"
        );
        assert_eq!(vp.scroll_y(), 500_000.0);
    }

    #[test]
    fn slow_release_settles_after_one_step() {
        let mut momentum = Momentum::from_release((0.01, -0.01), &MomentumOptions::default());
        let mut vp = open_viewport();
        assert_eq!(momentum.step(&mut vp, Instant::now()), Flow::Done);
    }

    #[test]
    fn keeps_running_while_either_axis_moves() {
        let mut momentum = Momentum::from_release((0.0, 1.0), &MomentumOptions::default());
        let mut vp = open_viewport();
        assert_eq!(momentum.step(&mut vp, Instant::now()), Flow::Continue);
        assert!(vp.scroll_y() < 500_000.0);
    }
}
