use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

pub use grid::{CellMetrics, GridOptions};
pub use motion::{EdgeStretchOptions, MomentumOptions, SnapOptions};
pub use scale::{ParallaxOptions, ParallaxPolicy, ScaleLoopOptions, ScaleSuppression};

fn ensure_positive(value: f64, key: &str) -> Result<()> {
    ensure!(value.is_finite() && value > 0.0, "{} must be positive", key);
    Ok(())
}

mod grid {
    use super::*;

    /// Cell edge length and spacing for one breakpoint, in CSS pixels.
    #[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct CellMetrics {
        pub cell_size: f64,
        pub gap: f64,
    }

    impl CellMetrics {
        /// Distance between the origins of two neighbouring cells.
        pub fn pitch(&self) -> f64 {
            self.cell_size + self.gap
        }

        fn validate(&self, prefix: &str) -> Result<()> {
            ensure_positive(self.cell_size, &format!("{prefix}.cell-size"))?;
            ensure!(
                self.gap.is_finite() && self.gap >= 0.0,
                "{}.gap must be non-negative",
                prefix
            );
            Ok(())
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct GridOptions {
        /// Viewports at most this wide use the `narrow` metrics.
        pub narrow_breakpoint: f64,
        pub narrow: CellMetrics,
        pub wide: CellMetrics,
        /// Multiplier applied to the visible column/row counts.
        pub overscan: u32,
    }

    impl GridOptions {
        pub fn is_narrow(&self, viewport_width: f64) -> bool {
            viewport_width <= self.narrow_breakpoint
        }

        pub fn metrics_for(&self, viewport_width: f64) -> CellMetrics {
            if self.is_narrow(viewport_width) {
                self.narrow
            } else {
                self.wide
            }
        }

        pub fn validate(&self) -> Result<()> {
            ensure_positive(self.narrow_breakpoint, "grid.narrow-breakpoint")?;
            self.narrow.validate("grid.narrow")?;
            self.wide.validate("grid.wide")?;
            ensure!(self.overscan >= 1, "grid.overscan must be at least 1");
            Ok(())
        }
    }

    impl Default for GridOptions {
        fn default() -> Self {
            Self {
                narrow_breakpoint: 600.0,
                narrow: CellMetrics {
                    cell_size: 80.0,
                    gap: (30.0_f64 * 1.3 * 1.3).round(),
                },
                wide: CellMetrics {
                    cell_size: 120.0,
                    gap: (54.0_f64 * 1.3 * 1.3).round(),
                },
                overscan: 3,
            }
        }
    }
}

mod motion {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct MomentumOptions {
        /// Release velocity (px/ms) is multiplied by this to get px/frame.
        pub amplification: f64,
        /// Per-frame speed retention.
        pub friction: f64,
        /// Momentum ends once both axes are at or below this speed.
        pub stop_threshold: f64,
    }

    impl MomentumOptions {
        pub fn validate(&self) -> Result<()> {
            ensure_positive(self.amplification, "momentum.amplification")?;
            ensure!(
                self.friction.is_finite() && self.friction > 0.0 && self.friction < 1.0,
                "momentum.friction must be between 0 and 1 (exclusive)"
            );
            ensure_positive(self.stop_threshold, "momentum.stop-threshold")
        }
    }

    impl Default for MomentumOptions {
        fn default() -> Self {
            Self {
                amplification: 20.0,
                friction: 0.92,
                stop_threshold: 0.5,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct SnapOptions {
        /// Fraction of the remaining distance covered each frame.
        pub easing: f64,
        /// Remaining distance (px) at which the snap lands exactly.
        pub epsilon: f64,
    }

    impl SnapOptions {
        pub fn validate(&self) -> Result<()> {
            ensure!(
                self.easing.is_finite() && self.easing > 0.0 && self.easing <= 1.0,
                "snap.easing must be in (0, 1]"
            );
            ensure_positive(self.epsilon, "snap.epsilon")
        }
    }

    impl Default for SnapOptions {
        fn default() -> Self {
            Self {
                easing: 0.18,
                epsilon: 1.0,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct EdgeStretchOptions {
        pub enabled: bool,
        /// Translation applied toward the inside of the wall, in px.
        pub amount: f64,
        #[serde(with = "humantime_serde")]
        pub duration: Duration,
        /// Slack used when testing for the right-hand edge.
        pub edge_tolerance: f64,
        /// Delay between a drag ending and the follow-up edge check.
        #[serde(with = "humantime_serde")]
        pub release_delay: Duration,
    }

    impl EdgeStretchOptions {
        pub fn validate(&self) -> Result<()> {
            ensure!(
                self.amount.is_finite() && self.amount >= 0.0,
                "edge-stretch.amount must be non-negative"
            );
            ensure!(
                !self.duration.is_zero(),
                "edge-stretch.duration must be greater than zero"
            );
            ensure!(
                self.edge_tolerance.is_finite() && self.edge_tolerance >= 0.0,
                "edge-stretch.edge-tolerance must be non-negative"
            );
            Ok(())
        }
    }

    impl Default for EdgeStretchOptions {
        fn default() -> Self {
            Self {
                enabled: true,
                amount: 36.0,
                duration: Duration::from_millis(180),
                edge_tolerance: 2.0,
                release_delay: Duration::from_millis(10),
            }
        }
    }
}

mod scale {
    use super::*;

    /// How distance from the viewport center maps to a cell scale.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum ParallaxPolicy {
        /// Quadratic falloff applied to every cell.
        Falloff,
        /// Ranked falloff inside a band around the center; everything else
        /// shrinks to `unfocused-scale`.
        #[default]
        FocusBand,
    }

    /// When the render pass resets cells instead of scaling them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum ScaleSuppression {
        /// Only while a drag is being tracked.
        Dragging,
        /// Whenever the interaction is not idle.
        #[default]
        Motion,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct ParallaxOptions {
        pub policy: ParallaxPolicy,
        pub suppression: ScaleSuppression,
        pub min_scale: f64,
        pub max_scale: f64,
        /// Fraction of the half diagonal over which the falloff reaches `min-scale`.
        pub falloff_reach: f64,
        /// Focus band radius as a fraction of the half diagonal.
        pub focus_band: f64,
        /// Extra widening applied to `focus-band`.
        pub focus_spread: f64,
        pub unfocused_scale: f64,
        pub hover_scale: f64,
        pub hover_z_order: i32,
    }

    impl ParallaxOptions {
        /// Distance below which a cell belongs to the focus band.
        pub fn focus_radius(&self, max_dist: f64) -> f64 {
            max_dist * self.focus_band * self.focus_spread
        }

        pub fn validate(&self) -> Result<()> {
            ensure_positive(self.min_scale, "parallax.min-scale")?;
            ensure!(
                self.max_scale.is_finite() && self.max_scale >= self.min_scale,
                "parallax.max-scale must be at least parallax.min-scale"
            );
            ensure_positive(self.falloff_reach, "parallax.falloff-reach")?;
            ensure_positive(self.focus_band, "parallax.focus-band")?;
            ensure_positive(self.focus_spread, "parallax.focus-spread")?;
            ensure_positive(self.unfocused_scale, "parallax.unfocused-scale")?;
            ensure_positive(self.hover_scale, "parallax.hover-scale")
        }
    }

    impl Default for ParallaxOptions {
        fn default() -> Self {
            Self {
                policy: ParallaxPolicy::default(),
                suppression: ScaleSuppression::default(),
                min_scale: 1.0,
                max_scale: 1.5,
                falloff_reach: 0.45,
                focus_band: 0.3,
                focus_spread: 1.5,
                unfocused_scale: 0.8,
                hover_scale: 1.08,
                hover_z_order: 999,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct ScaleLoopOptions {
        /// Quiet period after the last scroll change before the loop stops.
        #[serde(with = "humantime_serde")]
        pub scroll_debounce: Duration,
        /// Grace period after momentum or snap finishes.
        #[serde(with = "humantime_serde")]
        pub settle_delay: Duration,
    }

    impl ScaleLoopOptions {
        pub fn validate(&self) -> Result<()> {
            ensure!(
                !self.scroll_debounce.is_zero(),
                "scale-loop.scroll-debounce must be greater than zero"
            );
            Ok(())
        }
    }

    impl Default for ScaleLoopOptions {
        fn default() -> Self {
            Self {
                scroll_debounce: Duration::from_millis(100),
                settle_delay: Duration::from_millis(200),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gaps_follow_breakpoints() {
        let grid = GridOptions::default();
        assert_eq!(grid.narrow.gap, 51.0);
        assert_eq!(grid.wide.gap, 91.0);
        assert_eq!(grid.metrics_for(600.0).cell_size, 80.0);
        assert_eq!(grid.metrics_for(601.0).cell_size, 120.0);
    }

    #[test]
    fn parses_durations_and_policy() {
        let yaml = r#"
policy: falloff
suppression: dragging
falloff-reach: 0.8
"#;
        let parallax: ParallaxOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parallax.policy, ParallaxPolicy::Falloff);
        assert_eq!(parallax.suppression, ScaleSuppression::Dragging);
        assert!((parallax.falloff_reach - 0.8).abs() < f64::EPSILON);
        assert!((parallax.max_scale - 1.5).abs() < f64::EPSILON);

        let yaml = r#"
scroll-debounce: 250ms
"#;
        let scale_loop: ScaleLoopOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scale_loop.scroll_debounce, Duration::from_millis(250));
        assert_eq!(scale_loop.settle_delay, Duration::from_millis(200));
    }

    #[test]
    fn rejects_friction_outside_unit_interval() {
        let momentum = MomentumOptions {
            friction: 1.0,
            ..MomentumOptions::default()
        };
        let err = momentum.validate().unwrap_err();
        assert!(err.to_string().contains("momentum.friction"));
    }

    #[test]
    fn rejects_inverted_scale_range() {
        let parallax = ParallaxOptions {
            min_scale: 1.2,
            max_scale: 1.0,
            ..ParallaxOptions::default()
        };
        assert!(parallax.validate().is_err());
    }
}
