//! Drives a [`Wall`] from a scripted gesture sequence.
//!
//! [`simulate`] steps frames back to back on a synthetic clock; [`run`] paces
//! them with a tokio interval until the script is done or it is cancelled.

use std::iter::Peekable;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::select;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{Device, PointerEvent, PointerPhase, PointerTarget};
use crate::wall::{FrameReport, Wall};

/// Upper bound on frames produced for one script.
pub const MAX_FRAMES: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScriptedPointer {
    /// Offset from the start of the replay.
    pub at_ms: u64,
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_target")]
    pub target: PointerTarget,
    #[serde(default = "default_device")]
    pub device: Device,
}

fn default_target() -> PointerTarget {
    PointerTarget::Background
}

fn default_device() -> Device {
    Device::Mouse
}

impl ScriptedPointer {
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }

    pub fn event(&self, start: Instant) -> PointerEvent {
        PointerEvent::new(self.phase, self.x, self.y, start + self.offset())
            .on(self.target)
            .with_device(self.device)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GestureScript {
    pub steps: Vec<ScriptedPointer>,
}

impl GestureScript {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let mut script: Self = serde_json::from_str(s)?;
        script.steps.sort_by_key(|step| step.at_ms);
        Ok(script)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Offset of the last scripted event.
    pub fn duration(&self) -> Duration {
        self.steps.last().map_or(Duration::ZERO, ScriptedPointer::offset)
    }
}

/// Feeds every step due at `elapsed` and returns how many were applied.
fn feed_due<'a, I>(
    wall: &mut Wall,
    steps: &mut Peekable<I>,
    start: Instant,
    elapsed: Duration,
) -> usize
where
    I: Iterator<Item = &'a ScriptedPointer>,
{
    let mut fed = 0;
    while let Some(step) = steps.next_if(|step| step.offset() <= elapsed) {
        let outcome = wall.pointer(step.event(start));
        debug!(at_ms = step.at_ms, phase = ?step.phase, ?outcome, "replayed pointer");
        fed += 1;
    }
    fed
}

/// Replays `script` on a synthetic clock, one frame every `frame_interval`,
/// until the script is exhausted and the wall has settled.
pub fn simulate(
    wall: &mut Wall,
    script: &GestureScript,
    frame_interval: Duration,
    start: Instant,
) -> Vec<FrameReport> {
    let mut steps = script.steps.iter().peekable();
    let mut trace = Vec::new();
    let mut elapsed = Duration::ZERO;
    loop {
        feed_due(wall, &mut steps, start, elapsed);
        trace.push(wall.frame(start + elapsed));
        if steps.peek().is_none() && wall.is_settled() {
            break;
        }
        if trace.len() >= MAX_FRAMES {
            warn!(frames = trace.len(), "replay did not settle");
            break;
        }
        elapsed += frame_interval;
    }
    info!(
        frames = trace.len(),
        events = script.steps.len(),
        "simulated replay finished"
    );
    trace
}

/// Replays `script` in real time. Stops early when `cancel` fires.
pub async fn run<F>(
    wall: &mut Wall,
    script: &GestureScript,
    frame_interval: Duration,
    cancel: CancellationToken,
    mut on_frame: F,
) -> Vec<FrameReport>
where
    F: FnMut(&FrameReport),
{
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut steps = script.steps.iter().peekable();
    let mut trace = Vec::new();
    let start = Instant::now();
    loop {
        select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(frames = trace.len(), "replay cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        let now = Instant::now();
        feed_due(wall, &mut steps, start, now.saturating_duration_since(start));
        let report = wall.frame(now);
        on_frame(&report);
        trace.push(report);

        if steps.peek().is_none() && wall.is_settled() {
            break;
        }
        if trace.len() >= MAX_FRAMES {
            warn!(frames = trace.len(), "replay did not settle");
            break;
        }
    }
    info!(frames = trace.len(), "replay finished");
    trace
}
