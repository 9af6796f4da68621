use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Index of a cell inside the current [`GridLayout`](crate::layout::GridLayout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Device {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerTarget {
    /// The scroll container or the gaps between cells.
    Background,
    Cell(CellId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerPhase {
    /// Pointer-down or touch-start.
    Down,
    Move,
    /// Pointer-up or touch-end.
    Up,
    /// The pointer left the scroll container.
    Leave,
    /// Touch-cancel.
    Cancel,
    /// Hover entering a cell.
    Over,
    /// Hover leaving a cell.
    Out,
}

impl PointerPhase {
    /// Phases that end a gesture.
    pub fn is_release(self) -> bool {
        matches!(self, PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel)
    }
}

/// One pointer or touch sample in page coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub device: Device,
    pub target: PointerTarget,
    pub x: f64,
    pub y: f64,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f64, y: f64, at: Instant) -> Self {
        Self {
            phase,
            device: Device::Mouse,
            target: PointerTarget::Background,
            x,
            y,
            at,
        }
    }

    pub fn on(mut self, target: PointerTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }
}
