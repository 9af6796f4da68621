//! The wall engine: grid, viewport and every animation behind one value.
//!
//! Hosts feed it pointer events through [`Wall::pointer`] and call
//! [`Wall::frame`] once per display frame. Input is applied as it arrives; the
//! frame then steps momentum or snap, runs the scale loop against the updated
//! viewport, and advances the edge-stretch timers.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::color::BackgroundColor;
use crate::config::Configuration;
use crate::edge::EdgeStretch;
use crate::events::{CellId, Device, PointerEvent, PointerPhase, PointerTarget};
use crate::image_ref::ImageRef;
use crate::interaction::{DragStart, DragTrack, InteractionMode, InteractionState};
use crate::layout::{GridLayout, LayoutRequest, build_grid};
use crate::parallax::{
    PassSummary, RenderContext, ScaleLoop, displayed_scale, displayed_z_order, highlight_center,
    render_pass,
};
use crate::scheduler::{TaskIds, TaskSlot};
use crate::snap::Snap;
use crate::sources::ImageSource;
use crate::viewport::ViewportState;
use wall_config::ScaleSuppression;

/// Outbound hook fired when a cell is clicked.
pub trait CellActivation {
    fn on_cell_activated(&mut self, image: &ImageRef);
}

impl<F> CellActivation for F
where
    F: FnMut(&ImageRef),
{
    fn on_cell_activated(&mut self, image: &ImageRef) {
        self(image)
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    /// Pointer went down on a cell; a matching up activates it.
    Pressed(CellId),
    DragStarted { cancelled: InteractionMode },
    Dragged { moved: bool },
    Released(InteractionMode),
    Activated(CellId),
    Hover(CellId, bool),
}

/// Per-frame summary for hosts and traces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrameReport {
    pub frame: u64,
    pub mode: InteractionMode,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// The viewport offset changed during this frame's motion step.
    pub moved: bool,
    /// A render pass ran this frame.
    pub rendered: bool,
    pub suppressed: bool,
    pub edge_translation: f64,
}

/// Snapshot of one cell as a painter would draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CellVisual {
    pub id: CellId,
    pub row: usize,
    pub col: usize,
    /// Resolved `src`, or `None` when the cell paints the background colour.
    pub src: Option<String>,
    pub screen_x: f64,
    pub screen_y: f64,
    pub scale: f64,
    pub z_order: Option<i32>,
    pub hovered: bool,
    pub focused: bool,
}

pub struct Wall {
    config: Configuration,
    images: Vec<String>,
    background: BackgroundColor,
    rng: StdRng,
    layout: GridLayout,
    viewport: ViewportState,
    interaction: InteractionState,
    ids: TaskIds,
    scale_loop: TaskSlot<ScaleLoop>,
    edge: EdgeStretch,
    /// Raised by a touch on a narrow viewport until the touch ends.
    touch_suppress: bool,
    pressed: Option<CellId>,
    activation: Option<Box<dyn CellActivation>>,
    frames: u64,
}

fn layout_for(
    config: &Configuration,
    images: &[String],
    background: BackgroundColor,
    width: f64,
    height: f64,
    rng: &mut StdRng,
) -> GridLayout {
    let request = LayoutRequest {
        viewport_width: width,
        viewport_height: height,
        images,
        placeholders: &config.placeholder_images,
        background,
        grid: &config.grid,
        mode: config.mode,
    };
    build_grid(&request, rng)
}

impl Wall {
    /// Builds a wall from `source`, seeding the RNG from `layout-seed` when set.
    pub fn new(config: Configuration, source: &dyn ImageSource, width: f64, height: f64) -> Self {
        let rng = match config.layout_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let background = BackgroundColor::resolve(&source.background_color());
        Self::with_rng(config, source.images(), background, width, height, rng)
    }

    pub fn with_rng(
        config: Configuration,
        images: Vec<String>,
        background: BackgroundColor,
        width: f64,
        height: f64,
        mut rng: StdRng,
    ) -> Self {
        let layout = layout_for(&config, &images, background, width, height, &mut rng);
        let viewport = layout.viewport(width, height);
        let edge = EdgeStretch::new(config.edge_stretch.clone());
        let mut wall = Self {
            config,
            images,
            background,
            rng,
            layout,
            viewport,
            interaction: InteractionState::default(),
            ids: TaskIds::default(),
            scale_loop: TaskSlot::default(),
            edge,
            touch_suppress: false,
            pressed: None,
            activation: None,
            frames: 0,
        };
        wall.settle_visuals();
        wall
    }

    pub fn set_cell_activation<H>(&mut self, handler: H)
    where
        H: CellActivation + 'static,
    {
        self.activation = Some(Box::new(handler));
    }

    /// Rebuilds the grid for the current viewport size and image list.
    pub fn rebuild(&mut self) {
        let cancelled = self.interaction.cancel();
        self.scale_loop.cancel();
        self.edge.cancel();
        self.pressed = None;

        self.layout = layout_for(
            &self.config,
            &self.images,
            self.background,
            self.viewport.width(),
            self.viewport.height(),
            &mut self.rng,
        );
        self.viewport = self
            .layout
            .viewport(self.viewport.width(), self.viewport.height());
        self.settle_visuals();
        info!(
            ?cancelled,
            width = self.viewport.width(),
            height = self.viewport.height(),
            "wall rebuilt"
        );
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = ViewportState::new(width, height, 0.0, 0.0);
        self.rebuild();
    }

    pub fn set_images(&mut self, images: Vec<String>) {
        self.images = images;
        self.rebuild();
    }

    /// Background changes repaint fallback cells without rebuilding.
    pub fn set_background(&mut self, color: &str) {
        self.background = BackgroundColor::resolve(color);
        self.layout.set_background(self.background);
    }

    /// Re-reads images and background from `source` and rebuilds.
    pub fn reload(&mut self, source: &dyn ImageSource) {
        self.background = BackgroundColor::resolve(&source.background_color());
        self.set_images(source.images());
    }

    fn settle_visuals(&mut self) -> PassSummary {
        let suppressed = self.is_suppressed();
        let summary = render_pass(
            &mut self.layout,
            &self.viewport,
            &self.config.parallax,
            suppressed,
        );
        let centered = highlight_center(&mut self.layout, &self.viewport);
        debug!(focused = summary.focused, centered, "initial render pass");
        summary
    }

    /// Whether render passes currently reset cells instead of scaling them.
    pub fn is_suppressed(&self) -> bool {
        if self.touch_suppress {
            return true;
        }
        match self.interaction.mode() {
            InteractionMode::Idle => false,
            InteractionMode::Dragging => true,
            InteractionMode::Momentum | InteractionMode::Snapping => {
                self.config.parallax.suppression == ScaleSuppression::Motion
            }
        }
    }

    pub fn pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event),
            PointerPhase::Move => {
                let moved = self.interaction.drag_move(&event, &mut self.viewport);
                if moved {
                    self.on_scroll(event.at);
                }
                if self.interaction.mode() == InteractionMode::Dragging {
                    PointerOutcome::Dragged { moved }
                } else {
                    PointerOutcome::Ignored
                }
            }
            PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => self.pointer_release(event),
            PointerPhase::Over | PointerPhase::Out => {
                let PointerTarget::Cell(id) = event.target else {
                    return PointerOutcome::Ignored;
                };
                let hovered = event.phase == PointerPhase::Over;
                match self.layout.cell_mut(id) {
                    Some(cell) => {
                        cell.hovered = hovered;
                        PointerOutcome::Hover(id, hovered)
                    }
                    None => PointerOutcome::Ignored,
                }
            }
        }
    }

    fn pointer_down(&mut self, event: PointerEvent) -> PointerOutcome {
        if event.device == Device::Touch && self.config.grid.is_narrow(self.viewport.width()) {
            self.touch_suppress = true;
        }

        let track = DragTrack::from(self.config.mode);
        match self.interaction.begin_drag(track, &event, &self.viewport) {
            DragStart::OnCell => {
                let PointerTarget::Cell(id) = event.target else {
                    return PointerOutcome::Ignored;
                };
                self.pressed = Some(id);
                PointerOutcome::Pressed(id)
            }
            DragStart::Started { cancelled } => {
                self.pressed = None;
                // Reset scales right away rather than waiting for the next frame.
                render_pass(&mut self.layout, &self.viewport, &self.config.parallax, true);
                self.keep_scale_loop_until(event.at + self.config.scale_loop.scroll_debounce);
                PointerOutcome::DragStarted { cancelled }
            }
        }
    }

    fn pointer_release(&mut self, event: PointerEvent) -> PointerOutcome {
        if event.device == Device::Touch && event.phase != PointerPhase::Leave {
            self.touch_suppress = false;
        }
        let pressed = self.pressed.take();

        if self.interaction.mode() == InteractionMode::Dragging {
            let mode = self.interaction.release(
                &mut self.ids,
                &self.layout,
                &self.viewport,
                &self.config.momentum,
                &self.config.snap,
            );
            self.edge.schedule_check(&mut self.ids, event.at);
            let grace = match mode {
                InteractionMode::Idle => self.config.scale_loop.settle_delay,
                _ => self.config.scale_loop.scroll_debounce,
            };
            self.keep_scale_loop_until(event.at + grace);
            return PointerOutcome::Released(mode);
        }

        match (event.phase, event.target, pressed) {
            (PointerPhase::Up, PointerTarget::Cell(id), Some(down)) if id == down => {
                self.activate(id);
                PointerOutcome::Activated(id)
            }
            _ => PointerOutcome::Ignored,
        }
    }

    /// Fires the activation hook for `id`. Cells without a usable image are skipped.
    pub fn activate(&mut self, id: CellId) -> Option<ImageRef> {
        let Some(image) = self.layout.image_ref(id).cloned() else {
            warn!(?id, "activated cell has no usable image");
            return None;
        };
        debug!(?id, src = %image.src(), "cell activated");
        if let Some(handler) = self.activation.as_mut() {
            handler.on_cell_activated(&image);
        }
        Some(image)
    }

    /// Eases the cell nearest the horizontal center onto it, cancelling other motion.
    pub fn snap_to_center(&mut self, now: Instant) -> Option<CellId> {
        let (cell, snap) = Snap::to_center(&self.layout, &self.viewport, &self.config.snap)?;
        let cancelled = self.interaction.start_snap(&mut self.ids, snap);
        debug!(?cell, ?cancelled, "snap to center");
        self.keep_scale_loop_until(now + self.config.scale_loop.scroll_debounce);
        Some(cell)
    }

    fn on_scroll(&mut self, now: Instant) {
        self.keep_scale_loop_until(now + self.config.scale_loop.scroll_debounce);
        if self.interaction.mode() != InteractionMode::Dragging {
            self.edge.check(&mut self.ids, &self.viewport, now);
        }
    }

    fn keep_scale_loop_until(&mut self, deadline: Instant) {
        match self.scale_loop.get_mut() {
            Some(scale_loop) => scale_loop.keep_until(deadline),
            None => {
                self.scale_loop
                    .start(self.ids.spawn(ScaleLoop::until(deadline)));
            }
        }
    }

    pub fn frame(&mut self, now: Instant) -> FrameReport {
        self.frames += 1;

        let step = self.interaction.step(&mut self.viewport, now);
        if step.moved {
            self.on_scroll(now);
        }
        if step.finished.is_some() {
            self.keep_scale_loop_until(now + self.config.scale_loop.settle_delay);
        }

        let suppressed = self.is_suppressed();
        let rendered = self.scale_loop.is_running();
        let mut ctx = RenderContext {
            layout: &mut self.layout,
            viewport: &self.viewport,
            options: &self.config.parallax,
            suppressed,
            motion_active: self.interaction.is_animating(),
        };
        if let Some(done) = self.scale_loop.tick(&mut ctx, now) {
            debug!(passes = done.body().passes(), "scale loop stopped");
        }

        self.edge.tick(&mut self.ids, &self.viewport, now);

        FrameReport {
            frame: self.frames,
            mode: self.interaction.mode(),
            scroll_x: self.viewport.scroll_x(),
            scroll_y: self.viewport.scroll_y(),
            moved: step.moved,
            rendered,
            suppressed,
            edge_translation: self.edge.translation(),
        }
    }

    /// Nothing left to animate.
    pub fn is_settled(&self) -> bool {
        self.interaction.mode() == InteractionMode::Idle
            && !self.scale_loop.is_running()
            && !self.edge.is_active()
            && !self.edge.has_pending_check()
    }

    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn background(&self) -> BackgroundColor {
        self.background
    }

    /// Images the wall was built from, before shuffling.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn scale_loop_running(&self) -> bool {
        self.scale_loop.is_running()
    }

    pub fn edge_translation(&self) -> f64 {
        self.edge.translation()
    }

    pub fn visuals(&self) -> Vec<CellVisual> {
        let geometry = self.layout.geometry();
        let options = &self.config.parallax;
        self.layout
            .cells()
            .iter()
            .map(|cell| {
                let (screen_x, screen_y) = geometry.screen_center(cell, &self.viewport);
                CellVisual {
                    id: cell.id,
                    row: cell.row,
                    col: cell.col,
                    src: self
                        .layout
                        .image_ref(cell.id)
                        .map(|image| image.src().into_owned()),
                    screen_x,
                    screen_y,
                    scale: displayed_scale(cell, options),
                    z_order: displayed_z_order(cell, options),
                    hovered: cell.hovered,
                    focused: cell.focused,
                }
            })
            .collect()
    }
}
