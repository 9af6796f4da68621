/// Where the grid sits inside its scroll container.
///
/// Every scroll mutation goes through [`ViewportState::scroll_to`], which keeps
/// the offsets inside `[0, content - viewport]` the way a native scroll
/// container clamps `scrollLeft`/`scrollTop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    scroll_x: f64,
    scroll_y: f64,
    width: f64,
    height: f64,
    content_width: f64,
    content_height: f64,
}

impl ViewportState {
    pub fn new(width: f64, height: f64, content_width: f64, content_height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: width.max(0.0),
            height: height.max(0.0),
            content_width: content_width.max(0.0),
            content_height: content_height.max(0.0),
        }
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn content_size(&self) -> (f64, f64) {
        (self.content_width, self.content_height)
    }

    pub fn max_scroll(&self) -> (f64, f64) {
        (
            (self.content_width - self.width).max(0.0),
            (self.content_height - self.height).max(0.0),
        )
    }

    /// Viewport center in screen coordinates.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Half diagonal of the viewport.
    pub fn max_distance(&self) -> f64 {
        (self.width / 2.0).hypot(self.height / 2.0)
    }

    /// Moves to `(x, y)` after clamping. Returns whether the offset changed.
    pub fn scroll_to(&mut self, x: f64, y: f64) -> bool {
        let (max_x, max_y) = self.max_scroll();
        let x = if x.is_finite() { x.clamp(0.0, max_x) } else { self.scroll_x };
        let y = if y.is_finite() { y.clamp(0.0, max_y) } else { self.scroll_y };
        let changed = x != self.scroll_x || y != self.scroll_y;
        self.scroll_x = x;
        self.scroll_y = y;
        changed
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> bool {
        self.scroll_to(self.scroll_x + dx, self.scroll_y + dy)
    }

    pub fn at_left_edge(&self) -> bool {
        self.scroll_x <= 0.0
    }

    pub fn at_right_edge(&self, tolerance: f64) -> bool {
        self.scroll_x + self.width >= self.content_width - tolerance
    }
}
