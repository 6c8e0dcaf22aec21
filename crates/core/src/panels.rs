//! Three-column panel widths for the analysis view (tree | graph | paths).
//!
//! Widths are percentages of the container and always sum to 100.

pub const DEFAULT_LEFT: f64 = 33.33;
pub const DEFAULT_MIDDLE: f64 = 33.33;
pub const DEFAULT_RIGHT: f64 = 33.34;

pub const LEFT_MIN: f64 = 10.0;
pub const LEFT_MAX: f64 = 60.0;
pub const MIDDLE_MIN: f64 = 10.0;
pub const MIDDLE_MAX: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub left: f64,
    pub middle: f64,
    pub right: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self { left: DEFAULT_LEFT, middle: DEFAULT_MIDDLE, right: DEFAULT_RIGHT }
    }
}

impl PanelLayout {
    /// Convert a pointer x coordinate into a container percentage.
    pub fn percent_of(client_x: f64, container_left: f64, container_width: f64) -> Option<f64> {
        (container_width > 0.0).then(|| (client_x - container_left) / container_width * 100.0)
    }

    /// Move the left/middle divider to `position` percent. The right column keeps its width.
    pub fn drag_left(&mut self, position: f64) {
        self.left = position.clamp(LEFT_MIN, LEFT_MAX);
        self.middle = 100.0 - self.left - self.right;
    }

    /// Move the middle/right divider to `position` percent. The left column keeps its width.
    pub fn drag_middle(&mut self, position: f64) {
        self.middle = (position - self.left).clamp(MIDDLE_MIN, MIDDLE_MAX);
        self.right = 100.0 - self.left - self.middle;
    }

    /// Double-clicking a divider restores the default widths.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
