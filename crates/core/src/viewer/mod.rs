//! Interactive image viewer.
//!
//! A full-screen overlay showing one image with zoom, pan, reset and close
//! controls. The viewer is modeled as a small state machine (`Idle` /
//! `Dragging`) over a [`ViewportTransform`], so its behavior can be driven
//! and tested without a pointer device. Frontends translate their input
//! events into [`ViewerEvent`]s and render from [`ImageViewer::render`].

pub mod listeners;
pub mod script;

use std::ops::Sub;

use serde::Serialize;

use crate::api::AnalyzeResponse;

pub use listeners::{ListenerHandle, ListenerKind, ListenerRegistry};

/// Lower zoom bound.
pub const MIN_SCALE: f64 = 0.2;
/// Upper zoom bound.
pub const MAX_SCALE: f64 = 5.0;
/// Multiplicative step for discrete zoom.
pub const ZOOM_FACTOR: f64 = 1.2;
/// Scale change per unit of wheel `deltaY`. Negative: scrolling forward zooms out.
pub const WHEEL_SENSITIVITY: f64 = -0.01;

/// File name the backend gives the whole-method control-flow graph.
pub const MAIN_GRAPH_IMAGE: &str = "output.png";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Scale and pan offset of the displayed image.
///
/// `scale` always lies in `[MIN_SCALE, MAX_SCALE]`; `offset` is unconstrained
/// so the image can be panned past the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset: Point,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform { scale: 1.0, offset: Point::ORIGIN };

    pub fn zoomed(self, direction: ZoomDirection) -> Self {
        let scale = match direction {
            ZoomDirection::In => self.scale * ZOOM_FACTOR,
            ZoomDirection::Out => self.scale / ZOOM_FACTOR,
        };
        Self { scale: clamp_scale(scale), ..self }
    }

    /// Non-finite deltas leave the transform unchanged.
    pub fn wheeled(self, delta_y: f64) -> Self {
        if !delta_y.is_finite() {
            return self;
        }
        Self { scale: clamp_scale(self.scale + delta_y * WHEEL_SENSITIVITY), ..self }
    }

    /// CSS transform. Translation is expressed in pre-scale units so panning
    /// moves the image by the same screen distance at any zoom level.
    pub fn css(&self) -> String {
        format!(
            "scale({}) translate({}px, {}px)",
            self.scale,
            self.offset.x / self.scale,
            self.offset.y / self.scale
        )
    }

    /// Zoom percentage as shown in the control bar.
    pub fn zoom_label(&self) -> String {
        format!("{}%", (self.scale * 100.0).round())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
}

/// Element a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed area around the image frame.
    Backdrop,
    /// The image frame, including the image itself.
    Image,
    /// The control bar (its buttons are separate targets).
    ControlBar,
    ZoomInButton,
    ZoomOutButton,
    ResetButton,
    CloseButton,
}

/// Active pan gesture. `anchor` is the pointer position minus the offset at
/// drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub anchor: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    Zoom(ZoomDirection),
    Wheel { delta_y: f64 },
    Reset,
    PointerDown { button: PointerButton, at: Point },
    PointerMove { at: Point },
    /// Pointer released anywhere in the document.
    PointerUp,
    Key(Key),
    Click(ClickTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerResponse {
    Continue,
    /// The viewer asked to be closed; the host should call [`ImageViewer::close`].
    Close,
}

/// Optional sizing metadata supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageHint {
    pub aspect_ratio: Option<f64>,
}

impl ImageHint {
    pub fn from_aspect_ratio(ratio: f64) -> Self {
        Self { aspect_ratio: (ratio.is_finite() && ratio > 0.0).then_some(ratio) }
    }

    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height == 0 {
            return Self::default();
        }
        Self::from_aspect_ratio(f64::from(width) / f64::from(height))
    }

    /// Look up the hint for an image shown from an analysis result.
    ///
    /// The main graph (`output.png`) uses `all_image_aspect_ratio`; per-path
    /// images match on `image_url` suffix. A per-path image with no ratio
    /// counts as square.
    pub fn from_analysis(src: &str, analysis: &AnalyzeResponse) -> Self {
        if src.ends_with(MAIN_GRAPH_IMAGE) {
            return Self {
                aspect_ratio: analysis.all_image_aspect_ratio.as_ref().and_then(|r| r.value()),
            };
        }
        match analysis.paths.iter().find(|p| src.ends_with(p.image_url.as_str())) {
            Some(path) => Self {
                aspect_ratio: Some(path.aspect_ratio.as_ref().and_then(|r| r.value()).unwrap_or(1.0)),
            },
            None => Self::default(),
        }
    }
}

/// Bounding constraints for the displayed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageStyle {
    pub max_width: &'static str,
    pub max_height: &'static str,
    pub aspect_ratio: Option<String>,
}

impl ImageStyle {
    /// Very wide images get more horizontal room and less vertical room.
    pub fn for_hint(hint: &ImageHint) -> Self {
        match hint.aspect_ratio {
            Some(ratio) if ratio > 2.0 => Self {
                max_width: "95%",
                max_height: "80vh",
                aspect_ratio: Some(ratio.to_string()),
            },
            Some(ratio) => Self {
                max_width: "90%",
                max_height: "90vh",
                aspect_ratio: Some(ratio.to_string()),
            },
            None => Self { max_width: "90%", max_height: "90vh", aspect_ratio: None },
        }
    }
}

/// Everything a frontend needs to draw the current frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedImage {
    pub src: String,
    pub transform: String,
    pub transition: &'static str,
    pub cursor: &'static str,
    pub zoom_label: String,
    pub style: ImageStyle,
}

/// An open image viewer.
///
/// Holds its global listener registrations for as long as it lives; closing
/// (or dropping) the viewer releases them.
#[derive(Debug)]
pub struct ImageViewer {
    src: String,
    hint: ImageHint,
    transform: ViewportTransform,
    drag: DragState,
    listeners: Vec<ListenerHandle>,
}

impl ImageViewer {
    /// Open a viewer for `src`. An empty reference opens nothing.
    pub fn open(
        src: impl Into<String>,
        hint: ImageHint,
        registry: &ListenerRegistry,
    ) -> Option<ImageViewer> {
        let src = src.into();
        if src.is_empty() {
            return None;
        }
        let listeners = [ListenerKind::KeyDown, ListenerKind::PointerUp, ListenerKind::Wheel]
            .into_iter()
            .map(|kind| registry.register(kind))
            .collect();
        tracing::debug!(%src, "image viewer opened");
        Some(ImageViewer {
            src,
            hint,
            transform: ViewportTransform::IDENTITY,
            drag: DragState::Idle,
            listeners,
        })
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging(_))
    }

    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.transform = self.transform.zoomed(direction);
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.transform = self.transform.wheeled(delta_y);
    }

    pub fn reset(&mut self) {
        self.transform = ViewportTransform::IDENTITY;
        self.drag = DragState::Idle;
    }

    pub fn pointer_down(&mut self, button: PointerButton, at: Point) {
        if button == PointerButton::Primary && at.is_finite() {
            self.drag = DragState::Dragging(DragSession { anchor: at - self.transform.offset });
        }
    }

    pub fn pointer_move(&mut self, at: Point) {
        if !at.is_finite() {
            return;
        }
        if let DragState::Dragging(session) = self.drag {
            self.transform.offset = at - session.anchor;
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Feed one input event through the state machine.
    pub fn handle(&mut self, event: ViewerEvent) -> ViewerResponse {
        match event {
            ViewerEvent::Zoom(direction) => self.zoom(direction),
            ViewerEvent::Wheel { delta_y } => self.wheel(delta_y),
            ViewerEvent::Reset => self.reset(),
            ViewerEvent::PointerDown { button, at } => self.pointer_down(button, at),
            ViewerEvent::PointerMove { at } => self.pointer_move(at),
            ViewerEvent::PointerUp => self.pointer_up(),
            ViewerEvent::Key(key) => return self.key(key),
            ViewerEvent::Click(target) => return self.click(target),
        }
        ViewerResponse::Continue
    }

    fn key(&mut self, key: Key) -> ViewerResponse {
        match key {
            Key::Escape => return ViewerResponse::Close,
            Key::Char('+') | Key::Char('=') => self.zoom(ZoomDirection::In),
            Key::Char('-') => self.zoom(ZoomDirection::Out),
            Key::Char('0') => self.reset(),
            Key::Char(_) => {}
        }
        ViewerResponse::Continue
    }

    fn click(&mut self, target: ClickTarget) -> ViewerResponse {
        match target {
            ClickTarget::Backdrop | ClickTarget::CloseButton => return ViewerResponse::Close,
            // Clicks on the frame and control bar stop here.
            ClickTarget::Image | ClickTarget::ControlBar => {}
            ClickTarget::ZoomInButton => self.zoom(ZoomDirection::In),
            ClickTarget::ZoomOutButton => self.zoom(ZoomDirection::Out),
            ClickTarget::ResetButton => self.reset(),
        }
        ViewerResponse::Continue
    }

    pub fn render(&self) -> RenderedImage {
        let dragging = self.is_dragging();
        RenderedImage {
            src: self.src.clone(),
            transform: self.transform.css(),
            transition: if dragging { "none" } else { "transform 0.1s ease-out" },
            cursor: if dragging { "grabbing" } else { "grab" },
            zoom_label: self.transform.zoom_label(),
            style: ImageStyle::for_hint(&self.hint),
        }
    }

    /// Close the viewer, releasing its listeners. The transform is discarded.
    pub fn close(self) {
        tracing::debug!(src = %self.src, listeners = self.listeners.len(), "image viewer closed");
    }
}
