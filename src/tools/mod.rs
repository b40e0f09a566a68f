use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::fill::flood_fill;
use crate::surface::{RasterSurface, Snapshot};

pub mod shapes;

use shapes::{DashPhase, Paint, StrokeStyle};

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 50;

/// Dash lengths for in-flight shape previews, MS-Paint style.
const PREVIEW_DASH: (f32, f32) = (10.0, 5.0);

/// The drawing tools available to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Pen,
    Rectangle,
    Circle,
    Fill,
    Eraser,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ToolKind::Pen => "pen",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Fill => "fill",
            ToolKind::Eraser => "eraser",
        };
        f.write_str(name)
    }
}

/// The active tool settings. Transient; replaced wholesale on tool switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub kind: ToolKind,
    /// Brush/line width in pixels, `MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE`.
    pub size: u32,
    pub color: Rgba,
}

impl Default for Tool {
    fn default() -> Self {
        Self { kind: ToolKind::Pen, size: 2, color: Rgba::BLACK }
    }
}

/// Extent clamps for interactively drawn shapes, bounding rendering cost when
/// the pointer moves fast. Product defaults; configurable per session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShapeLimits {
    /// Rectangle width/height are clamped to +-this many pixels.
    pub max_rect_extent: f32,
    pub max_circle_radius: f32,
}

impl Default for ShapeLimits {
    fn default() -> Self {
        Self { max_rect_extent: 400.0, max_circle_radius: 200.0 }
    }
}

/// One in-flight pointer gesture.
#[derive(Debug)]
struct Gesture {
    anchor: (f32, f32),
    last: (f32, f32),
    /// Surface contents when the gesture began. Shape previews restore from
    /// it on every redraw; commit hands it back for the history push.
    pre: Snapshot,
}

/// Applies pointer gestures to the live surface.
///
/// One gesture at a time: `begin` moves Idle -> Active, `commit` (or
/// `cancel`) returns to Idle. `update` and `commit` while idle are no-ops so
/// stray pointer events cannot corrupt the surface.
#[derive(Debug, Default)]
pub struct ToolEngine {
    gesture: Option<Gesture>,
}

impl ToolEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Start a gesture at `(x, y)`, snapshotting the pre-gesture surface.
    ///
    /// Pen and eraser anchor their path here; nothing is drawn until the
    /// first `update`. A `begin` while a gesture is already active is
    /// ignored.
    pub fn begin(&mut self, surface: &mut RasterSurface, tool: Tool, x: f32, y: f32) {
        if self.gesture.is_some() {
            warn!("pointer begin while a {} gesture is active; ignored", tool.kind);
            return;
        }
        debug!("{} gesture begins at ({x:.1}, {y:.1})", tool.kind);
        self.gesture = Some(Gesture { anchor: (x, y), last: (x, y), pre: surface.snapshot() });
    }

    /// Extend the gesture to `(x, y)`.
    ///
    /// Pen and eraser composite a segment immediately. Rectangle and circle
    /// restore the pre-gesture snapshot and redraw the preview outline from
    /// the anchor; restoring first is what keeps overlapping previews from
    /// smearing into each other.
    pub fn update(&mut self, surface: &mut RasterSurface, tool: Tool, limits: ShapeLimits, x: f32, y: f32) {
        let Some(gesture) = &mut self.gesture else { return };
        match tool.kind {
            ToolKind::Pen | ToolKind::Eraser => {
                let style = StrokeStyle { paint: paint_for(tool), width: tool.size, dash: None };
                shapes::stroke_segment(surface, gesture.last, (x, y), &style, &mut DashPhase::default());
            }
            ToolKind::Rectangle => {
                surface.restore(&gesture.pre);
                draw_rectangle(surface, tool, limits, gesture.anchor, (x, y), true);
            }
            ToolKind::Circle => {
                surface.restore(&gesture.pre);
                draw_circle(surface, tool, limits, gesture.anchor, (x, y), true);
            }
            ToolKind::Fill => {}
        }
        gesture.last = (x, y);
    }

    /// Finish the gesture at `(x, y)` and return the pre-gesture snapshot for
    /// the caller's history push. Returns `None` when no gesture was active.
    pub fn commit(
        &mut self,
        surface: &mut RasterSurface,
        tool: Tool,
        limits: ShapeLimits,
        x: f32,
        y: f32,
    ) -> Option<Snapshot> {
        let gesture = self.gesture.take()?;
        match tool.kind {
            ToolKind::Pen | ToolKind::Eraser => {
                // The path was composited incrementally; nothing left to draw.
            }
            ToolKind::Rectangle => {
                surface.restore(&gesture.pre);
                draw_rectangle(surface, tool, limits, gesture.anchor, (x, y), false);
            }
            ToolKind::Circle => {
                surface.restore(&gesture.pre);
                draw_circle(surface, tool, limits, gesture.anchor, (x, y), false);
            }
            ToolKind::Fill => {
                let (fx, fy) = (x.floor(), y.floor());
                // A click off the surface is a stray event, not a fill.
                if fx >= 0.0 && fy >= 0.0 && surface.contains(fx as u32, fy as u32) {
                    match flood_fill(surface, fx as u32, fy as u32, tool.color) {
                        Ok(recolored) => debug!("fill commit recolored {recolored} pixels"),
                        Err(err) => warn!("fill commit failed: {err}"),
                    }
                }
            }
        }
        debug!("{} gesture committed at ({x:.1}, {y:.1})", tool.kind);
        Some(gesture.pre)
    }

    /// Drop an in-flight gesture, restoring the pre-gesture surface. Used on
    /// tool switches and frame switches mid-drag.
    pub fn cancel(&mut self, surface: &mut RasterSurface) {
        if let Some(gesture) = self.gesture.take() {
            surface.restore(&gesture.pre);
            debug!("gesture cancelled");
        }
    }
}

fn paint_for(tool: Tool) -> Paint {
    match tool.kind {
        ToolKind::Eraser => Paint::Erase,
        _ => Paint::Color(tool.color),
    }
}

fn shape_style(tool: Tool, preview: bool) -> StrokeStyle {
    StrokeStyle {
        paint: Paint::Color(tool.color),
        // Previews get a minimum 2 px line so they stay visible at size 1.
        width: if preview { tool.size.max(2) } else { tool.size },
        dash: preview.then_some(PREVIEW_DASH),
    }
}

fn marker_size(tool: Tool) -> f32 {
    (tool.size + 1).max(4) as f32
}

/// Rectangle from `anchor` toward `to`, extent clamped; the preview adds
/// square corner markers.
fn draw_rectangle(
    surface: &mut RasterSurface,
    tool: Tool,
    limits: ShapeLimits,
    anchor: (f32, f32),
    to: (f32, f32),
    preview: bool,
) {
    let width = (to.0 - anchor.0).clamp(-limits.max_rect_extent, limits.max_rect_extent);
    let height = (to.1 - anchor.1).clamp(-limits.max_rect_extent, limits.max_rect_extent);
    shapes::stroke_rect(surface, anchor, width, height, &shape_style(tool, preview));
    if preview {
        let dot = marker_size(tool);
        let (x0, y0) = anchor;
        for (cx, cy) in [(x0, y0), (x0 + width, y0), (x0 + width, y0 + height), (x0, y0 + height)] {
            surface.fill_rect(cx - dot / 2.0, cy - dot / 2.0, dot, dot, tool.color);
        }
    }
}

/// Circle centered on `anchor` through `to`, radius clamped; the preview adds
/// a center marker.
fn draw_circle(
    surface: &mut RasterSurface,
    tool: Tool,
    limits: ShapeLimits,
    anchor: (f32, f32),
    to: (f32, f32),
    preview: bool,
) {
    let radius = (to.0 - anchor.0).hypot(to.1 - anchor.1).min(limits.max_circle_radius);
    shapes::stroke_circle(surface, anchor, radius, &shape_style(tool, preview));
    if preview {
        let dot = marker_size(tool);
        surface.fill_rect(anchor.0 - dot / 2.0, anchor.1 - dot / 2.0, dot, dot, tool.color);
    }
}
