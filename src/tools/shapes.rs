use std::f32::consts::TAU;

use crate::color::Rgba;
use crate::surface::RasterSurface;

/// What a brush stamp deposits: a color, or full transparency for the eraser
/// (destination-out composition rather than painting the background color).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Color(Rgba),
    Erase,
}

impl Paint {
    fn color(self) -> Rgba {
        match self {
            Paint::Color(c) => c,
            Paint::Erase => Rgba::TRANSPARENT,
        }
    }
}

/// Stroke parameters shared by segments, rectangle and circle outlines.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub paint: Paint,
    /// Brush width in pixels; stamps are round, radius `width / 2`.
    pub width: u32,
    /// `(on, off)` dash lengths in pixels; `None` draws solid.
    pub dash: Option<(f32, f32)>,
}

/// Arc-length progress through a dash pattern, carried across the pieces of
/// one outline so dashes flow around corners instead of restarting.
#[derive(Debug, Default)]
pub struct DashPhase {
    travelled: f32,
}

impl DashPhase {
    fn painted(&self, dash: Option<(f32, f32)>) -> bool {
        match dash {
            None => true,
            Some((on, off)) => self.travelled % (on + off) < on,
        }
    }

    fn advance(&mut self, by: f32) {
        self.travelled += by;
    }
}

/// Stamp one round brush mark centered at `(cx, cy)`.
///
/// The nearest pixel is always painted, so a width-1 brush still leaves a
/// mark at fractional coordinates.
pub fn stamp(surface: &mut RasterSurface, cx: f32, cy: f32, width: u32, paint: Paint) {
    let radius = (width as f32 / 2.0).max(0.5);
    let color = paint.color();
    let x0 = (cx - radius).floor() as i64;
    let x1 = (cx + radius).ceil() as i64;
    let y0 = (cy - radius).floor() as i64;
    let y1 = (cy + radius).ceil() as i64;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                surface.put_clipped(x, y, color);
            }
        }
    }
    surface.put_clipped(cx.round() as i64, cy.round() as i64, color);
}

/// Stroke a straight segment by stamping the brush along it at roughly
/// one-pixel arc-length steps.
pub fn stroke_segment(
    surface: &mut RasterSurface,
    from: (f32, f32),
    to: (f32, f32),
    style: &StrokeStyle,
    phase: &mut DashPhase,
) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let length = (dx * dx + dy * dy).sqrt();
    let steps = length.ceil().max(1.0) as u32;
    let step_len = length / steps as f32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        if phase.painted(style.dash) {
            stamp(surface, from.0 + dx * t, from.1 + dy * t, style.width, style.paint);
        }
        if i < steps {
            phase.advance(step_len);
        }
    }
}

/// Stroke a rectangle outline from `anchor`, spanning `width` x `height`
/// (either may be negative). Dashes run continuously around the perimeter.
pub fn stroke_rect(
    surface: &mut RasterSurface,
    anchor: (f32, f32),
    width: f32,
    height: f32,
    style: &StrokeStyle,
) {
    let (x0, y0) = anchor;
    let (x1, y1) = (x0 + width, y0 + height);
    let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)];
    let mut phase = DashPhase::default();
    for pair in corners.windows(2) {
        stroke_segment(surface, pair[0], pair[1], style, &mut phase);
    }
}

/// Stroke a circle outline centered at `center`.
pub fn stroke_circle(surface: &mut RasterSurface, center: (f32, f32), radius: f32, style: &StrokeStyle) {
    if radius <= 0.5 {
        stamp(surface, center.0, center.1, style.width, style.paint);
        return;
    }
    let circumference = TAU * radius;
    let steps = circumference.ceil().max(8.0) as u32;
    let step_len = circumference / steps as f32;
    let mut phase = DashPhase::default();
    for i in 0..=steps {
        let angle = TAU * i as f32 / steps as f32;
        if phase.painted(style.dash) {
            stamp(
                surface,
                center.0 + radius * angle.cos(),
                center.1 + radius * angle.sin(),
                style.width,
                style.paint,
            );
        }
        if i < steps {
            phase.advance(step_len);
        }
    }
}
