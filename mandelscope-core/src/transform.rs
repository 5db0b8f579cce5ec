//! Screen-space gestures to new viewport bounds.
//!
//! Gestures are reduced to a press point, a release point, and a mode; the
//! pixel grid is a square of side `resolution` whose `(0, 0)` corner maps
//! to `(min_re, min_im)`.

use tracing::debug;

use crate::bounds::Bounds;

/// A position on the pixel grid. Fractional and out-of-range values are
/// allowed; pointer positions are not clamped by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a drag gesture does when released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    /// Drag the view by the pointer delta.
    Pan,
    /// Select a square to zoom into.
    #[default]
    Zoom,
}

/// A square zoom selection in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub x: f64,
    pub y: f64,
    pub side: f64,
}

/// Shift `bounds` by the pixel delta between `press` and `release`.
///
/// Returns `None` for a zero delta.
pub fn pan_bounds(
    bounds: &Bounds,
    press: PixelPoint,
    release: PixelPoint,
    resolution: u32,
) -> Option<Bounds> {
    let dx = release.x - press.x;
    let dy = release.y - press.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let (x_scale, y_scale) = bounds.pixel_scale(resolution);
    let panned = bounds.translated(x_scale * dx, y_scale * dy);
    match panned.validate() {
        Ok(()) => Some(panned),
        Err(e) => {
            debug!("Discarding pan: {e}");
            None
        }
    }
}

/// The square selected by a drag from `press` to `release`, clamped to the
/// pixel grid.
///
/// The side is the longer of the two drag extents. The origin is clamped
/// into `[0, resolution]` first; the side is then shrunk by whichever axis
/// needs the larger reduction, so the square stays square.
pub fn zoom_selection(press: PixelPoint, release: PixelPoint, resolution: u32) -> Selection {
    let limit = resolution as f64;
    let x = press.x.min(release.x).clamp(0.0, limit);
    let y = press.y.min(release.y).clamp(0.0, limit);
    let side = (release.x - press.x)
        .abs()
        .max((release.y - press.y).abs())
        .min(limit - x)
        .min(limit - y);
    Selection { x, y, side }
}

/// Bounds of the square selected by a zoom gesture.
///
/// Returns `None` when the clamped selection has no area.
pub fn zoom_bounds(
    bounds: &Bounds,
    press: PixelPoint,
    release: PixelPoint,
    resolution: u32,
) -> Option<Bounds> {
    let sel = zoom_selection(press, release, resolution);
    if sel.side.is_nan() || sel.side <= 0.0 {
        return None;
    }
    let (x_scale, y_scale) = bounds.pixel_scale(resolution);
    let zoomed = Bounds {
        min_re: bounds.min_re + x_scale * sel.x,
        max_re: bounds.min_re + x_scale * (sel.x + sel.side),
        min_im: bounds.min_im + y_scale * sel.y,
        max_im: bounds.min_im + y_scale * (sel.y + sel.side),
    };
    match zoomed.validate() {
        Ok(()) => Some(zoomed),
        Err(e) => {
            debug!("Discarding zoom: {e}");
            None
        }
    }
}
