//! Grid snapping and unit conversion.
//!
//! The editor canvas works in stage units where one unit is 10 mm; the
//! kernel works in millimeters. Conversion happens here, at the edge.

use crate::geometry::Point;

/// Millimeters per canvas (stage) unit.
pub const CANVAS_UNIT_MM: f64 = 10.0;

/// Decimal places kept by [`boundary_key`].
pub const BOUNDARY_KEY_DECIMALS: usize = 1;

/// Quantize a value to the nearest multiple of `pitch`.
///
/// A non-positive pitch disables snapping.
#[inline]
pub fn snap_value(value: f64, pitch: f64) -> f64 {
    if pitch <= 0.0 {
        return value;
    }
    (value / pitch).round() * pitch
}

#[inline]
pub fn snap_point(p: Point, pitch: f64) -> Point {
    Point::new(snap_value(p.x, pitch), snap_value(p.y, pitch))
}

/// Snap every vertex of an outline.
///
/// Snapping can fold neighbouring vertices onto each other; run
/// [`crate::geometry::simplify_polygon`] afterwards when that matters.
pub fn snap_polygon(points: &[Point], pitch: f64) -> Vec<Point> {
    points.iter().map(|p| snap_point(*p, pitch)).collect()
}

#[inline]
pub fn canvas_to_mm(value: f64) -> f64 {
    value * CANVAS_UNIT_MM
}

#[inline]
pub fn mm_to_canvas(value: f64) -> f64 {
    value / CANVAS_UNIT_MM
}

#[inline]
pub fn canvas_point_to_mm(p: Point) -> Point {
    p.scale(CANVAS_UNIT_MM)
}

#[inline]
pub fn mm_point_to_canvas(p: Point) -> Point {
    p.scale(1.0 / CANVAS_UNIT_MM)
}

/// Cheap structural key for an outline: rounded coordinates joined in order.
///
/// Two outlines with the same key produce the same layout, so callers can
/// memoize on it during a drag.
pub fn boundary_key(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| {
            format!(
                "{:.prec$},{:.prec$}",
                normalize_zero(p.x),
                normalize_zero(p.y),
                prec = BOUNDARY_KEY_DECIMALS
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Map values that round to zero onto +0.0 so "-0.0" never leaks into a key.
#[inline]
fn normalize_zero(value: f64) -> f64 {
    let factor = 10f64.powi(BOUNDARY_KEY_DECIMALS as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}
