//! Core geometry types for pool-tiler.
//!
//! All kernel math runs in millimeters in the *screen frame*: x grows to the
//! right and y grows downward, the same frame the canvas draws in. Callers
//! that work in canvas units convert at the edge (see [`crate::snap`]).
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = print with `{:?}`
//! - `Clone` / `Copy` = duplicate the value (Copy only for small stack values)
//! - `PartialEq` = compare with `==`
//! - `Serialize` / `Deserialize` = serde turns the struct into JSON and back

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point with x,y coordinates (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A closed polygon outline.
///
/// The last point implicitly connects back to the first one; callers never
/// repeat the first point at the end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Boundary vertices in order.
    pub outer: Vec<Point>,
    /// Optional ID (e.g. the SVG element the outline came from)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Winding direction of a polygon in the screen frame (y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
    /// Zero signed area (fewer than 3 points or all collinear).
    Degenerate,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    /// Z component of the 2D cross product `self × other`.
    #[inline]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or the zero vector for zero length.
    #[inline]
    pub fn normalized(self) -> Point {
        let len = self.length();
        if len == 0.0 {
            Point::default()
        } else {
            self.scale(1.0 / len)
        }
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Rect {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rect from a `(min_x, min_y, max_x, max_y)` bounding box.
    #[inline]
    pub fn from_bounds((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> Self {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Corners in clockwise screen order starting at the top-left.
    #[inline]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// The four edges as `(start, end)` pairs, following [`Rect::corners`].
    pub fn edges(&self) -> [(Point, Point); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Shrink (positive `amount`) or grow (negative) on every side.
    ///
    /// Never produces a negative size; a rect shrunk past its center
    /// collapses to its center point.
    pub fn inset(&self, amount: f64) -> Rect {
        let width = (self.width - 2.0 * amount).max(0.0);
        let height = (self.height - 2.0 * amount).max(0.0);
        let c = self.center();
        Rect::new(c.x - width / 2.0, c.y - height / 2.0, width, height)
    }

    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Strict containment: points on the rect's edges are *not* inside.
    #[inline]
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    /// Area of the intersection with another rect (0.0 when disjoint or touching).
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }

    /// The rect as a clockwise polygon outline.
    pub fn to_points(&self) -> Vec<Point> {
        self.corners().to_vec()
    }
}

impl Polygon {
    /// Create a polygon with no ID.
    pub fn new(outer: Vec<Point>) -> Self {
        Self { outer, id: None }
    }

    /// Create a polygon with an ID.
    pub fn with_id(outer: Vec<Point>, id: Option<String>) -> Self {
        Self { outer, id }
    }

    /// Polygon from a rect (clockwise in the screen frame).
    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.to_points())
    }

    /// Get the bounding box as (min_x, min_y, max_x, max_y).
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        bounding_box_of_points(&self.outer)
    }

    /// Calculate signed area using the shoelace formula.
    ///
    /// Positive for clockwise winding in the screen frame (y down).
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(&self.outer)
    }

    /// Unsigned area in mm².
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[inline]
    pub fn winding(&self) -> Winding {
        winding_of(&self.outer)
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(outer: Vec<Point>) -> Self {
        Polygon::new(outer)
    }
}

// ============================================================================
// FREE FUNCTIONS ON POINT SLICES
// ============================================================================
//
// ## Rust Lesson #8: References & Slices
//
// Most kernel functions take `&[Point]` rather than `&Polygon`. A slice
// borrows any contiguous run of points (a Vec, an array, part of a Vec), so
// callers never have to build a Polygon just to ask a question.

/// Bounding box of a point sequence as (min_x, min_y, max_x, max_y).
pub fn bounding_box_of_points(points: &[Point]) -> Option<(f64, f64, f64, f64)> {
    if points.is_empty() {
        return None;
    }

    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    Some((min_x, min_y, max_x, max_y))
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for clockwise winding on screen (y down)
/// - Negative value for counter-clockwise winding on screen
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

/// Unsigned polygon area in mm².
#[inline]
pub fn polygon_area(points: &[Point]) -> f64 {
    signed_area_of_points(points).abs()
}

pub fn winding_of(points: &[Point]) -> Winding {
    let area = signed_area_of_points(points);
    if area > 0.0 {
        Winding::Clockwise
    } else if area < 0.0 {
        Winding::CounterClockwise
    } else {
        Winding::Degenerate
    }
}

/// Return the points in clockwise (screen) order, reversing if needed.
///
/// Degenerate input is returned unchanged.
pub fn normalize_clockwise(points: &[Point]) -> Vec<Point> {
    let mut out = points.to_vec();
    if winding_of(points) == Winding::CounterClockwise {
        out.reverse();
    }
    out
}

/// Rotate the sequence so it starts at the top-most vertex (ties: left-most).
///
/// Edge indices of a solved layout are then independent of which vertex the
/// caller happened to list first.
pub fn canonical_start(points: &[Point]) -> Vec<Point> {
    let Some(start) = (0..points.len()).min_by(|&a, &b| {
        let (pa, pb) = (points[a], points[b]);
        pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
    }) else {
        return Vec::new();
    };

    points[start..].iter().chain(points[..start].iter()).copied().collect()
}

/// Sine-style tolerance used to decide that three points are collinear.
///
/// Scale invariant: compared against `|a × b| / (|a| |b|)`.
pub const COLLINEAR_TOLERANCE: f64 = 1e-6;

/// Remove consecutive near-duplicates (closer than `eps`) and collinear points.
///
/// Runs to a fixed point, so simplifying an already simplified polygon is a
/// no-op. Never drops below 3 points through collinear removal; if duplicate
/// removal alone leaves fewer than 3, whatever remains is returned.
pub fn simplify_polygon(points: &[Point], eps: f64) -> Vec<Point> {
    let mut out = points.to_vec();
    loop {
        let before = out.len();
        out = remove_near_duplicates(&out, eps);
        remove_collinear(&mut out);
        if out.len() == before {
            return out;
        }
    }
}

/// Drop consecutive points closer than `eps`, including the wrap from last to first.
fn remove_near_duplicates(points: &[Point], eps: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|last| last.distance(p) >= eps) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[out.len() - 1].distance(out[0]) < eps {
        out.pop();
    }
    out
}

/// Drop vertices whose neighbours are collinear with them.
///
/// Removing one vertex changes its neighbours' situation, so the scan steps
/// back after each removal and stops after a full lap without changes.
fn remove_collinear(out: &mut Vec<Point>) {
    let mut i = 0;
    let mut unchanged = 0;
    while out.len() > 3 && unchanged < out.len() {
        let n = out.len();
        let prev = out[(i + n - 1) % n];
        let curr = out[i];
        let next = out[(i + 1) % n];

        let a = curr - prev;
        let b = next - curr;
        let scale = a.length() * b.length();

        // A spike doubling back on itself is collinear too: it encloses nothing.
        if scale == 0.0 || a.cross(b).abs() <= COLLINEAR_TOLERANCE * scale {
            out.remove(i);
            unchanged = 0;
            i = i.saturating_sub(1) % out.len();
        } else {
            unchanged += 1;
            i = (i + 1) % n;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
