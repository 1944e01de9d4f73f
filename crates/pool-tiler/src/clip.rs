//! Polygon predicates and clipping.
//!
//! This is the HOT PATH - every tile candidate of every solver goes through
//! these tests, usually several times. All functions are total: degenerate
//! input (fewer than 3 points, zero-length edges) yields a conservative
//! default instead of an error.

use crate::geometry::{Point, Rect, polygon_area, signed_area_of_points};

/// Default distance (mm) within which a point counts as "on" a boundary.
///
/// Used everywhere instead of exact equality to absorb floating-point drift.
pub const BOUNDARY_TOLERANCE: f64 = 2.0;

/// Inset (mm) applied before testing a rect for full containment.
pub const CONTAINMENT_INSET: f64 = 0.5;

/// Points closer than this collapse when clipping output is deduplicated.
pub const CLIP_DEDUP_EPSILON: f64 = 1e-6;

/// Divisor substituted for a zero-height edge in the ray-casting test.
const HORIZONTAL_EDGE_DIVISOR: f64 = 1e-9;

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside. Points exactly on the boundary
/// may land either way; pair with [`is_point_near_polygon_boundary`] when
/// "on" must count as inside.
#[inline]
pub fn point_in_polygon(px: f64, py: f64, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);

        let dy = if yj == yi { HORIZONTAL_EDGE_DIVISOR } else { yj - yi };
        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / dy + xi) {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// Inside the polygon or within `tol` of its boundary.
#[inline]
pub fn point_inside_or_on(p: Point, polygon: &[Point], tol: f64) -> bool {
    point_in_polygon(p.x, p.y, polygon) || is_point_near_polygon_boundary(p, polygon, tol)
}

// ============================================================================
// SEGMENTS
// ============================================================================

/// Orientation of the ordered triple (a, b, c).
///
/// ## Rust Lesson #10: Enums (Sum Types)
///
/// Returning an enum instead of -1/0/1 makes the three cases impossible to
/// mix up, and `match` forces every caller to handle all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

#[inline]
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let value = (b - a).cross(c - b);
    if value.abs() < 1e-12 {
        Orientation::Collinear
    } else if value > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Given collinear a, b, c: does b lie on segment a–c?
#[inline]
pub fn on_segment(a: Point, b: Point, c: Point) -> bool {
    b.x <= a.x.max(c.x) && b.x >= a.x.min(c.x) && b.y <= a.y.max(c.y) && b.y >= a.y.min(c.y)
}

/// Do segments a1–a2 and b1–b2 intersect (touching and collinear overlap count)?
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(a1, b1, a2))
        || (o2 == Orientation::Collinear && on_segment(a1, b2, a2))
        || (o3 == Orientation::Collinear && on_segment(b1, a1, b2))
        || (o4 == Orientation::Collinear && on_segment(b1, a2, b2))
}

/// Proper crossing only: the segments pass through each other.
///
/// Touching at an endpoint or running along each other does not count.
pub fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    use Orientation::Collinear;

    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    [o1, o2, o3, o4].iter().all(|o| *o != Collinear) && o1 != o2 && o3 != o4
}

/// Closest point to `p` on segment a–b.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab.scale(t)
}

#[inline]
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    p.distance(closest_point_on_segment(p, a, b))
}

/// Iterate a polygon's edges as `(start, end)` pairs, closing the loop.
#[inline]
pub fn polygon_edges(polygon: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n]))
}

// ============================================================================
// BOUNDARY PROXIMITY & CLAMPING
// ============================================================================

/// Is `p` within `tol` of any edge of the polygon?
pub fn is_point_near_polygon_boundary(p: Point, polygon: &[Point], tol: f64) -> bool {
    if polygon.len() < 2 {
        return false;
    }
    polygon_edges(polygon).any(|(a, b)| point_segment_distance(p, a, b) <= tol)
}

/// Nearest point on the polygon boundary, or `p` itself when already inside.
pub fn clamp_point_to_polygon(p: Point, polygon: &[Point]) -> Point {
    if polygon.len() < 3 || point_in_polygon(p.x, p.y, polygon) {
        return p;
    }

    polygon_edges(polygon)
        .map(|(a, b)| closest_point_on_segment(p, a, b))
        .min_by(|a, b| p.distance(*a).total_cmp(&p.distance(*b)))
        .unwrap_or(p)
}

// ============================================================================
// RECT / POLYGON RELATIONS
// ============================================================================

/// Does the rect meaningfully overlap the polygon?
///
/// True when any of:
/// 1. at least 2 rect corners are inside-or-on the polygon,
/// 2. a polygon vertex lies strictly inside the rect,
/// 3. a rect edge properly crosses a polygon edge.
///
/// A single corner grazing the polygon is not enough on its own; that
/// keeps corner-touch tiles out of layouts.
pub fn rect_intersects_polygon(rect: &Rect, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let corners_in = rect
        .corners()
        .iter()
        .filter(|c| point_inside_or_on(**c, polygon, BOUNDARY_TOLERANCE))
        .count();
    if corners_in >= 2 {
        return true;
    }

    if polygon.iter().any(|v| rect.contains_strict(*v)) {
        return true;
    }

    rect.edges().iter().any(|&(r1, r2)| {
        polygon_edges(polygon).any(|(p1, p2)| segments_cross(r1, r2, p1, p2))
    })
}

/// Is the rect entirely inside the polygon?
///
/// The rect is first shrunk by [`CONTAINMENT_INSET`] so float jitter on a
/// shared edge cannot demote a fully enclosed tile to partial. Besides the
/// four corners, no polygon vertex may poke into the inset rect (a concave
/// notch narrower than the tile would otherwise go unnoticed).
pub fn rect_fully_inside_polygon(rect: &Rect, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let inset = rect.inset(CONTAINMENT_INSET);
    inset
        .corners()
        .iter()
        .all(|c| point_inside_or_on(*c, polygon, BOUNDARY_TOLERANCE))
        && !polygon.iter().any(|v| inset.contains_strict(*v))
}

/// Area (mm²) of the part of `rect` covered by `polygon`.
///
/// The polygon is the subject and the convex rect the clip window, so this
/// is exact for concave polygons too.
pub fn clipped_area(rect: &Rect, polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    polygon_area(&clip_polygon(polygon, &rect.to_points()))
}

/// Area (mm²) of `rect` covered by `polygon` but by none of `holes`.
///
/// Holes may overlap each other; shared regions are only removed once.
///
/// Works in horizontal slabs. Slab boundaries sit at every vertex, every
/// edge/edge crossing and every edge crossing of the rect's sides, so
/// inside a slab each covered interval grows or shrinks linearly and the
/// covered width at the slab's middle times its height is exact.
pub fn clipped_area_excluding(rect: &Rect, polygon: &[Point], holes: &[&[Point]]) -> f64 {
    let holes: Vec<&[Point]> = holes.iter().copied().filter(|h| h.len() >= 3).collect();
    if polygon.len() < 3 || rect.area() <= 0.0 {
        return 0.0;
    }
    if holes.is_empty() {
        return clipped_area(rect, polygon);
    }

    let (top, bottom) = (rect.y, rect.bottom());
    let edges: Vec<(Point, Point)> = std::iter::once(polygon)
        .chain(holes.iter().copied())
        .flat_map(polygon_edges)
        .filter(|(a, b)| a.y.max(b.y) >= top && a.y.min(b.y) <= bottom)
        .collect();

    let mut cuts = vec![top, bottom];
    for (i, &(a, b)) in edges.iter().enumerate() {
        cuts.extend([a.y, b.y]);
        for x in [rect.x, rect.right()] {
            if (a.x - x) * (b.x - x) < 0.0 {
                cuts.push(a.y + (b.y - a.y) * (x - a.x) / (b.x - a.x));
            }
        }
        for &(c, d) in &edges[i + 1..] {
            if let Some(p) = segment_intersection_point(a, b, c, d) {
                cuts.push(p.y);
            }
        }
    }
    cuts.retain(|y| *y >= top && *y <= bottom);
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|a, b| (*a - *b).abs() < CLIP_DEDUP_EPSILON);

    cuts.windows(2)
        .map(|slab| {
            let height = slab[1] - slab[0];
            let y = (slab[0] + slab[1]) / 2.0;
            height * covered_width(rect, polygon, &holes, y)
        })
        .sum()
}

/// Width of the scanline at `y`, inside `rect` and `polygon`, outside all holes.
fn covered_width(rect: &Rect, polygon: &[Point], holes: &[&[Point]], y: f64) -> f64 {
    let (x0, x1) = (rect.x, rect.right());
    let clamp = |(a, b): (f64, f64)| (a.max(x0), b.min(x1));

    let mut removed: Vec<(f64, f64)> = holes
        .iter()
        .flat_map(|h| scanline_spans(h, y))
        .map(clamp)
        .filter(|(a, b)| b > a)
        .collect();
    removed.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(removed.len());
    for (a, b) in removed {
        match merged.last_mut() {
            Some(last) if a <= last.1 => last.1 = last.1.max(b),
            _ => merged.push((a, b)),
        }
    }

    scanline_spans(polygon, y)
        .into_iter()
        .map(clamp)
        .filter(|(a, b)| b > a)
        .map(|(a, b)| {
            let cut: f64 = merged
                .iter()
                .map(|&(ha, hb)| (hb.min(b) - ha.max(a)).max(0.0))
                .sum();
            (b - a) - cut
        })
        .sum()
}

/// Inside spans of a horizontal scanline through a polygon (even-odd rule).
fn scanline_spans(polygon: &[Point], y: f64) -> Vec<(f64, f64)> {
    let mut xs: Vec<f64> = polygon_edges(polygon)
        .filter(|(a, b)| (a.y > y) != (b.y > y))
        .map(|(a, b)| a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y))
        .collect();
    xs.sort_by(f64::total_cmp);
    xs.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Crossing point of segments a1–a2 and b1–b2, if they properly meet.
fn segment_intersection_point(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let d = a2 - a1;
    let e = b2 - b1;
    let denom = d.cross(e);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = (b1 - a1).cross(e) / denom;
    let u = (b1 - a1).cross(d) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| a1 + d.scale(t))
}

// ============================================================================
// SUTHERLAND–HODGMAN CLIPPING
// ============================================================================

/// Clip `subject` against `clip` (Sutherland–Hodgman).
///
/// The clip polygon should be convex; its orientation is read from its
/// signed area so either winding works. A clip polygon with fewer than
/// 3 points leaves the subject unclipped. Output points closer than
/// [`CLIP_DEDUP_EPSILON`] are merged.
pub fn clip_polygon(subject: &[Point], clip: &[Point]) -> Vec<Point> {
    if clip.len() < 3 {
        return subject.to_vec();
    }

    // +1 when the clip runs clockwise on screen, -1 otherwise.
    let sign = if signed_area_of_points(clip) >= 0.0 { 1.0 } else { -1.0 };
    let inside = |p: Point, a: Point, b: Point| sign * (b - a).cross(p - a) >= 0.0;

    let mut output = subject.to_vec();

    for (edge_start, edge_end) in polygon_edges(clip) {
        if output.is_empty() {
            break;
        }

        let input = std::mem::take(&mut output);
        let n = input.len();

        for i in 0..n {
            let current = input[i];
            let previous = input[(i + n - 1) % n];
            let current_in = inside(current, edge_start, edge_end);
            let previous_in = inside(previous, edge_start, edge_end);

            if current_in {
                if !previous_in {
                    output.push(line_intersection(previous, current, edge_start, edge_end));
                }
                output.push(current);
            } else if previous_in {
                output.push(line_intersection(previous, current, edge_start, edge_end));
            }
        }
    }

    dedup_points(output, CLIP_DEDUP_EPSILON)
}

/// Intersection of segment p1–p2 with the infinite line through a–b.
///
/// Only called when p1 and p2 are on opposite sides, so the denominator is
/// non-zero except for float noise; that case falls back to p1.
fn line_intersection(p1: Point, p2: Point, a: Point, b: Point) -> Point {
    let d = p2 - p1;
    let e = b - a;
    let denom = d.cross(e);
    if denom.abs() < 1e-12 {
        return p1;
    }
    let t = (a - p1).cross(e) / denom;
    p1 + d.scale(t)
}

fn dedup_points(mut points: Vec<Point>, eps: f64) -> Vec<Point> {
    points.dedup_by(|a, b| a.distance(*b) < eps);
    while points.len() > 1 && points[points.len() - 1].distance(points[0]) < eps {
        points.pop();
    }
    points
}

// ============================================================================
// TESTS
// ============================================================================
