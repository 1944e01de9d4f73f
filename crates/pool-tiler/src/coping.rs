//! Coping layout solver - lay a border of tiles around a pool outline.
//!
//! Every edge of the outline gets one row of tiles, `tile_depth` deep, on
//! the outside of the pool. Two things make this harder than it sounds:
//!
//! - **Corners.** At a convex ("standard") corner the two rows meet outside
//!   the pool and someone has to own the corner square. At a reflex
//!   ("armpit") corner the rows run *into* each other. The extension
//!   hierarchy below settles both cases without overlap.
//! - **Remainders.** An edge is rarely a whole number of tiles. The cut
//!   strategy decides where the cut piece goes.
//!
//! # Extension hierarchy
//!
//! | edge axis     | standard corner         | armpit corner                  |
//! |---------------|-------------------------|--------------------------------|
//! | horizontal    | extend by `tile_depth`  | flush                          |
//! | perpendicular | shrink by `grout`       | shrink by `tile_depth + grout` |
//!
//! Horizontal rows own the corner squares; perpendicular rows stop one grout
//! line short of them. This is how "both edges change by `tile_depth +
//! grout`, perpendicular flush at an armpit" plays out on a real deck: only
//! one row may own each corner square, so nothing is covered twice.
//!
//! # Example
//! ```
//! use pool_tiler::coping::{CopingConfig, solve_coping};
//! use pool_tiler::geometry::Rect;
//!
//! let pool = Rect::new(0.0, 0.0, 6000.0, 3000.0).to_points();
//! let layout = solve_coping(&pool, &CopingConfig::default());
//! assert_eq!(layout.edges.len(), 4);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geometry::{Point, canonical_start, normalize_clockwise, simplify_polygon, winding_of, Winding};
use crate::tile::{PARTIAL_WIDTH_TOLERANCE, Side, Tile, TileStats};

/// Edges whose vertical extent is below this (mm) count as horizontal.
pub const HORIZONTAL_TOLERANCE: f64 = 1.0;

/// Cross-product threshold separating standard from armpit corners.
pub const CORNER_TOLERANCE: f64 = -1e-6;

/// Spans (and cut pieces) this short or shorter are not worth a tile.
pub const MIN_SPAN: f64 = 1.0;

/// Distance under which outline vertices are merged before solving.
const OUTLINE_EPSILON: f64 = 0.5;

/// Per-edge strategies for 8-point T-shaped pools, edge 0 first.
///
/// Hand-tuned for the common T-shape (top bar plus stem, canonical start at
/// the bar's top-left corner). Other 8-point shapes get the same table;
/// pass [`PoolShapeKind::Custom`] to override.
pub const T_SHAPE_STRATEGIES: [CutStrategy; 8] = [
    CutStrategy::Middle,
    CutStrategy::Middle,
    CutStrategy::End,
    CutStrategy::Start,
    CutStrategy::Middle,
    CutStrategy::End,
    CutStrategy::Start,
    CutStrategy::Middle,
];

/// Where the cut remainder of an edge goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutStrategy {
    /// Cut tile at the start of the edge; full tiles end flush with the span.
    Start,
    /// Cut tile at the end of the edge; full tiles start flush with the span.
    End,
    /// Centered grid; the remainder is split between both ends.
    #[default]
    Middle,
}

/// Convex or reflex, seen from inside a clockwise outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerKind {
    Standard,
    Armpit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeAxis {
    Horizontal,
    Perpendicular,
}

/// How cut strategies are picked per edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolShapeKind {
    /// Centered grid on every edge.
    #[default]
    Rectangular,
    /// [`T_SHAPE_STRATEGIES`] by edge index.
    TShaped,
    /// One strategy per edge; edges past the end of the list use `Middle`.
    Custom(Vec<CutStrategy>),
}

impl PoolShapeKind {
    /// Guess the shape from the vertex count of a simplified outline.
    pub fn detect(point_count: usize) -> Self {
        if point_count == T_SHAPE_STRATEGIES.len() {
            PoolShapeKind::TShaped
        } else {
            PoolShapeKind::Rectangular
        }
    }

    pub fn strategy_for(&self, edge: usize) -> CutStrategy {
        match self {
            PoolShapeKind::Rectangular => CutStrategy::Middle,
            PoolShapeKind::TShaped => T_SHAPE_STRATEGIES[edge % T_SHAPE_STRATEGIES.len()],
            PoolShapeKind::Custom(strategies) => {
                strategies.get(edge).copied().unwrap_or_default()
            }
        }
    }
}

/// Configuration for the coping solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopingConfig {
    /// Tile length along the edge (mm).
    pub tile_width: f64,
    /// Tile depth away from the water (mm).
    pub tile_depth: f64,
    /// Gap between neighbouring tiles (mm).
    pub grout: f64,
    pub wastage_percent: f64,
    /// Strategy selection; `None` detects it from the vertex count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<PoolShapeKind>,
}

impl Default for CopingConfig {
    fn default() -> Self {
        Self {
            tile_width: 400.0,
            tile_depth: 400.0,
            grout: 5.0,
            wastage_percent: 10.0,
            shape: None,
        }
    }
}

impl CopingConfig {
    pub fn with_tile_size(mut self, width: f64, depth: f64) -> Self {
        self.tile_width = width;
        self.tile_depth = depth;
        self
    }

    pub fn with_grout(mut self, grout: f64) -> Self {
        self.grout = grout;
        self
    }

    pub fn with_wastage(mut self, percent: f64) -> Self {
        self.wastage_percent = percent;
        self
    }

    pub fn with_shape(mut self, shape: PoolShapeKind) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Shorthand for a [`PoolShapeKind::Custom`] strategy list.
    pub fn with_strategies(self, strategies: Vec<CutStrategy>) -> Self {
        self.with_shape(PoolShapeKind::Custom(strategies))
    }
}

/// What the solver decided for one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeLayout {
    pub index: usize,
    pub side: Side,
    pub axis: EdgeAxis,
    pub start_corner: CornerKind,
    pub end_corner: CornerKind,
    pub strategy: CutStrategy,
    /// Tileable span along the edge, measured from its start vertex (mm).
    pub span_start: f64,
    pub span_end: f64,
    pub full: usize,
    pub partial: usize,
    /// Span too short to tile.
    pub skipped: bool,
}

impl EdgeLayout {
    #[inline]
    pub fn span_length(&self) -> f64 {
        self.span_end - self.span_start
    }
}

/// Result of [`solve_coping`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopingLayout {
    /// The outline as solved: simplified, clockwise, canonical start.
    pub outline: Vec<Point>,
    pub tiles: Vec<Tile>,
    pub edges: Vec<EdgeLayout>,
    pub stats: TileStats,
}

/// Classify the corner at `curr`.
pub fn classify_corner(prev: Point, curr: Point, next: Point) -> CornerKind {
    let d1 = (curr - prev).normalized();
    let d2 = (next - curr).normalized();
    if d1.cross(d2) >= CORNER_TOLERANCE {
        CornerKind::Standard
    } else {
        CornerKind::Armpit
    }
}

pub fn classify_axis(start: Point, end: Point) -> EdgeAxis {
    if (end.y - start.y).abs() < HORIZONTAL_TOLERANCE {
        EdgeAxis::Horizontal
    } else {
        EdgeAxis::Perpendicular
    }
}

/// Signed adjustment at one end of an edge: positive grows the span.
fn corner_adjustment(axis: EdgeAxis, corner: CornerKind, config: &CopingConfig) -> f64 {
    match (axis, corner) {
        (EdgeAxis::Horizontal, CornerKind::Standard) => config.tile_depth,
        (EdgeAxis::Horizontal, CornerKind::Armpit) => 0.0,
        (EdgeAxis::Perpendicular, CornerKind::Standard) => -config.grout,
        (EdgeAxis::Perpendicular, CornerKind::Armpit) => -(config.tile_depth + config.grout),
    }
}

/// Lay tiles of `width` (plus `grout`) over `[span_start, span_end]`.
///
/// Returns `(start, end)` pieces along the edge, already clipped to the
/// span, in increasing order. Pieces of [`MIN_SPAN`] or less are dropped.
pub fn lay_span(
    span_start: f64,
    span_end: f64,
    width: f64,
    grout: f64,
    strategy: CutStrategy,
) -> Vec<(f64, f64)> {
    let length = span_end - span_start;
    if length <= MIN_SPAN || width <= 0.0 {
        return Vec::new();
    }

    let pitch = width + grout;
    let anchor = match strategy {
        CutStrategy::End => span_start,
        CutStrategy::Start => span_end - width,
        CutStrategy::Middle => {
            let n_full = ((length + grout) / pitch).floor().max(1.0);
            let used = n_full * width + (n_full - 1.0) * grout;
            span_start + (length - used) / 2.0
        }
    };

    // Every grid index whose tile can touch the span.
    let k_min = ((span_start - anchor - width) / pitch).floor() as i64;
    let k_max = ((span_end - anchor) / pitch).ceil() as i64;

    (k_min..=k_max)
        .filter_map(|k| {
            let t0 = anchor + k as f64 * pitch;
            let start = t0.max(span_start);
            let end = (t0 + width).min(span_end);
            (end - start > MIN_SPAN).then_some((start, end))
        })
        .collect()
}

/// Solve the coping layout for a pool outline.
///
/// The outline may be in either winding and start at any vertex; it is
/// simplified, turned clockwise (screen frame) and rotated to start at its
/// top-left vertex first, so edge indices are stable. Degenerate outlines
/// give an empty layout.
pub fn solve_coping(outline: &[Point], config: &CopingConfig) -> CopingLayout {
    let simplified = simplify_polygon(outline, OUTLINE_EPSILON);
    if simplified.len() < 3 || winding_of(&simplified) == Winding::Degenerate {
        warn!(points = simplified.len(), "coping outline is degenerate, nothing to lay");
        return CopingLayout {
            outline: simplified,
            ..Default::default()
        };
    }

    let points = canonical_start(&normalize_clockwise(&simplified));
    let n = points.len();
    let shape = config.shape.clone().unwrap_or_else(|| PoolShapeKind::detect(n));
    debug!(edges = n, ?shape, "solving coping");

    let mut tiles = Vec::new();
    let mut edges = Vec::with_capacity(n);

    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];
        let next_next = points[(i + 2) % n];

        let axis = classify_axis(curr, next);
        let start_corner = classify_corner(prev, curr, next);
        let end_corner = classify_corner(curr, next, next_next);

        let length = curr.distance(next);
        // `0.0 -` keeps a flush start at +0.0 rather than -0.0.
        let span_start = 0.0 - corner_adjustment(axis, start_corner, config);
        let span_end = length + corner_adjustment(axis, end_corner, config);

        let dir = (next - curr).normalized();
        let outward = Point::new(dir.y, -dir.x);
        let side = Side::from_normal(outward);
        let strategy = shape.strategy_for(i);

        let mut edge = EdgeLayout {
            index: i,
            side,
            axis,
            start_corner,
            end_corner,
            strategy,
            span_start,
            span_end,
            full: 0,
            partial: 0,
            skipped: false,
        };

        if span_end - span_start <= MIN_SPAN {
            debug!(edge = i, span = span_end - span_start, "edge span too short, skipped");
            edge.skipped = true;
            edges.push(edge);
            continue;
        }

        for (k, (u0, u1)) in lay_span(span_start, span_end, config.tile_width, config.grout, strategy)
            .into_iter()
            .enumerate()
        {
            let tile = place_edge_tile(curr, dir, outward, u0, u1, config.tile_depth, config.tile_width)
                .with_side(side);
            let tile = Tile {
                id: format!("coping-{i}-{k}"),
                edge_index: Some(i),
                ..tile
            };
            if tile.is_partial {
                edge.partial += 1;
            } else {
                edge.full += 1;
            }
            tiles.push(tile);
        }

        edges.push(edge);
    }

    let stats = TileStats::from_tiles(&tiles, config.wastage_percent, true);
    info!(
        tiles = tiles.len(),
        full = stats.full_count,
        partial = stats.partial_count,
        "coping solved"
    );

    CopingLayout {
        outline: points,
        tiles,
        edges,
        stats,
    }
}

/// Build the tile for piece `[u0, u1]` of the edge starting at `origin`.
///
/// The tile's local frame has x along the edge and y pointing back at the
/// water, so its anchor sits on the outer face of the coping row.
fn place_edge_tile(
    origin: Point,
    dir: Point,
    outward: Point,
    u0: f64,
    u1: f64,
    depth: f64,
    nominal_width: f64,
) -> Tile {
    let width = u1 - u0;
    let is_partial = (width - nominal_width).abs() > PARTIAL_WIDTH_TOLERANCE;

    let axis_aligned = dir.x.abs() < 1e-9 || dir.y.abs() < 1e-9;
    let (x, y, w, h, rotation) = if axis_aligned {
        let a = origin + dir.scale(u0);
        let b = origin + dir.scale(u1);
        let lift = outward.scale(depth);
        let xs = [a.x, b.x, a.x + lift.x, b.x + lift.x];
        let ys = [a.y, b.y, a.y + lift.y, b.y + lift.y];
        let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_y = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let max_y = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min_x, min_y, max_x - min_x, max_y - min_y, 0.0)
    } else {
        let anchor = origin + dir.scale(u0) + outward.scale(depth);
        (anchor.x, anchor.y, width, depth, dir.y.atan2(dir.x).to_degrees())
    };

    Tile {
        id: String::new(),
        x,
        y,
        width: w,
        height: h,
        rotation,
        is_partial,
        side: None,
        edge_index: None,
        origin: Default::default(),
        area_mm2: width * depth,
        cut_percentage: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn config() -> CopingConfig {
        CopingConfig::default().with_tile_size(400.0, 400.0).with_grout(0.0)
    }

    #[test]
    fn corner_classification() {
        // Clockwise on screen: right along the top, then down.
        let standard = classify_corner(Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0));
        assert_eq!(standard, CornerKind::Standard);
        let armpit = classify_corner(Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, -10.0));
        assert_eq!(armpit, CornerKind::Armpit);
        // Straight through counts as standard.
        let straight = classify_corner(Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(straight, CornerKind::Standard);
    }

    #[test]
    fn lay_span_end_strategy() {
        let pieces = lay_span(0.0, 1000.0, 400.0, 0.0, CutStrategy::End);
        assert_eq!(pieces, vec![(0.0, 400.0), (400.0, 800.0), (800.0, 1000.0)]);
    }

    #[test]
    fn lay_span_start_strategy() {
        let pieces = lay_span(0.0, 1000.0, 400.0, 0.0, CutStrategy::Start);
        assert_eq!(pieces, vec![(0.0, 200.0), (200.0, 600.0), (600.0, 1000.0)]);
    }

    #[test]
    fn lay_span_middle_strategy_is_symmetric() {
        let pieces = lay_span(0.0, 1000.0, 400.0, 0.0, CutStrategy::Middle);
        assert_eq!(pieces, vec![(0.0, 100.0), (100.0, 500.0), (500.0, 900.0), (900.0, 1000.0)]);
    }

    #[test]
    fn lay_span_respects_grout() {
        let pieces = lay_span(0.0, 1210.0, 400.0, 5.0, CutStrategy::End);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[1], (405.0, 805.0));
        assert_eq!(pieces[2], (810.0, 1210.0));
    }

    #[test]
    fn lay_span_drops_slivers() {
        // 800.5 leaves a 0.5 mm remainder, which is not a tile.
        let pieces = lay_span(0.0, 800.5, 400.0, 0.0, CutStrategy::End);
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn lay_span_shorter_than_one_tile() {
        let pieces = lay_span(0.0, 250.0, 400.0, 0.0, CutStrategy::Middle);
        assert_eq!(pieces, vec![(0.0, 250.0)]);
    }

    #[test]
    fn rectangle_spans_follow_hierarchy() {
        let pool = Rect::new(0.0, 0.0, 2000.0, 1000.0).to_points();
        let cfg = config().with_grout(5.0);
        let layout = solve_coping(&pool, &cfg);

        let top = &layout.edges[0];
        assert_eq!(top.axis, EdgeAxis::Horizontal);
        assert_eq!(top.side, Side::Top);
        assert_eq!(top.span_start, -400.0);
        assert_eq!(top.span_end, 2400.0);

        let right = &layout.edges[1];
        assert_eq!(right.axis, EdgeAxis::Perpendicular);
        assert_eq!(right.side, Side::Right);
        assert_eq!(right.span_start, 5.0);
        assert_eq!(right.span_end, 995.0);
    }

    #[test]
    fn rectangle_tiles_sit_outside_the_pool() {
        let pool = Rect::new(0.0, 0.0, 2000.0, 1200.0);
        let layout = solve_coping(&pool.to_points(), &config());
        assert!(!layout.tiles.is_empty());
        for tile in &layout.tiles {
            assert_eq!(tile.rotation, 0.0);
            assert!(tile.rect().overlap_area(&pool) < 1e-6, "{} overlaps the pool", tile.id);
        }
    }

    #[test]
    fn rectangle_tiles_do_not_overlap() {
        let pool = Rect::new(0.0, 0.0, 2100.0, 1300.0).to_points();
        let layout = solve_coping(&pool, &config().with_grout(5.0));
        for (i, a) in layout.tiles.iter().enumerate() {
            for b in &layout.tiles[i + 1..] {
                assert!(a.rect().overlap_area(&b.rect()) < 1e-6, "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn winding_does_not_change_the_layout() {
        let cw = Rect::new(0.0, 0.0, 3000.0, 1500.0).to_points();
        let mut ccw = cw.clone();
        ccw.reverse();
        ccw.rotate_left(2);
        assert_eq!(solve_coping(&cw, &config()), solve_coping(&ccw, &config()));
    }

    #[test]
    fn l_shape_armpit_is_covered_once() {
        // L-shaped pool with one reflex corner at (1000, 1000).
        let pool = vec![
            Point::new(0.0, 0.0),
            Point::new(1000.0, 0.0),
            Point::new(1000.0, 1000.0),
            Point::new(2000.0, 1000.0),
            Point::new(2000.0, 2000.0),
            Point::new(0.0, 2000.0),
        ];
        let layout = solve_coping(&pool, &config().with_grout(5.0));
        let armpits = layout
            .edges
            .iter()
            .filter(|e| e.start_corner == CornerKind::Armpit || e.end_corner == CornerKind::Armpit)
            .count();
        assert_eq!(armpits, 2);
        for (i, a) in layout.tiles.iter().enumerate() {
            for b in &layout.tiles[i + 1..] {
                assert!(a.rect().overlap_area(&b.rect()) < 1e-6, "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn flush_span_start_is_positive_zero() {
        let pool = vec![
            Point::new(0.0, 0.0),
            Point::new(1000.0, 0.0),
            Point::new(1000.0, 1000.0),
            Point::new(2000.0, 1000.0),
            Point::new(2000.0, 2000.0),
            Point::new(0.0, 2000.0),
        ];
        let layout = solve_coping(&pool, &config());
        let flush: Vec<_> = layout
            .edges
            .iter()
            .filter(|e| e.axis == EdgeAxis::Horizontal && e.start_corner == CornerKind::Armpit)
            .collect();
        assert!(!flush.is_empty());
        for edge in flush {
            assert_eq!(edge.span_start, 0.0);
            assert!(edge.span_start.is_sign_positive(), "edge {} starts at -0", edge.index);
            let json = serde_json::to_value(edge).unwrap();
            assert_eq!(json["spanStart"].to_string(), "0.0");
        }
    }

    #[test]
    fn diagonal_edges_are_rotated() {
        let pool = vec![Point::new(0.0, 0.0), Point::new(3000.0, 0.0), Point::new(0.0, 3000.0)];
        let layout = solve_coping(&pool, &config());
        let diagonal: Vec<_> = layout.tiles.iter().filter(|t| t.edge_index == Some(1)).collect();
        assert!(!diagonal.is_empty());
        for tile in diagonal {
            assert!((tile.rotation - 135.0).abs() < 1e-9);
        }
    }

    #[test]
    fn t_shape_detected_from_point_count() {
        assert_eq!(PoolShapeKind::detect(8), PoolShapeKind::TShaped);
        assert_eq!(PoolShapeKind::detect(4), PoolShapeKind::Rectangular);
        assert_eq!(PoolShapeKind::TShaped.strategy_for(2), CutStrategy::End);
        assert_eq!(PoolShapeKind::Custom(vec![CutStrategy::Start]).strategy_for(5), CutStrategy::Middle);
    }

    #[test]
    fn degenerate_outline_yields_empty_layout() {
        let line = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        let layout = solve_coping(&line, &config());
        assert!(layout.tiles.is_empty());
        assert_eq!(layout.stats.order_quantity, 0);
    }
}
