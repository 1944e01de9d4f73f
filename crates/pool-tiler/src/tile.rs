//! Tiles, layout statistics and the occupancy reservation set.
//!
//! A tile set is plain data: every solver call builds a fresh `Vec<Tile>`
//! and the caller swaps it in whole. Statistics are always derived from a
//! tile set, never stored next to it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Width deviation (mm) beyond which a coping tile counts as cut.
pub const PARTIAL_WIDTH_TOLERANCE: f64 = 1.0;

/// Overlap area (mm²) two reserved rects may share before they "collide".
///
/// Absorbs float noise along shared edges.
pub const OVERLAP_TOLERANCE_MM2: f64 = 1.0;

/// Cardinal side of a shape a tile belongs to (screen frame, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn all() -> &'static [Side] {
        &[Side::Top, Side::Right, Side::Bottom, Side::Left]
    }

    /// Unit vector pointing away from the shape on this side.
    pub fn outward(&self) -> Point {
        match self {
            Side::Top => Point::new(0.0, -1.0),
            Side::Bottom => Point::new(0.0, 1.0),
            Side::Left => Point::new(-1.0, 0.0),
            Side::Right => Point::new(1.0, 0.0),
        }
    }

    /// Side whose outward direction is closest to `normal`.
    pub fn from_normal(normal: Point) -> Side {
        if normal.x.abs() > normal.y.abs() {
            if normal.x > 0.0 { Side::Right } else { Side::Left }
        } else if normal.y > 0.0 {
            Side::Bottom
        } else {
            Side::Top
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Which process put a tile in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileOrigin {
    /// Produced by a coping or paving solve.
    #[default]
    Base,
    /// Placed by hand in the editor.
    UserAdded,
    /// Produced by boundary auto-extension.
    AutoExtended,
}

/// One rectangular tile or paver.
///
/// `(x, y)` is the top-left anchor in the tile's local frame; `rotation`
/// (degrees, clockwise on screen) turns that frame about the anchor. Tiles
/// on axis-aligned edges always have `rotation == 0.0` and are plain world
/// rects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    pub is_partial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Index of the outline edge a coping tile runs along.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_index: Option<usize>,
    #[serde(default)]
    pub origin: TileOrigin,
    /// Actual material area (mm²) after cutting.
    pub area_mm2: f64,
    /// Share of the nominal paver cut away, 0–100. Set on cut pavers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_percentage: Option<f64>,
}

impl Tile {
    /// An unrotated, uncut tile covering `rect`.
    pub fn from_rect(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rotation: 0.0,
            is_partial: false,
            side: None,
            edge_index: None,
            origin: TileOrigin::Base,
            area_mm2: rect.area(),
            cut_percentage: None,
        }
    }

    pub fn with_origin(mut self, origin: TileOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_partial(mut self, is_partial: bool) -> Self {
        self.is_partial = is_partial;
        self
    }

    /// The four corners in world coordinates, rotation applied.
    pub fn world_corners(&self) -> [Point; 4] {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let ux = Point::new(cos, sin);
        let uy = Point::new(-sin, cos);
        let anchor = Point::new(self.x, self.y);
        [
            anchor,
            anchor + ux.scale(self.width),
            anchor + ux.scale(self.width) + uy.scale(self.height),
            anchor + uy.scale(self.height),
        ]
    }

    /// World-space axis-aligned bounds.
    pub fn bounds(&self) -> Rect {
        if self.rotation == 0.0 {
            return self.rect();
        }
        let corners = self.world_corners();
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// The local (pre-rotation) rect.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Counts and quantities derived from a tile set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileStats {
    pub full_count: usize,
    pub partial_count: usize,
    /// Sum of actual (cut) tile areas, m².
    pub total_area_m2: f64,
    /// Tiles to purchase, wastage included.
    pub order_quantity: usize,
    pub wastage_percent: f64,
}

impl TileStats {
    /// Derive statistics from a tile set.
    ///
    /// `count_partials` decides whether cut tiles enter the order subtotal.
    pub fn from_tiles(tiles: &[Tile], wastage_percent: f64, count_partials: bool) -> Self {
        let partial_count = tiles.iter().filter(|t| t.is_partial).count();
        let full_count = tiles.len() - partial_count;
        let total_area_mm2: f64 = tiles.iter().map(|t| t.area_mm2).sum();

        let subtotal = if count_partials { full_count + partial_count } else { full_count };

        Self {
            full_count,
            partial_count,
            total_area_m2: total_area_mm2 / 1_000_000.0,
            order_quantity: order_quantity(subtotal, wastage_percent),
            wastage_percent,
        }
    }

    #[inline]
    pub fn total_count(&self) -> usize {
        self.full_count + self.partial_count
    }
}

/// `ceil(subtotal × (1 + wastage/100))`, never less than `subtotal`.
///
/// Computed as `subtotal × (100 + wastage) / 100` so whole-number results
/// (e.g. 100 at 10%) do not get bumped up by binary rounding.
pub fn order_quantity(subtotal: usize, wastage_percent: f64) -> usize {
    let wastage = wastage_percent.max(0.0);
    let exact = subtotal as f64 * (100.0 + wastage) / 100.0;
    let rounded = (exact - 1e-9).ceil().max(0.0) as usize;
    rounded.max(subtotal)
}

impl fmt::Display for TileStats {
    /// One-line materials summary, e.g.
    /// `100 full + 21 cut = 121 tiles, 16.81 m², order 134 (10% wastage)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} full + {} cut = {} tiles, {:.2} m², order {} ({}% wastage)",
            self.full_count,
            self.partial_count,
            self.total_count(),
            self.total_area_m2,
            self.order_quantity,
            self.wastage_percent
        )
    }
}

// ============================================================================
// OCCUPANCY (reservation set)
// ============================================================================

/// Spatial hash of occupied rects.
///
/// Lets incremental passes ask "is this spot taken?" without scanning every
/// tile placed so far. Rects are bucketed into every grid cell they touch.
#[derive(Debug, Clone)]
pub struct Occupancy {
    cell_size: f64,
    rects: Vec<Rect>,
    grid: HashMap<(i64, i64), Vec<usize>>,
}

impl Occupancy {
    /// Create an empty set; `cell_size` should be about one tile.
    pub fn new(cell_size: f64) -> Self {
        Self {
            // Avoid division by zero
            cell_size: cell_size.max(1.0),
            rects: Vec::new(),
            grid: HashMap::new(),
        }
    }

    /// Build a set pre-filled with the bounds of existing tiles.
    pub fn from_tiles(tiles: &[Tile], cell_size: f64) -> Self {
        let mut occupancy = Self::new(cell_size);
        for tile in tiles {
            occupancy.insert(tile.bounds());
        }
        occupancy
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn insert(&mut self, rect: Rect) {
        let index = self.rects.len();
        self.rects.push(rect);
        for cell in self.cells_for(&rect) {
            self.grid.entry(cell).or_default().push(index);
        }
    }

    /// Does `rect` overlap any reserved rect by more than [`OVERLAP_TOLERANCE_MM2`]?
    pub fn overlaps(&self, rect: &Rect) -> bool {
        self.cells_for(rect).any(|cell| {
            self.grid.get(&cell).is_some_and(|indices| {
                indices
                    .iter()
                    .any(|&i| self.rects[i].overlap_area(rect) > OVERLAP_TOLERANCE_MM2)
            })
        })
    }

    /// Reserve `rect` unless it collides; returns whether it was reserved.
    pub fn try_reserve(&mut self, rect: Rect) -> bool {
        if self.overlaps(&rect) {
            return false;
        }
        self.insert(rect);
        true
    }

    fn cells_for(&self, rect: &Rect) -> impl Iterator<Item = (i64, i64)> + use<> {
        let size = self.cell_size;
        let (x0, y0) = point_to_cell(rect.x, rect.y, size);
        let (x1, y1) = point_to_cell(rect.right(), rect.bottom(), size);
        (x0..=x1).flat_map(move |cx| (y0..=y1).map(move |cy| (cx, cy)))
    }
}

/// Convert a point to a grid cell coordinate.
#[inline]
fn point_to_cell(x: f64, y: f64, cell_size: f64) -> (i64, i64) {
    ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
}
