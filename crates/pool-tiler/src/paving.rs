//! Paving fill engine - cover a boundary polygon with a paver grid.
//!
//! A grid of paver-sized cells is laid over the boundary's bounding box,
//! anchored so that repeated designs line up, then each cell is classified:
//!
//! - **excluded**: entirely inside an exclude zone (e.g. a pool) - dropped
//! - **full**: inside the boundary and clear of every exclude zone
//! - **cut**: anything else with material left; kept only when edge pavers
//!   are enabled
//!
//! Cut pavers carry their real (clipped) area so material totals reconcile
//! with the boundary's true area.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clip::{
    clipped_area, clipped_area_excluding, rect_fully_inside_polygon, rect_intersects_polygon,
};
use crate::error::{PavingError, ValidationError};
use crate::geometry::{
    Point, Rect, bounding_box_of_points, normalize_clockwise, polygon_area, simplify_polygon,
};
use crate::tile::{Tile, TileStats};

/// Smallest boundary area (mm²) worth paving: 0.01 m².
pub const MIN_AREA_MM2: f64 = 10_000.0;

/// Material area (mm²) below which a cell counts as empty.
pub const AREA_EPSILON: f64 = 1.0;

/// Distance under which boundary vertices are merged before filling.
const BOUNDARY_EPSILON: f64 = 0.5;

/// Where the paver grid is pinned.
///
/// Corner anchors put a full paver flush in that corner of the bounding
/// box; `Center` centers a paver on the box; `Origin` pins a cell corner
/// to an absolute point so separate areas share one grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridAnchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    Origin { x: f64, y: f64 },
}

/// Configuration for the paving fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PavingConfig {
    pub paver_width: f64,
    pub paver_height: f64,
    /// Gap between pavers (mm).
    pub grout: f64,
    /// Keep cut pavers along the boundary and around exclude zones.
    pub include_edge_pavers: bool,
    pub wastage_percent: f64,
    pub anchor: GridAnchor,
}

impl Default for PavingConfig {
    fn default() -> Self {
        Self {
            paver_width: 400.0,
            paver_height: 400.0,
            grout: 0.0,
            include_edge_pavers: true,
            wastage_percent: 10.0,
            anchor: GridAnchor::TopLeft,
        }
    }
}

impl PavingConfig {
    pub fn with_paver_size(mut self, width: f64, height: f64) -> Self {
        self.paver_width = width;
        self.paver_height = height;
        self
    }

    pub fn with_grout(mut self, grout: f64) -> Self {
        self.grout = grout;
        self
    }

    pub fn with_edge_pavers(mut self, include: bool) -> Self {
        self.include_edge_pavers = include;
        self
    }

    pub fn with_wastage(mut self, percent: f64) -> Self {
        self.wastage_percent = percent;
        self
    }

    pub fn with_anchor(mut self, anchor: GridAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    #[inline]
    pub fn paver_area(&self) -> f64 {
        self.paver_width * self.paver_height
    }
}

/// An area no paver may cover, such as a pool footprint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExcludeZone {
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ExcludeZone {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points, id: None }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.to_points())
    }

    fn bounds(&self) -> Option<Rect> {
        bounding_box_of_points(&self.points).map(Rect::from_bounds)
    }
}

/// UI-facing form of a validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self { valid: true, error: None },
            Err(e) => Self {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Result of [`fill_paving`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PavingLayout {
    pub tiles: Vec<Tile>,
    pub stats: TileStats,
    /// True (shoelace) area of the boundary, m².
    pub boundary_area_m2: f64,
    /// Cells dropped for lying inside an exclude zone.
    pub excluded_count: usize,
}

/// Can this boundary hold at least one paver?
pub fn validate_boundary(points: &[Point], config: &PavingConfig) -> Result<(), ValidationError> {
    let simplified = simplify_polygon(points, BOUNDARY_EPSILON);
    let area = polygon_area(&simplified);
    if simplified.len() < 3 || area == 0.0 {
        return Err(ValidationError::DegenerateBoundary {
            points: simplified.len(),
        });
    }

    let Some((min_x, min_y, max_x, max_y)) = bounding_box_of_points(&simplified) else {
        return Err(ValidationError::DegenerateBoundary { points: 0 });
    };
    let (width, height) = (max_x - min_x, max_y - min_y);
    if width < config.paver_width || height < config.paver_height {
        return Err(ValidationError::BoundaryTooSmall {
            width,
            height,
            paver_width: config.paver_width,
            paver_height: config.paver_height,
        });
    }

    if area < MIN_AREA_MM2 {
        return Err(ValidationError::AreaTooSmall {
            area_mm2: area,
            minimum_mm2: MIN_AREA_MM2,
        });
    }

    Ok(())
}

/// Top-left corner of the grid cell `(0, 0)` for a bounding box.
fn grid_origin(anchor: GridAnchor, bounds: &Rect, config: &PavingConfig) -> Point {
    let (pw, ph) = (config.paver_width, config.paver_height);
    match anchor {
        GridAnchor::TopLeft => Point::new(bounds.x, bounds.y),
        GridAnchor::TopRight => Point::new(bounds.right() - pw, bounds.y),
        GridAnchor::BottomLeft => Point::new(bounds.x, bounds.bottom() - ph),
        GridAnchor::BottomRight => Point::new(bounds.right() - pw, bounds.bottom() - ph),
        GridAnchor::Center => {
            let c = bounds.center();
            Point::new(c.x - pw / 2.0, c.y - ph / 2.0)
        }
        GridAnchor::Origin { x, y } => Point::new(x, y),
    }
}

/// Integer cell indices whose cells overlap `[lo, hi]` on one axis.
fn cell_range(lo: f64, hi: f64, origin: f64, size: f64, pitch: f64) -> std::ops::RangeInclusive<i64> {
    let first = ((lo - origin - size) / pitch).floor() as i64 + 1;
    let last = ((hi - origin) / pitch).ceil() as i64 - 1;
    first..=last
}

/// Fill a boundary with pavers.
///
/// Fails with [`PavingError::Validation`] when the boundary cannot hold a
/// paver and with [`PavingError::NothingFits`] when it can in principle but
/// no cell survives classification (e.g. exclude zones cover everything).
pub fn fill_paving(
    boundary: &[Point],
    config: &PavingConfig,
    exclude_zones: &[ExcludeZone],
) -> Result<PavingLayout, PavingError> {
    if let Err(e) = validate_boundary(boundary, config) {
        warn!(error = %e, "paving boundary rejected");
        return Err(e.into());
    }

    let boundary = normalize_clockwise(&simplify_polygon(boundary, BOUNDARY_EPSILON));
    let Some(bbox) = bounding_box_of_points(&boundary) else {
        return Err(ValidationError::DegenerateBoundary { points: 0 }.into());
    };
    let bounds = Rect::from_bounds(bbox);

    let (pw, ph) = (config.paver_width, config.paver_height);
    let pitch_x = pw + config.grout;
    let pitch_y = ph + config.grout;
    let origin = grid_origin(config.anchor, &bounds, config);

    let cols = cell_range(bounds.x, bounds.right(), origin.x, pw, pitch_x);
    let rows = cell_range(bounds.y, bounds.bottom(), origin.y, ph, pitch_y);
    debug!(
        cols = cols.clone().count(),
        rows = rows.clone().count(),
        zones = exclude_zones.len(),
        "paving grid"
    );

    let zones: Vec<(&ExcludeZone, Rect)> = exclude_zones
        .iter()
        .filter(|z| z.points.len() >= 3)
        .filter_map(|z| z.bounds().map(|b| (z, b)))
        .collect();

    let nominal = config.paver_area();
    let mut tiles = Vec::new();
    let mut excluded_count = 0;

    for (row, j) in rows.clone().enumerate() {
        for (col, i) in cols.clone().enumerate() {
            let cell = Rect::new(
                origin.x + i as f64 * pitch_x,
                origin.y + j as f64 * pitch_y,
                pw,
                ph,
            );

            let nearby: Vec<&ExcludeZone> = zones
                .iter()
                .filter(|(_, b)| b.overlap_area(&cell) > 0.0)
                .map(|(z, _)| *z)
                .collect();

            if nearby.iter().any(|z| rect_fully_inside_polygon(&cell, &z.points)) {
                excluded_count += 1;
                continue;
            }

            if !rect_intersects_polygon(&cell, &boundary) {
                continue;
            }

            let zone_overlap: f64 = nearby.iter().map(|z| clipped_area(&cell, &z.points)).sum();
            let id = format!("paver-{row}-{col}");

            if zone_overlap <= AREA_EPSILON && rect_fully_inside_polygon(&cell, &boundary) {
                tiles.push(Tile::from_rect(id, cell));
                continue;
            }

            let holes: Vec<&[Point]> = nearby.iter().map(|z| z.points.as_slice()).collect();
            let actual = clipped_area_excluding(&cell, &boundary, &holes);
            if actual <= AREA_EPSILON || !config.include_edge_pavers {
                continue;
            }

            let mut tile = Tile::from_rect(id, cell).with_partial(true);
            tile.area_mm2 = actual;
            tile.cut_percentage = Some(((1.0 - actual / nominal) * 100.0).clamp(0.0, 100.0));
            tiles.push(tile);
        }
    }

    if tiles.is_empty() {
        warn!("no pavers fit inside the boundary");
        return Err(PavingError::NothingFits);
    }

    let stats = TileStats::from_tiles(&tiles, config.wastage_percent, true);
    info!(
        full = stats.full_count,
        cut = stats.partial_count,
        excluded = excluded_count,
        area_m2 = stats.total_area_m2,
        "paving filled"
    );

    Ok(PavingLayout {
        tiles,
        stats,
        boundary_area_m2: polygon_area(&boundary) / 1_000_000.0,
        excluded_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point> {
        Rect::new(0.0, 0.0, size, size).to_points()
    }

    #[test]
    fn validation_rejects_small_boundary() {
        let result = validate_boundary(&square(300.0), &PavingConfig::default());
        assert!(matches!(result, Err(ValidationError::BoundaryTooSmall { .. })));

        let ui: ValidationResult = result.into();
        assert!(!ui.valid);
        assert!(!ui.error.unwrap_or_default().is_empty());
    }

    #[test]
    fn validation_rejects_degenerate_boundary() {
        let line = vec![Point::new(0.0, 0.0), Point::new(500.0, 0.0), Point::new(1000.0, 0.0)];
        let result = validate_boundary(&line, &PavingConfig::default());
        assert!(matches!(result, Err(ValidationError::DegenerateBoundary { .. })));
    }

    #[test]
    fn validation_rejects_tiny_area() {
        // A thin sliver whose box fits a 50 mm paver but encloses < 0.01 m².
        let sliver = vec![Point::new(0.0, 0.0), Point::new(300.0, 0.0), Point::new(0.0, 60.0)];
        let config = PavingConfig::default().with_paver_size(50.0, 50.0);
        let result = validate_boundary(&sliver, &config);
        assert!(matches!(result, Err(ValidationError::AreaTooSmall { .. })));
    }

    #[test]
    fn validation_accepts_reasonable_boundary() {
        let ui: ValidationResult = validate_boundary(&square(4000.0), &PavingConfig::default()).into();
        assert_eq!(ui, ValidationResult { valid: true, error: None });
    }

    #[test]
    fn cell_range_covers_bounds() {
        assert_eq!(cell_range(0.0, 4000.0, 0.0, 400.0, 400.0), 0..=9);
        assert_eq!(cell_range(0.0, 4100.0, 0.0, 400.0, 400.0), 0..=10);
        // Grid pinned right: cell 0 ends at the right edge.
        assert_eq!(cell_range(0.0, 1000.0, 600.0, 400.0, 400.0), -2..=0);
    }

    #[test]
    fn top_right_anchor_puts_full_paver_in_corner() {
        let config = PavingConfig::default().with_anchor(GridAnchor::TopRight);
        let layout = fill_paving(&Rect::new(0.0, 0.0, 1000.0, 400.0).to_points(), &config, &[]).unwrap();
        let rightmost = layout
            .tiles
            .iter()
            .max_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap();
        assert_eq!(rightmost.x + rightmost.width, 1000.0);
        assert!(!rightmost.is_partial);
        let leftmost = layout.tiles.iter().min_by(|a, b| a.x.total_cmp(&b.x)).unwrap();
        assert!(leftmost.is_partial);
        assert!((leftmost.area_mm2 - 200.0 * 400.0).abs() < 1e-6);
    }

    #[test]
    fn grout_spaces_the_grid() {
        let config = PavingConfig::default().with_grout(10.0).with_edge_pavers(false);
        let layout = fill_paving(&square(1230.0), &config, &[]).unwrap();
        assert_eq!(layout.stats.full_count, 9);
        assert!(layout.tiles.iter().any(|t| t.x == 410.0 && t.y == 820.0));
    }

    #[test]
    fn exclude_zone_removes_and_cuts_pavers() {
        let pool = ExcludeZone::from_rect(&Rect::new(800.0, 800.0, 1000.0, 1000.0));
        let layout = fill_paving(&square(4000.0), &PavingConfig::default(), &[pool]).unwrap();

        // Cells 2..4 × 2..4 are inside the pool; cells touching its far
        // edge are cut down to 200 mm.
        assert_eq!(layout.excluded_count, 4);
        let cut: Vec<_> = layout.tiles.iter().filter(|t| t.is_partial).collect();
        assert_eq!(cut.len(), 5);
        let total_mm2: f64 = layout.tiles.iter().map(|t| t.area_mm2).sum();
        assert!((total_mm2 - (16_000_000.0 - 1_000_000.0)).abs() < 1.0);
    }

    #[test]
    fn overlapping_zones_are_subtracted_once() {
        let zones = [
            ExcludeZone::from_rect(&Rect::new(500.0, 500.0, 600.0, 600.0)),
            ExcludeZone::from_rect(&Rect::new(700.0, 700.0, 600.0, 600.0)),
        ];
        let layout = fill_paving(&square(2000.0), &PavingConfig::default(), &zones).unwrap();

        // Union of the zones: 2 × 600² − 400².
        let union = 2.0 * 360_000.0 - 160_000.0;
        let total_mm2: f64 = layout.tiles.iter().map(|t| t.area_mm2).sum();
        assert!((total_mm2 - (4_000_000.0 - union)).abs() < 1e-3, "got {}", total_mm2);
        assert!((layout.stats.total_area_m2 - 3.44).abs() < 1e-6);

        // Cell (800, 400): zone one takes 300 × 300, zone two 400 × 100,
        // and 300 × 100 of that is shared.
        let shared = layout.tiles.iter().find(|t| t.x == 800.0 && t.y == 400.0).unwrap();
        assert!((shared.area_mm2 - (160_000.0 - 100_000.0)).abs() < 1e-3);
    }

    #[test]
    fn cut_percentage_is_share_removed() {
        let layout = fill_paving(&Rect::new(0.0, 0.0, 500.0, 400.0).to_points(), &PavingConfig::default(), &[])
            .unwrap();
        let cut = layout.tiles.iter().find(|t| t.is_partial).unwrap();
        assert!((cut.cut_percentage.unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn fully_excluded_boundary_reports_nothing_fits() {
        let zone = ExcludeZone::from_rect(&Rect::new(-10.0, -10.0, 1020.0, 1020.0));
        let result = fill_paving(&square(1000.0), &PavingConfig::default(), &[zone]);
        assert_eq!(result, Err(PavingError::NothingFits));
    }

    #[test]
    fn concave_boundary_cuts_the_notch() {
        // 1200 square with the top-right 400 square notched out.
        let boundary = vec![
            Point::new(0.0, 0.0),
            Point::new(800.0, 0.0),
            Point::new(800.0, 400.0),
            Point::new(1200.0, 400.0),
            Point::new(1200.0, 1200.0),
            Point::new(0.0, 1200.0),
        ];
        let layout = fill_paving(&boundary, &PavingConfig::default(), &[]).unwrap();
        assert_eq!(layout.stats.full_count, 8);
        assert_eq!(layout.stats.partial_count, 0);
        assert!((layout.boundary_area_m2 - 1.28).abs() < 1e-9);
    }
}
