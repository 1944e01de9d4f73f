//! Boundary auto-extension - grow an existing layout after a boundary edit.
//!
//! When the user drags a boundary vertex outward, re-solving from scratch
//! would throw away hand-placed tiles. Instead the outermost row on each
//! side is copied outward, one step at a time, until the copies leave the
//! boundary. A second pass fills the corner quadrants that a one-axis sweep
//! cannot reach.
//!
//! Everything placed (base tiles, then each new tile) goes into an
//! [`Occupancy`] set so no spot is ever claimed twice.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clip::{clipped_area, rect_fully_inside_polygon, rect_intersects_polygon};
use crate::coping::CopingConfig;
use crate::geometry::{Point, Rect, bounding_box_of_points, normalize_clockwise, simplify_polygon};
use crate::paving::PavingConfig;
use crate::snap::boundary_key;
use crate::tile::{Occupancy, Side, Tile, TileOrigin};

/// Upper bound on outward steps per tile (and grid cells per corner axis).
pub const MAX_STEPS: usize = 1000;

/// Tolerance (mm) for "on the outermost row".
pub const ROW_TOLERANCE: f64 = 1.0;

/// Clipped area (mm²) a candidate needs to count as inside a boundary.
const AREA_EPSILON: f64 = 1.0;

/// Cell geometry used when stepping tiles outward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionConfig {
    /// Horizontal extent of one step (mm).
    pub cell_width: f64,
    /// Vertical extent of one step (mm).
    pub cell_height: f64,
    pub grout: f64,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self::for_coping(&CopingConfig::default())
    }
}

impl ExtensionConfig {
    /// Coping rows grow by whole tile depths in both directions.
    pub fn for_coping(config: &CopingConfig) -> Self {
        Self {
            cell_width: config.tile_depth,
            cell_height: config.tile_depth,
            grout: config.grout,
        }
    }

    pub fn for_paving(config: &PavingConfig) -> Self {
        Self {
            cell_width: config.paver_width,
            cell_height: config.paver_height,
            grout: config.grout,
        }
    }

    #[inline]
    fn pitch_x(&self) -> f64 {
        self.cell_width + self.grout
    }

    #[inline]
    fn pitch_y(&self) -> f64 {
        self.cell_height + self.grout
    }
}

/// Everything the extension pass reads. Nothing here is modified.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionInput<'a> {
    /// Current layout, including user-added tiles.
    pub base_tiles: &'a [Tile],
    /// The edited boundary.
    pub boundary: &'a [Point],
    /// The boundary as first initialized, before any user edit.
    pub initial_boundary: &'a [Point],
    /// Containing site boundary, if any.
    pub site_boundary: Option<&'a [Point]>,
    /// Interior no tile may overlap (the pool cavity).
    pub cavity: Option<&'a [Point]>,
}

/// Tiles added by one extension pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub added: Vec<Tile>,
    /// Memo key of the boundary this extension was computed for.
    pub boundary_key: String,
}

impl Extension {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

/// Four corners of the base layout, as (name, x direction, y direction).
const CORNERS: [(&str, f64, f64); 4] = [
    ("top-left", -1.0, -1.0),
    ("top-right", 1.0, -1.0),
    ("bottom-right", 1.0, 1.0),
    ("bottom-left", -1.0, 1.0),
];

/// The boundaries a candidate is tested against.
struct Bounds<'a> {
    local: Vec<Point>,
    global: Option<&'a [Point]>,
    cavity: Option<&'a [Point]>,
}

impl Bounds<'_> {
    fn within(rect: &Rect, polygon: &[Point]) -> bool {
        rect_intersects_polygon(rect, polygon) && clipped_area(rect, polygon) > AREA_EPSILON
    }

    /// Does the candidate still reach into the local and global boundary?
    fn accepts(&self, rect: &Rect) -> bool {
        Self::within(rect, &self.local) && self.global.is_none_or(|g| Self::within(rect, g))
    }

    fn hits_cavity(&self, rect: &Rect) -> bool {
        self.cavity
            .is_some_and(|c| c.len() >= 3 && clipped_area(rect, c) > AREA_EPSILON)
    }

    fn fully_inside(&self, rect: &Rect) -> bool {
        rect_fully_inside_polygon(rect, &self.local)
            && self.global.is_none_or(|g| rect_fully_inside_polygon(rect, g))
    }

    /// Material left after cutting to both boundaries.
    ///
    /// Uses the smaller of the two clipped areas rather than the area of the
    /// true three-way intersection.
    fn material_area(&self, rect: &Rect) -> f64 {
        let local = clipped_area(rect, &self.local);
        match self.global {
            Some(g) => local.min(clipped_area(rect, g)),
            None => local,
        }
    }
}

/// Extend the outermost rows of `input.base_tiles` out to `input.boundary`.
///
/// Returns no tiles (not an error) when the boundary is unchanged from its
/// initial shape, degenerate, or when there is nothing to extend.
pub fn extend_to_boundary(input: &ExtensionInput<'_>, config: &ExtensionConfig) -> Extension {
    let key = boundary_key(input.boundary);
    let empty = || Extension {
        added: Vec::new(),
        boundary_key: key.clone(),
    };

    if key == boundary_key(input.initial_boundary) {
        debug!("boundary unedited, no extension");
        return empty();
    }

    let local = normalize_clockwise(&simplify_polygon(input.boundary, 0.5));
    let Some(reach) = bounding_box_of_points(&local).map(Rect::from_bounds) else {
        return empty();
    };
    if local.len() < 3 || reach.area() == 0.0 {
        debug!(points = local.len(), "degenerate boundary, no extension");
        return empty();
    }

    let base: Vec<&Tile> = input.base_tiles.iter().filter(|t| t.rotation == 0.0).collect();
    let Some(base_bounds) = bounds_of(&base) else {
        debug!("no axis-aligned base tiles, no extension");
        return empty();
    };

    let bounds = Bounds {
        local,
        global: input.site_boundary.filter(|g| g.len() >= 3),
        cavity: input.cavity,
    };
    let mut occupancy = Occupancy::from_tiles(
        input.base_tiles,
        config.cell_width.max(config.cell_height),
    );
    let mut added = Vec::new();

    for &side in Side::all() {
        let before = added.len();
        let mut row = outermost_row(&base, side, &base_bounds);
        sort_along(&mut row, side);

        for tile in row {
            for step in 1..=MAX_STEPS {
                let candidate = step_outward(&tile.rect(), side, step, config);
                if !bounds.accepts(&candidate) {
                    break;
                }
                if bounds.hits_cavity(&candidate) || !occupancy.try_reserve(candidate) {
                    continue;
                }
                let id = format!("ext-{}-{}", side.name(), added.len() - before);
                let new_tile = make_tile(id, candidate, &bounds, config, tile.is_partial);
                added.push(new_tile.with_side(side));
            }
        }
        debug!(side = side.name(), added = added.len() - before, "side extended");
    }

    for (name, sx, sy) in CORNERS {
        let before = added.len();
        let corner = Point::new(
            if sx < 0.0 { base_bounds.x } else { base_bounds.right() },
            if sy < 0.0 { base_bounds.y } else { base_bounds.bottom() },
        );
        let columns = steps_to_reach(corner.x, sx, &reach, config.pitch_x(), config.cell_width, true);
        let rows = steps_to_reach(corner.y, sy, &reach, config.pitch_y(), config.cell_height, false);

        for b in 1..=rows {
            for a in 1..=columns {
                let candidate = corner_cell(corner, sx, sy, a, b, config);
                if !bounds.accepts(&candidate) || bounds.hits_cavity(&candidate) {
                    continue;
                }
                if !occupancy.try_reserve(candidate) {
                    continue;
                }
                let id = format!("ext-{}-{}", name, added.len() - before);
                added.push(make_tile(id, candidate, &bounds, config, false));
            }
        }
        debug!(corner = name, added = added.len() - before, "corner filled");
    }

    info!(added = added.len(), "extension complete");
    Extension {
        added,
        boundary_key: key,
    }
}

/// World bounds of a set of unrotated tiles.
fn bounds_of(tiles: &[&Tile]) -> Option<Rect> {
    let points: Vec<Point> = tiles.iter().flat_map(|t| t.rect().corners()).collect();
    bounding_box_of_points(&points).map(Rect::from_bounds)
}

/// Tiles whose outward face sits on the layout's extremum for `side`.
fn outermost_row<'a>(tiles: &[&'a Tile], side: Side, bounds: &Rect) -> Vec<&'a Tile> {
    tiles
        .iter()
        .copied()
        .filter(|t| {
            let r = t.rect();
            let (face, extremum) = match side {
                Side::Top => (r.y, bounds.y),
                Side::Bottom => (r.bottom(), bounds.bottom()),
                Side::Left => (r.x, bounds.x),
                Side::Right => (r.right(), bounds.right()),
            };
            (face - extremum).abs() <= ROW_TOLERANCE
        })
        .collect()
}

fn sort_along(row: &mut [&Tile], side: Side) {
    match side {
        Side::Top | Side::Bottom => row.sort_by(|a, b| a.x.total_cmp(&b.x)),
        Side::Left | Side::Right => row.sort_by(|a, b| a.y.total_cmp(&b.y)),
    }
}

/// Copy of `rect` moved `step` cells outward on `side`.
///
/// The stepping axis takes the configured cell extent; the other axis keeps
/// the source tile's extent so cut tiles stay cut along the row. The seed
/// cell shares the source tile's outward face, so one pitch along
/// [`Side::outward`] lands the first copy one grout gap past it.
fn step_outward(rect: &Rect, side: Side, step: usize, config: &ExtensionConfig) -> Rect {
    let (seed, pitch) = match side {
        Side::Top => (
            Rect::new(rect.x, rect.y, rect.width, config.cell_height),
            config.pitch_y(),
        ),
        Side::Bottom => (
            Rect::new(rect.x, rect.bottom() - config.cell_height, rect.width, config.cell_height),
            config.pitch_y(),
        ),
        Side::Left => (
            Rect::new(rect.x, rect.y, config.cell_width, rect.height),
            config.pitch_x(),
        ),
        Side::Right => (
            Rect::new(rect.right() - config.cell_width, rect.y, config.cell_width, rect.height),
            config.pitch_x(),
        ),
    };
    let offset = side.outward().scale(step as f64 * pitch);
    seed.translate(offset.x, offset.y)
}

/// Number of grid steps from `from` in direction `dir` until past `reach`.
fn steps_to_reach(from: f64, dir: f64, reach: &Rect, pitch: f64, size: f64, horizontal: bool) -> usize {
    let (lo, hi) = if horizontal {
        (reach.x, reach.right())
    } else {
        (reach.y, reach.bottom())
    };
    let distance = if dir < 0.0 { from - lo } else { hi - from };
    if distance <= 0.0 || pitch <= 0.0 {
        return 0;
    }
    // A cell is still useful while its inner edge is short of the reach.
    let steps = ((distance - (pitch - size)) / pitch).ceil().max(0.0) as usize;
    steps.min(MAX_STEPS)
}

/// Grid cell `(a, b)` (1-based, counted outward) off a base corner.
fn corner_cell(corner: Point, sx: f64, sy: f64, a: usize, b: usize, config: &ExtensionConfig) -> Rect {
    let x = if sx < 0.0 {
        corner.x - a as f64 * config.pitch_x()
    } else {
        corner.x + config.grout + (a - 1) as f64 * config.pitch_x()
    };
    let y = if sy < 0.0 {
        corner.y - b as f64 * config.pitch_y()
    } else {
        corner.y + config.grout + (b - 1) as f64 * config.pitch_y()
    };
    Rect::new(x, y, config.cell_width, config.cell_height)
}

/// A new auto-extended tile; copies of cut tiles stay cut.
fn make_tile(
    id: String,
    rect: Rect,
    bounds: &Bounds<'_>,
    config: &ExtensionConfig,
    source_partial: bool,
) -> Tile {
    let mut tile = Tile::from_rect(id, rect)
        .with_origin(TileOrigin::AutoExtended)
        .with_partial(source_partial);
    if !bounds.fully_inside(&rect) {
        let area = bounds.material_area(&rect);
        let nominal = config.cell_width * config.cell_height;
        tile.is_partial = true;
        tile.area_mm2 = area;
        if nominal > 0.0 {
            tile.cut_percentage = Some(((1.0 - area / nominal) * 100.0).clamp(0.0, 100.0));
        }
    }
    tile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coping::solve_coping;

    fn coping_config() -> CopingConfig {
        CopingConfig::default().with_tile_size(400.0, 400.0).with_grout(0.0)
    }

    fn pool() -> Vec<Point> {
        Rect::new(0.0, 0.0, 2000.0, 1000.0).to_points()
    }

    /// Outer edge of the coping ring around [`pool`].
    fn initial() -> Vec<Point> {
        Rect::new(-400.0, -400.0, 2800.0, 1800.0).to_points()
    }

    #[test]
    fn unedited_boundary_adds_nothing() {
        let (pool, initial) = (pool(), initial());
        let layout = solve_coping(&pool, &coping_config());
        let input = ExtensionInput {
            base_tiles: &layout.tiles,
            boundary: &initial,
            initial_boundary: &initial,
            site_boundary: None,
            cavity: Some(pool.as_slice()),
        };
        let ext = extend_to_boundary(&input, &ExtensionConfig::for_coping(&coping_config()));
        assert!(ext.is_empty());
        assert_eq!(ext.boundary_key, boundary_key(&initial));
    }

    #[test]
    fn empty_base_adds_nothing() {
        let (dragged, initial) = (Rect::new(-800.0, -800.0, 3600.0, 2600.0).to_points(), initial());
        let input = ExtensionInput {
            base_tiles: &[],
            boundary: &dragged,
            initial_boundary: &initial,
            site_boundary: None,
            cavity: None,
        };
        assert!(extend_to_boundary(&input, &ExtensionConfig::default()).is_empty());
    }

    #[test]
    fn degenerate_boundary_adds_nothing() {
        let (pool, initial) = (pool(), initial());
        let layout = solve_coping(&pool, &coping_config());
        let line = vec![Point::new(0.0, -500.0), Point::new(1000.0, -500.0)];
        let input = ExtensionInput {
            base_tiles: &layout.tiles,
            boundary: &line,
            initial_boundary: &initial,
            site_boundary: None,
            cavity: None,
        };
        assert!(extend_to_boundary(&input, &ExtensionConfig::default()).is_empty());
    }

    #[test]
    fn top_drag_adds_rows_above() {
        let (pool, initial) = (pool(), initial());
        let layout = solve_coping(&pool, &coping_config());
        let dragged = Rect::new(-400.0, -1000.0, 2800.0, 2400.0).to_points();
        let input = ExtensionInput {
            base_tiles: &layout.tiles,
            boundary: &dragged,
            initial_boundary: &initial,
            site_boundary: None,
            cavity: Some(pool.as_slice()),
        };
        let ext = extend_to_boundary(&input, &ExtensionConfig::for_coping(&coping_config()));

        // Seven tiles in the top row, each stepped twice; the second row is cut.
        assert_eq!(ext.added.len(), 14);
        assert_eq!(ext.added.iter().filter(|t| t.is_partial).count(), 7);
        assert!(ext.added.iter().all(|t| t.origin == TileOrigin::AutoExtended));
        assert!(ext.added.iter().all(|t| t.side == Some(Side::Top)));
        for (i, added) in ext.added.iter().enumerate() {
            for base in &layout.tiles {
                assert!(added.rect().overlap_area(&base.rect()) < 1e-6);
            }
            for other in &ext.added[i + 1..] {
                assert!(added.rect().overlap_area(&other.rect()) < 1e-6);
            }
        }
    }

    #[test]
    fn site_boundary_caps_the_extension() {
        let (pool, initial) = (pool(), initial());
        let layout = solve_coping(&pool, &coping_config());
        let dragged = Rect::new(-400.0, -1200.0, 2800.0, 2600.0).to_points();
        let site = Rect::new(-400.0, -800.0, 2800.0, 2200.0).to_points();
        let input = ExtensionInput {
            base_tiles: &layout.tiles,
            boundary: &dragged,
            initial_boundary: &initial,
            site_boundary: Some(site.as_slice()),
            cavity: Some(pool.as_slice()),
        };
        let ext = extend_to_boundary(&input, &ExtensionConfig::for_coping(&coping_config()));
        assert_eq!(ext.added.len(), 7);
        assert!(ext.added.iter().all(|t| !t.is_partial));
    }

    #[test]
    fn corner_infill_fills_the_diagonal() {
        let (pool, initial) = (pool(), initial());
        let layout = solve_coping(&pool, &coping_config());
        let dragged = Rect::new(-400.0, -800.0, 3200.0, 2200.0).to_points();
        let input = ExtensionInput {
            base_tiles: &layout.tiles,
            boundary: &dragged,
            initial_boundary: &initial,
            site_boundary: None,
            cavity: Some(pool.as_slice()),
        };
        let ext = extend_to_boundary(&input, &ExtensionConfig::for_coping(&coping_config()));

        let corner: Vec<_> = ext.added.iter().filter(|t| t.id.starts_with("ext-top-right")).collect();
        assert_eq!(corner.len(), 1);
        assert_eq!(corner[0].rect(), Rect::new(2400.0, -800.0, 400.0, 400.0));
        // 7 above the top row, 6 beside the right column, 1 in the corner.
        assert_eq!(ext.added.len(), 14);
    }

    #[test]
    fn extension_is_deterministic() {
        let (pool, initial) = (pool(), initial());
        let layout = solve_coping(&pool, &coping_config());
        let dragged = vec![
            Point::new(-400.0, -1300.0),
            Point::new(3300.0, -400.0),
            Point::new(2400.0, 1400.0),
            Point::new(-400.0, 1400.0),
        ];
        let input = ExtensionInput {
            base_tiles: &layout.tiles,
            boundary: &dragged,
            initial_boundary: &initial,
            site_boundary: None,
            cavity: Some(pool.as_slice()),
        };
        let config = ExtensionConfig::for_coping(&coping_config());
        assert_eq!(extend_to_boundary(&input, &config), extend_to_boundary(&input, &config));
    }

    #[test]
    fn exposed_cavity_is_stepped_over() {
        let paving = PavingConfig::default();
        let square = Rect::new(0.0, 0.0, 2000.0, 2000.0).to_points();
        let layout = crate::paving::fill_paving(&square, &paving, &[]).unwrap();
        // Sits just right of the base layout, in the path of the right column.
        let cavity = Rect::new(2400.0, 400.0, 400.0, 800.0).to_points();
        let dragged = Rect::new(0.0, 0.0, 3600.0, 2000.0).to_points();
        let config = ExtensionConfig::for_paving(&paving);

        let open = ExtensionInput {
            base_tiles: &layout.tiles,
            boundary: &dragged,
            initial_boundary: &square,
            site_boundary: None,
            cavity: None,
        };
        assert_eq!(extend_to_boundary(&open, &config).added.len(), 20);

        let input = ExtensionInput {
            cavity: Some(cavity.as_slice()),
            ..open
        };
        let ext = extend_to_boundary(&input, &config);

        // Rows at y = 400 and 800 skip the cavity cell and carry on past it.
        assert_eq!(ext.added.len(), 18);
        assert!(ext.added.iter().any(|t| t.rect() == Rect::new(2800.0, 400.0, 400.0, 400.0)));
        for (i, added) in ext.added.iter().enumerate() {
            assert!(clipped_area(&added.rect(), &cavity) <= AREA_EPSILON, "{} hits the cavity", added.id);
            for base in &layout.tiles {
                assert!(added.rect().overlap_area(&base.rect()) < 1e-6);
            }
            for other in &ext.added[i + 1..] {
                assert!(added.rect().overlap_area(&other.rect()) < 1e-6, "{} overlaps {}", added.id, other.id);
            }
        }
    }

    #[test]
    fn stepping_keeps_the_grout_gap() {
        let config = ExtensionConfig {
            cell_width: 400.0,
            cell_height: 300.0,
            grout: 10.0,
        };
        let tile = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(step_outward(&tile, Side::Top, 1, &config), Rect::new(0.0, -310.0, 200.0, 300.0));
        assert_eq!(step_outward(&tile, Side::Bottom, 2, &config), Rect::new(0.0, 420.0, 200.0, 300.0));
        assert_eq!(step_outward(&tile, Side::Left, 1, &config), Rect::new(-410.0, 0.0, 400.0, 100.0));
        assert_eq!(step_outward(&tile, Side::Right, 1, &config), Rect::new(210.0, 0.0, 400.0, 100.0));
    }

    #[test]
    fn steps_to_reach_counts_cells() {
        let reach = Rect::new(-1000.0, -1000.0, 3000.0, 3000.0);
        // From x = 0 leftward: cells at -400, -800, -1200 (the last still overlaps).
        assert_eq!(steps_to_reach(0.0, -1.0, &reach, 400.0, 400.0, true), 3);
        assert_eq!(steps_to_reach(2000.0, 1.0, &reach, 400.0, 400.0, true), 0);
    }
}
