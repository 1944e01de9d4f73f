//! # pool-tiler
//!
//! Tile-layout geometry kernel for pool coping and landscape paving.
//!
//! Every engine is a pure function: outline and config in, a fresh tile set
//! out. Nothing here holds state between calls except [`session`], which
//! only stores what the caller hands it.
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Unlike Node.js, you must explicitly declare every module.

pub mod clip;
pub mod coping;
pub mod error;
pub mod extend;
pub mod geometry;
pub mod paving;
pub mod session;
pub mod snap;
pub mod svg;
pub mod tile;

// Re-export common types at crate root for convenience.
pub use clip::{
    clamp_point_to_polygon, clip_polygon, is_point_near_polygon_boundary, point_in_polygon,
    rect_fully_inside_polygon, rect_intersects_polygon, segments_intersect,
};
pub use coping::{CopingConfig, CopingLayout, CutStrategy, PoolShapeKind, solve_coping};
pub use error::{PavingError, SvgError, ValidationError};
pub use extend::{Extension, ExtensionConfig, ExtensionInput, extend_to_boundary};
pub use geometry::{Point, Polygon, Rect, simplify_polygon};
pub use paving::{
    ExcludeZone, GridAnchor, PavingConfig, PavingLayout, ValidationResult, fill_paving,
    validate_boundary,
};
pub use session::LayoutSession;
pub use snap::{boundary_key, snap_point, snap_value};
pub use svg::{Outline, OutlineRole, extract_outlines_from_svg};
pub use tile::{Side, Tile, TileOrigin, TileStats};
