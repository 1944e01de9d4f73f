//! Error types for pool-tiler.
//!
//! Geometry predicates never fail (they fall back to conservative defaults),
//! so only the engines that can legitimately refuse work have error types.

use thiserror::Error;

/// A paving boundary that cannot hold a layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Bounding box narrower or shorter than a single paver.
    #[error(
        "boundary is {width:.0}×{height:.0} mm, smaller than one {paver_width:.0}×{paver_height:.0} mm paver"
    )]
    BoundaryTooSmall {
        width: f64,
        height: f64,
        paver_width: f64,
        paver_height: f64,
    },

    /// Enclosed area below the minimum worth paving.
    #[error("boundary area {area_mm2:.0} mm² is below the minimum of {minimum_mm2:.0} mm²")]
    AreaTooSmall { area_mm2: f64, minimum_mm2: f64 },

    /// Fewer than 3 distinct points, or no enclosed area at all.
    #[error("boundary is degenerate ({points} usable points)")]
    DegenerateBoundary { points: usize },
}

/// Errors from the paving fill engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PavingError {
    #[error("invalid boundary: {0}")]
    Validation(#[from] ValidationError),

    /// The boundary is valid but no paver could be placed in it.
    #[error("no pavers fit inside the boundary")]
    NothingFits,
}

/// Errors from SVG outline import.
#[derive(Error, Debug)]
pub enum SvgError {
    #[error("SVG parse error: {0}")]
    Parse(String),

    #[error("SVG markup error: {0}")]
    Xml(String),

    #[error("no closed outlines found in SVG")]
    NoOutlines,
}
