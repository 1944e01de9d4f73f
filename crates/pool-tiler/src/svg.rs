//! SVG import - pull pool outlines and boundaries out of a drawing.
//!
//! Uses usvg for complete SVG resolution (CSS, transforms, shapes to paths)
//! then walks the tree to extract closed outlines.
//!
//! usvg drops unknown attributes, so the `data-role` tags that say what an
//! outline *is* (`pool`, `boundary`, `site`, `exclude`) are read in a second,
//! streaming pass with quick-xml and joined back on element `id`. A role set
//! on a `<g>` applies to everything inside it.
//!
//! ## Curve Flattening
//!
//! Pool outlines are often drawn with rounded corners. Bézier segments are
//! flattened into line segments with lyon_geom before anything else sees
//! them.

use std::collections::HashMap;
use std::str::FromStr;

use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};
use tracing::debug;
use usvg::tiny_skia_path::PathSegment;

use crate::error::SvgError;
use crate::geometry::{Point, Polygon, simplify_polygon};

/// Tolerance for curve flattening, in SVG user units.
const CURVE_TOLERANCE: f32 = 0.1;

/// What an imported outline stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineRole {
    /// Pool waterline; gets coping and acts as an exclude zone for paving.
    Pool,
    /// Paving boundary.
    Boundary,
    /// Containing site boundary for auto-extension.
    Site,
    /// Any other area pavers must avoid.
    Exclude,
}

impl FromStr for OutlineRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pool" => Ok(OutlineRole::Pool),
            "boundary" | "paving" => Ok(OutlineRole::Boundary),
            "site" => Ok(OutlineRole::Site),
            "exclude" => Ok(OutlineRole::Exclude),
            other => Err(format!("unknown outline role '{}'", other)),
        }
    }
}

/// A closed outline from the drawing, in millimeters after scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<OutlineRole>,
    pub polygon: Polygon,
}

/// Extract every closed outline from an SVG document.
///
/// Coordinates are multiplied by `scale` (millimeters per SVG user unit).
/// Each subpath of a path becomes its own outline.
pub fn extract_outlines_from_svg(svg_content: &str, scale: f64) -> Result<Vec<Outline>, SvgError> {
    let roles = read_roles(svg_content)?;

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options)
        .map_err(|e| SvgError::Parse(e.to_string()))?;

    let mut outlines = Vec::new();
    collect_group(tree.root(), &roles, scale, &mut outlines);
    debug!(count = outlines.len(), tagged = roles.len(), "svg outlines extracted");

    if outlines.is_empty() {
        Err(SvgError::NoOutlines)
    } else {
        Ok(outlines)
    }
}

/// First outline with the given role, if any.
pub fn find_role(outlines: &[Outline], role: OutlineRole) -> Option<&Outline> {
    outlines.iter().find(|o| o.role == Some(role))
}

/// Effective `data-role` of every element that has an `id`.
pub fn read_roles(svg_content: &str) -> Result<HashMap<String, OutlineRole>, SvgError> {
    let mut reader = Reader::from_str(svg_content);
    reader.config_mut().trim_text(true);

    let mut roles = HashMap::new();
    // Inherited role per open element.
    let mut stack: Vec<Option<OutlineRole>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let role = element_role(e, stack.last().copied().flatten(), &mut roles)?;
                stack.push(role);
            }
            Ok(Event::Empty(ref e)) => {
                element_role(e, stack.last().copied().flatten(), &mut roles)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SvgError::Xml(format!(
                    "at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(roles)
}

/// Resolve an element's role and record it under the element's id.
fn element_role(
    e: &BytesStart<'_>,
    inherited: Option<OutlineRole>,
    roles: &mut HashMap<String, OutlineRole>,
) -> Result<Option<OutlineRole>, SvgError> {
    let mut id = None;
    let mut own = None;

    for attr in e.attributes().flatten() {
        let value = std::str::from_utf8(&attr.value).unwrap_or("");
        match attr.key.as_ref() {
            b"id" => id = Some(value.to_string()),
            b"data-role" => own = Some(value.parse::<OutlineRole>().map_err(SvgError::Xml)?),
            _ => {}
        }
    }

    let role = own.or(inherited);
    if let (Some(id), Some(role)) = (id, role) {
        roles.insert(id, role);
    }
    Ok(role)
}

fn collect_group(
    group: &usvg::Group,
    roles: &HashMap<String, OutlineRole>,
    scale: f64,
    outlines: &mut Vec<Outline>,
) {
    for child in group.children() {
        match child {
            usvg::Node::Group(g) => collect_group(g, roles, scale, outlines),
            usvg::Node::Path(path) => {
                let role = roles.get(path.id()).copied();
                let id = (!path.id().is_empty()).then(|| path.id().to_string());
                for points in path_to_subpaths(path, scale) {
                    outlines.push(Outline {
                        role,
                        polygon: Polygon::with_id(points, id.clone()),
                    });
                }
            }
            // Text, images and the rest carry no outlines.
            _ => {}
        }
    }
}

/// Flatten a usvg path (in absolute coordinates) into point rings.
fn path_to_subpaths(path: &usvg::Path, scale: f64) -> Vec<Vec<Point>> {
    let Some(data) = path.data().clone().transform(path.abs_transform()) else {
        return Vec::new();
    };

    let mut rings = Vec::new();
    let mut points: Vec<Point> = Vec::new();
    let mut last = point(0.0f32, 0.0f32);
    let to_mm = |x: f32, y: f32| Point::new(x as f64 * scale, y as f64 * scale);

    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                finish_ring(&mut points, &mut rings);
                points.push(to_mm(p.x, p.y));
                last = point(p.x, p.y);
            }
            PathSegment::LineTo(p) => {
                points.push(to_mm(p.x, p.y));
                last = point(p.x, p.y);
            }
            PathSegment::QuadTo(ctrl, p) => {
                let curve = QuadraticBezierSegment {
                    from: last,
                    ctrl: point(ctrl.x, ctrl.y),
                    to: point(p.x, p.y),
                };
                curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                    points.push(to_mm(line.to.x, line.to.y));
                });
                last = point(p.x, p.y);
            }
            PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                let curve = CubicBezierSegment {
                    from: last,
                    ctrl1: point(ctrl1.x, ctrl1.y),
                    ctrl2: point(ctrl2.x, ctrl2.y),
                    to: point(p.x, p.y),
                };
                curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                    points.push(to_mm(line.to.x, line.to.y));
                });
                last = point(p.x, p.y);
            }
            PathSegment::Close => finish_ring(&mut points, &mut rings),
        }
    }
    finish_ring(&mut points, &mut rings);

    rings
}

/// Move the current ring into `rings` if it still encloses something.
fn finish_ring(points: &mut Vec<Point>, rings: &mut Vec<Vec<Point>>) {
    if points.is_empty() {
        return;
    }
    let ring = simplify_polygon(points, 1e-6);
    points.clear();
    if ring.len() >= 3 {
        rings.push(ring);
    }
}
