//! Common utilities shared across CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;

use pool_tiler::geometry::bounding_box_of_points;
use pool_tiler::{Point, Tile, TileOrigin};

/// Output format for layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Svg,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => bail!("unknown format '{}'. Use 'svg', 'json' or 'yaml'.", other),
        }
    }
}

/// Arguments every job-driven command accepts.
#[derive(Debug, Clone)]
pub struct CommandArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Millimeters per SVG unit (import only).
    pub scale: f64,
}

impl CommandArgs {
    /// Parse `<input> [-o FILE] [-f FORMAT] [--json] [--scale N] [-v]`.
    pub fn parse(args: &[String], default_format: OutputFormat) -> Result<Self> {
        let mut input: Option<PathBuf> = None;
        let mut output = None;
        let mut format = default_format;
        let mut scale = 1.0;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-o" | "--output" => {
                    i += 1;
                    output = Some(PathBuf::from(value_of(args, i, "--output")?));
                }
                "-f" | "--format" => {
                    i += 1;
                    format = OutputFormat::from_name(value_of(args, i, "--format")?)?;
                }
                "--json" => format = OutputFormat::Json,
                "--svg" => format = OutputFormat::Svg,
                "--scale" => {
                    i += 1;
                    let raw = value_of(args, i, "--scale")?;
                    scale = raw
                        .parse()
                        .with_context(|| format!("invalid --scale value '{}'", raw))?;
                }
                // Handled globally in main.
                "-v" | "--verbose" => {}
                arg if arg.starts_with('-') => bail!("unknown option '{}'", arg),
                arg => {
                    if input.is_some() {
                        bail!("unexpected extra argument '{}'", arg);
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
            i += 1;
        }

        let Some(input) = input else {
            bail!("missing input file");
        };

        Ok(Self {
            input,
            output,
            format,
            scale,
        })
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    match args.get(i) {
        Some(value) => Ok(value.as_str()),
        None => bail!("{} needs a value", flag),
    }
}

/// Write to the output file, or stdout when none was given.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "output written");
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Serialize a value in the requested text format.
pub fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        _ => Ok(serde_json::to_string_pretty(value)? + "\n"),
    }
}

/// An outline to draw underneath the tiles.
pub struct StyledOutline<'a> {
    pub id: &'a str,
    pub points: &'a [Point],
    pub color: &'a str,
}

const FULL_FILL: &str = "#d9d4c7";
const CUT_FILL: &str = "#e8a87c";
const EXTENDED_FILL: &str = "#9cc5a1";

fn tile_fill(tile: &Tile) -> &'static str {
    match (tile.origin, tile.is_partial) {
        (TileOrigin::AutoExtended, _) => EXTENDED_FILL,
        (_, true) => CUT_FILL,
        (_, false) => FULL_FILL,
    }
}

/// Render tiles (full vs cut vs auto-extended colours) and outlines to SVG.
///
/// One SVG user unit is one millimeter.
pub fn tiles_to_svg(tiles: &[Tile], outlines: &[StyledOutline<'_>]) -> String {
    let mut all: Vec<Point> = tiles.iter().flat_map(|t| t.world_corners()).collect();
    for outline in outlines {
        all.extend_from_slice(outline.points);
    }
    let (min_x, min_y, max_x, max_y) = bounding_box_of_points(&all).unwrap_or((0.0, 0.0, 1000.0, 1000.0));
    let pad = ((max_x - min_x).max(max_y - min_y) * 0.02).max(10.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.2} {:.2} {:.2} {:.2}">
"#,
        min_x - pad,
        min_y - pad,
        max_x - min_x + 2.0 * pad,
        max_y - min_y + 2.0 * pad
    ));

    for outline in outlines {
        if outline.points.len() < 2 {
            continue;
        }
        let points: String = outline
            .points
            .iter()
            .map(|p| format!("{:.2},{:.2}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            "<polygon id=\"{}\" points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\"/>\n",
            outline.id,
            points,
            outline.color,
            pad / 5.0
        ));
    }

    svg.push_str("<g id=\"tiles\" stroke=\"#555555\" stroke-width=\"1\">\n");
    for tile in tiles {
        let transform = if tile.rotation == 0.0 {
            String::new()
        } else {
            format!(
                " transform=\"rotate({:.4} {:.2} {:.2})\"",
                tile.rotation, tile.x, tile.y
            )
        };
        svg.push_str(&format!(
            "  <rect id=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"{}/>\n",
            tile.id,
            tile.x,
            tile.y,
            tile.width,
            tile.height,
            tile_fill(tile),
            transform
        ));
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}
