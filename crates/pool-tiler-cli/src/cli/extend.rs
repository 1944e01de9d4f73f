//! Extend command: grow a base layout out to an edited boundary.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use pool_tiler::geometry::bounding_box_of_points;
use pool_tiler::{
    ExtensionConfig, ExtensionInput, Point, Rect, Tile, TileStats, extend_to_boundary, fill_paving,
    solve_coping,
};

use super::common::{CommandArgs, OutputFormat, StyledOutline, serialize, tiles_to_svg, write_output};
use super::job::{ExtensionBase, Job};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtensionOutput<'a> {
    summary: String,
    boundary_key: &'a str,
    base_count: usize,
    stats: TileStats,
    added: &'a [Tile],
}

/// Base tiles, step geometry and the default "unedited" boundary.
struct BaseLayout {
    tiles: Vec<Tile>,
    config: ExtensionConfig,
    default_initial: Vec<Point>,
    wastage_percent: f64,
}

fn build_base(job: &Job, base: ExtensionBase) -> Result<BaseLayout> {
    match base {
        ExtensionBase::Coping => {
            let pool = job.pool()?;
            let layout = solve_coping(&job.points(&pool.outline), &pool.coping);
            let corners: Vec<Point> = layout.tiles.iter().flat_map(|t| t.world_corners()).collect();
            let default_initial = bounding_box_of_points(&corners)
                .map(|b| Rect::from_bounds(b).to_points())
                .unwrap_or_default();
            Ok(BaseLayout {
                tiles: layout.tiles,
                config: ExtensionConfig::for_coping(&pool.coping),
                default_initial,
                wastage_percent: pool.coping.wastage_percent,
            })
        }
        ExtensionBase::Paving => {
            let paving = job.paving()?;
            let boundary = job.points(&paving.boundary);
            let layout = fill_paving(&boundary, &paving.config, &job.exclude_zones(paving))
                .context("base paving failed")?;
            Ok(BaseLayout {
                tiles: layout.tiles,
                config: ExtensionConfig::for_paving(&paving.config),
                default_initial: boundary,
                wastage_percent: paving.config.wastage_percent,
            })
        }
    }
}

/// Execute the extend command.
pub fn cmd_extend(args: &[String]) -> Result<()> {
    let args = CommandArgs::parse(args, OutputFormat::Json)?;
    let job = Job::load(&args.input)?;
    let section = job.extension()?;

    let base = build_base(&job, section.base)?;
    let boundary = job.points(&section.boundary);
    let initial = section
        .initial_boundary
        .as_ref()
        .map(|points| job.points(points))
        .unwrap_or_else(|| base.default_initial.clone());
    let site = section.site.as_ref().map(|points| job.points(points));
    let cavity = job.pool_outline();

    let input = ExtensionInput {
        base_tiles: &base.tiles,
        boundary: &boundary,
        initial_boundary: &initial,
        site_boundary: site.as_deref(),
        cavity: cavity.as_deref(),
    };
    let extension = extend_to_boundary(&input, &base.config);
    let stats = TileStats::from_tiles(&extension.added, base.wastage_percent, true);
    info!(base = base.tiles.len(), "added {}", stats);

    let output = match args.format {
        OutputFormat::Svg => {
            let tiles: Vec<Tile> = base.tiles.iter().chain(&extension.added).cloned().collect();
            let mut outlines = vec![StyledOutline {
                id: "boundary",
                points: &boundary,
                color: "#2ca02c",
            }];
            if let Some(site) = &site {
                outlines.push(StyledOutline {
                    id: "site",
                    points: site,
                    color: "#7f7f7f",
                });
            }
            if let Some(cavity) = &cavity {
                outlines.push(StyledOutline {
                    id: "pool",
                    points: cavity,
                    color: "#1f77b4",
                });
            }
            tiles_to_svg(&tiles, &outlines)
        }
        format => serialize(
            &ExtensionOutput {
                summary: stats.to_string(),
                boundary_key: &extension.boundary_key,
                base_count: base.tiles.len(),
                stats,
                added: &extension.added,
            },
            format,
        )?,
    };

    write_output(&output, args.output.as_deref())
}
