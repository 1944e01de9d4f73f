//! Coping command: lay coping tiles around the job's pool outline.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use pool_tiler::coping::{CopingLayout, EdgeLayout};
use pool_tiler::{Point, Tile, TileStats, solve_coping};

use super::common::{CommandArgs, OutputFormat, StyledOutline, serialize, tiles_to_svg, write_output};
use super::job::Job;

/// JSON/YAML output of the coping command.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CopingOutput<'a> {
    summary: String,
    stats: &'a TileStats,
    outline: &'a [Point],
    edges: &'a [EdgeLayout],
    tiles: &'a [Tile],
}

/// Execute the coping command.
pub fn cmd_coping(args: &[String]) -> Result<()> {
    let args = CommandArgs::parse(args, OutputFormat::Json)?;
    let job = Job::load(&args.input)?;
    let pool = job.pool()?;

    let layout = solve_coping(&job.points(&pool.outline), &pool.coping);
    info!(job = job.name.as_deref().unwrap_or("-"), "{}", layout.stats);

    write_output(&render(&layout, args.format)?, args.output.as_deref())
}

fn render(layout: &CopingLayout, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Svg => Ok(tiles_to_svg(
            &layout.tiles,
            &[StyledOutline {
                id: "pool",
                points: &layout.outline,
                color: "#1f77b4",
            }],
        )),
        _ => serialize(
            &CopingOutput {
                summary: layout.stats.to_string(),
                stats: &layout.stats,
                outline: &layout.outline,
                edges: &layout.edges,
                tiles: &layout.tiles,
            },
            format,
        ),
    }
}
