//! Pave command: fill the job's paving boundary with pavers.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use pool_tiler::{PavingLayout, fill_paving};

use super::common::{CommandArgs, OutputFormat, StyledOutline, serialize, tiles_to_svg, write_output};
use super::job::Job;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PavingOutput<'a> {
    summary: String,
    #[serde(flatten)]
    layout: &'a PavingLayout,
}

/// Execute the pave command.
pub fn cmd_pave(args: &[String]) -> Result<()> {
    let args = CommandArgs::parse(args, OutputFormat::Json)?;
    let job = Job::load(&args.input)?;
    let paving = job.paving()?;

    let boundary = job.points(&paving.boundary);
    let zones = job.exclude_zones(paving);
    let layout = fill_paving(&boundary, &paving.config, &zones).context("paving failed")?;
    info!(
        job = job.name.as_deref().unwrap_or("-"),
        boundary_m2 = layout.boundary_area_m2,
        "{}",
        layout.stats
    );

    let output = match args.format {
        OutputFormat::Svg => {
            let mut outlines = vec![StyledOutline {
                id: "boundary",
                points: &boundary,
                color: "#2ca02c",
            }];
            outlines.extend(zones.iter().map(|zone| StyledOutline {
                id: zone.id.as_deref().unwrap_or("exclude"),
                points: zone.points.as_slice(),
                color: "#d62728",
            }));
            tiles_to_svg(&layout.tiles, &outlines)
        }
        format => serialize(
            &PavingOutput {
                summary: layout.stats.to_string(),
                layout: &layout,
            },
            format,
        )?,
    };

    write_output(&output, args.output.as_deref())
}

