//! Import command: turn a tagged SVG drawing into a job file.
//!
//! Outlines are matched to job sections by their `data-role`: the first
//! `pool` becomes the pool, the first `boundary` the paving boundary, the
//! first `site` the extension's site boundary, and every `exclude` an
//! exclude zone. Untagged outlines are listed in the log and skipped.

use std::fs;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use pool_tiler::svg::find_role;
use pool_tiler::{CopingConfig, OutlineRole, PavingConfig, extract_outlines_from_svg};

use super::common::{CommandArgs, OutputFormat, serialize, write_output};
use super::job::{ExtensionBase, ExtensionSection, Job, JobPoint, PavingSection, PoolSection, Units};

/// Execute the import command.
pub fn cmd_import(args: &[String]) -> Result<()> {
    let args = CommandArgs::parse(args, OutputFormat::Yaml)?;
    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let outlines = extract_outlines_from_svg(&content, args.scale)?;

    let untagged = outlines.iter().filter(|o| o.role.is_none()).count();
    if untagged > 0 {
        warn!(untagged, "outlines without data-role were skipped");
    }

    let points = |role| -> Option<Vec<JobPoint>> {
        find_role(&outlines, role).map(|o| o.polygon.outer.iter().map(|&p| JobPoint::from(p)).collect())
    };

    let pool = points(OutlineRole::Pool).map(|outline| PoolSection {
        outline,
        coping: CopingConfig::default(),
    });
    let boundary = points(OutlineRole::Boundary);
    let site = points(OutlineRole::Site);
    let exclude: Vec<Vec<JobPoint>> = outlines
        .iter()
        .filter(|o| o.role == Some(OutlineRole::Exclude))
        .map(|o| o.polygon.outer.iter().map(|&p| JobPoint::from(p)).collect())
        .collect();

    if pool.is_none() && boundary.is_none() {
        bail!("drawing has neither a `pool` nor a `boundary` outline");
    }

    let paving = boundary.clone().map(|boundary| PavingSection {
        boundary,
        config: PavingConfig::default(),
        exclude,
        exclude_pool: true,
    });
    // The site doubles as the edited boundary until the user changes it.
    let extension = site.map(|site| ExtensionSection {
        base: if pool.is_some() { ExtensionBase::Coping } else { ExtensionBase::Paving },
        boundary: boundary.clone().unwrap_or_else(|| site.clone()),
        initial_boundary: None,
        site: Some(site),
    });

    let job = Job {
        name: args.input.file_stem().map(|s| s.to_string_lossy().into_owned()),
        units: Units::Mm,
        snap: None,
        pool,
        paving,
        extension,
    };
    info!(outlines = outlines.len(), "drawing imported");

    let format = match args.format {
        OutputFormat::Svg => OutputFormat::Yaml,
        other => other,
    };
    write_output(&serialize(&job, format)?, args.output.as_deref())
}
