//! Validate command: can the job's paving boundary hold a paver?

use anyhow::Result;

use pool_tiler::{ValidationResult, validate_boundary};

use super::common::{CommandArgs, OutputFormat, serialize, write_output};
use super::job::Job;

/// Execute the validate command. Returns whether the boundary is valid.
pub fn cmd_validate(args: &[String]) -> Result<bool> {
    let args = CommandArgs::parse(args, OutputFormat::Json)?;
    let job = Job::load(&args.input)?;
    let paving = job.paving()?;

    let result: ValidationResult =
        validate_boundary(&job.points(&paving.boundary), &paving.config).into();
    match &result.error {
        Some(error) => tracing::warn!("{}", error),
        None => tracing::info!("boundary is valid"),
    }

    let format = match args.format {
        OutputFormat::Svg => OutputFormat::Json,
        other => other,
    };
    write_output(&serialize(&result, format)?, args.output.as_deref())?;
    Ok(result.valid)
}
