//! pool-tiler - CLI for pool coping and paving layouts
//!
//! Usage:
//!   pool-tiler coping <job>      Lay coping tiles around the job's pool
//!   pool-tiler pave <job>        Fill the job's paving boundary
//!   pool-tiler extend <job>      Grow a layout out to an edited boundary
//!   pool-tiler validate <job>    Check the paving boundary holds a paver
//!   pool-tiler import <svg>      Turn a tagged SVG drawing into a job file

mod cli;

use std::env;
use std::process::ExitCode;

use anyhow::Result;

use cli::{cmd_coping, cmd_extend, cmd_import, cmd_pave, cmd_validate};

/// Exit code for a boundary that failed validation.
const EXIT_INVALID: u8 = 2;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("pool-tiler");

    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    init_logging(verbose);

    let Some(command) = args.get(1) else {
        print_usage(prog);
        return ExitCode::FAILURE;
    };
    let rest = &args[2..];

    let result: Result<ExitCode> = match command.as_str() {
        "coping" => cmd_coping(rest).map(|()| ExitCode::SUCCESS),
        "pave" => cmd_pave(rest).map(|()| ExitCode::SUCCESS),
        "extend" => cmd_extend(rest).map(|()| ExitCode::SUCCESS),
        "validate" => cmd_validate(rest).map(|valid| {
            if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_INVALID)
            }
        }),
        "import" => cmd_import(rest).map(|()| ExitCode::SUCCESS),
        "help" | "--help" | "-h" => {
            print_usage(prog);
            Ok(ExitCode::SUCCESS)
        }
        other => {
            eprintln!("Unknown command '{}'", other);
            eprintln!();
            print_usage(prog);
            Ok(ExitCode::FAILURE)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays clean for layout output.
///
/// `RUST_LOG` wins over the default level; `-v` raises the default to debug.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_usage(prog: &str) {
    eprintln!("pool-tiler - coping and paving layouts for pools and landscapes");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} coping <job> [options]     Lay coping around the pool outline", prog);
    eprintln!("  {} pave <job> [options]       Fill the paving boundary", prog);
    eprintln!("  {} extend <job> [options]     Grow a layout out to an edited boundary", prog);
    eprintln!("  {} validate <job> [options]   Check the paving boundary (exit 2 if invalid)", prog);
    eprintln!("  {} import <svg> [options]     Build a job file from a tagged SVG", prog);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>    Output file (default: stdout)");
    eprintln!("  -f, --format <fmt>     Output format: svg, json, yaml");
    eprintln!("  --json, --svg          Shorthand for -f json / -f svg");
    eprintln!("  --scale <n>            Import only: millimeters per SVG unit (default: 1)");
    eprintln!("  -v, --verbose          Debug logging (RUST_LOG overrides)");
    eprintln!();
    eprintln!("Jobs are YAML, or JSON when the file ends in .json.");
    eprintln!("SVG import reads data-role=\"pool|boundary|site|exclude\" on shapes and groups.");
}
