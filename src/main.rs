use anyhow::{bail, Context, Result};
use clap::Parser;
use pacal::{catalog_summary, init_logging, plan_jobs, run_all, Config, LogFormat};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

#[derive(Parser)]
#[command(name = "pacal", version, long_version = LONG_VERSION)]
#[command(about = "Generate pressure advance calibration G-code", long_about = None)]
struct Cli {
    /// Configuration file (.json or .toml); built-in profiles when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory, overrides the configuration
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Only generate for this printer (repeatable)
    #[arg(short, long = "printer", value_name = "NAME")]
    printers: Vec<String>,

    /// Only generate for this filament (repeatable)
    #[arg(short, long = "filament", value_name = "NAME")]
    filaments: Vec<String>,

    /// Generate files in parallel
    #[arg(long)]
    jobs_parallel: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    dump_config: Option<PathBuf>,

    /// List printers and filaments and exit
    #[arg(long)]
    list: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(output) = cli.output {
        config.output_directory = output;
    }

    if let Some(path) = &cli.dump_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    if cli.list {
        print!("{}", catalog_summary(&config.catalog()));
        return Ok(());
    }

    let jobs = plan_jobs(&config, &cli.printers, &cli.filaments)?;
    let report = run_all(&config, &jobs, cli.jobs_parallel);

    for outcome in report.failures() {
        if let Err(e) = &outcome.result {
            eprintln!("{}: {}", outcome.path.display(), e);
        }
    }
    if !report.is_success() {
        bail!(
            "{} of {} files failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}
