use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use lulc_catalog::config::Config;
use lulc_catalog::logging;
use lulc_catalog::pipeline::Pipeline;
use lulc_catalog::source_loader::load_initiatives;

#[derive(Parser)]
#[command(name = "lulc_catalog")]
#[command(about = "Normalize LULC initiative metadata and analyze temporal coverage")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory for the rotated JSON log files
    #[arg(long, global = true, default_value = logging::DEFAULT_LOG_DIR)]
    log_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Initiative metadata file (JSON, comments allowed)
    input: PathBuf,
    /// Optional TOML configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Merge the built-in legacy acronym and temporal tables into the configuration
    #[arg(long)]
    legacy_tables: bool,
    /// Write JSON here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the canonical table and enriched metadata
    Build(InputArgs),
    /// Build, then generate auxiliary chart data
    Aux(InputArgs),
    /// Build, then validate the table and metadata
    Validate(InputArgs),
}

fn pipeline_for(args: &InputArgs) -> Result<Pipeline> {
    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let config = if args.legacy_tables {
        config.with_legacy_tables()
    } else {
        config
    };
    Ok(Pipeline::new(config))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("💾 Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging_in(&cli.log_dir, logging::DEFAULT_LOG_FILE);

    match cli.command {
        Commands::Build(args) => {
            let pipeline = pipeline_for(&args)?;
            let raw = load_initiatives(&args.input).with_context(|| format!("loading {}", args.input.display()))?;
            let build = pipeline.build(&raw);

            eprintln!("📊 Built {} records from {}", build.records.len(), args.input.display());
            if !build.warnings.is_empty() {
                warn!("{} fields fell back to defaults", build.warnings.len());
                eprintln!("⚠️  Defaulted fields: {}", build.warnings.len());
            }
            write_json(&build, args.output.as_deref())?;
        }
        Commands::Aux(args) => {
            let pipeline = pipeline_for(&args)?;
            let raw = load_initiatives(&args.input).with_context(|| format!("loading {}", args.input.display()))?;
            let build = pipeline.build(&raw);
            let auxiliary = pipeline.auxiliary(&build);

            eprintln!(
                "📈 Auxiliary data for {} initiatives ({} without usable years)",
                auxiliary.data_summary.total_initiatives,
                auxiliary.temporal_analysis.excluded.len()
            );
            write_json(&auxiliary, args.output.as_deref())?;
        }
        Commands::Validate(args) => {
            let pipeline = pipeline_for(&args)?;
            let raw = load_initiatives(&args.input).with_context(|| format!("loading {}", args.input.display()))?;
            let result = pipeline.run(&raw);
            let report = &result.validation;

            write_json(report, args.output.as_deref())?;
            if report.summary.validation_passed {
                info!("Validation passed");
                eprintln!("✅ Validation passed ({} issues)", report.summary.total_issues);
            } else {
                eprintln!("❌ Validation failed:");
                for issue in &report.issues {
                    eprintln!("   - {}", issue);
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
