use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// Import from dmnlint-core
use dmnlint_core::{DocumentProcessor, ValidationConfig};

// Import CLI utilities
use dmnlint_cli::{validate_collected, OutputFormat, SourceCollector, ValidationReport};

#[derive(Parser)]
#[command(name = "dmnlint")]
#[command(about = "Find overlapping rules, hit policy violations, gaps and type mismatches in DMN decision tables")]
struct Args {
    /// DMN files, directories (searched recursively) or .zip archives
    #[arg(required_unless_present = "show_config")]
    inputs: Vec<PathBuf>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Report format
    #[arg(short = 'f', long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads for batch validation (overrides batch.threads)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Validate documents one after another
    #[arg(long)]
    sequential: bool,

    /// File extension of DMN documents inside directories and archives
    #[arg(long, default_value = "dmn")]
    extension: String,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    show_config: bool,

    /// Exit with status 0 even when documents are invalid
    #[arg(long)]
    exit_zero: bool,

    /// Debug logging (overridden by DMNLINT_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_directives = if verbose {
        "dmnlint=debug,dmnlint_cli=debug,dmnlint_core=debug"
    } else {
        "dmnlint=info,dmnlint_cli=info,dmnlint_core=info"
    };
    let filter = EnvFilter::try_from_env("DMNLINT_LOG").unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Load config using the functional pattern, then apply CLI overrides
    let mut config = ValidationConfig::load_with_fallback(args.config.as_deref());
    match &args.config {
        Some(path) => info!("Loaded config from: {}", path),
        None => debug!("Using default config"),
    }
    if let Some(jobs) = args.jobs {
        config.batch.threads = jobs;
    }
    if args.sequential {
        config.batch.parallel = false;
    }

    if args.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let collector = SourceCollector::new(&args.extension);
    let entries = collector.collect(&args.inputs);
    info!("Validating {} document(s)", entries.len());

    let processor = DocumentProcessor::new(config);
    let report = ValidationReport::new(validate_collected(&processor, entries));
    let rendered = report.render(args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    info!("{}", report.message);
    if report.has_failures() && !args.exit_zero {
        std::process::exit(1);
    }
    Ok(())
}
