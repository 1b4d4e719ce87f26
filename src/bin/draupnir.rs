//! Draupnir CLI - structural copy-paste detection for Python codebases.
//!
//! Human-facing chrome (banner, summary, warnings) goes to stderr so that
//! a report printed to stdout stays machine-readable when piped.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;

use draupnir_rs::core::hashing::HashMode;
use draupnir_rs::core::prepare::prepare;
use draupnir_rs::lang::common::TreeFrontend;
use draupnir_rs::lang::python::PythonFrontend;
use draupnir_rs::{CloneAnalysis, CloneDetector, DraupnirConfig, ReportFormat, ReportGenerator};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Structural copy-paste detection for Python
#[derive(Parser)]
#[command(name = "draupnir")]
#[command(version = VERSION)]
#[command(about = "🔍 Draupnir - structural copy-paste detection for Python")]
#[command(long_about = "
Find duplicated logic across Python functions, even after renames and
light edits. Functions are lowered into canonical trees and compared
structurally, so `total += price` and `acc += cost` still match.

Common Usage:

  # Scan the current directory and print a JSON report
  draupnir scan

  # Markdown report for a code review
  draupnir scan --format markdown ./src

  # Tighten thresholds and write the report to a file
  draupnir scan --min-run 3 --min-weight 40 --out report.json ./src

  # Show the canonical form the engine hashes
  draupnir dump ./src/utils.py

Scanning exits 0 whether or not clones are found.
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files or directories for structural clones
    Scan(ScanArgs),

    /// Print the canonical tree of every function in one file
    Dump(DumpArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a draupnir configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// One or more directories or files to scan (defaults to current directory)
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Shortest run of matching statements worth reporting
    #[arg(long, value_name = "N")]
    min_run: Option<usize>,

    /// Smallest total statement weight worth reporting
    #[arg(long, value_name = "WEIGHT")]
    min_weight: Option<u64>,

    /// Abort the comparison phase after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct DumpArgs {
    /// Python file to dump
    file: PathBuf,

    /// Which reference rendering to show
    #[arg(short, long, value_enum, default_value = "literal")]
    mode: DumpMode,
}

#[derive(Args)]
struct ValidateConfigArgs {
    /// Path to configuration file to validate
    #[arg(short, long, required = true)]
    config: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// JSON analysis dump
    Json,
    /// Markdown team report
    Markdown,
    /// Standalone HTML page
    Html,
}

impl OutputFormat {
    fn to_report_format(self) -> ReportFormat {
        match self {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Markdown => ReportFormat::Markdown,
            OutputFormat::Html => ReportFormat::Html,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpMode {
    /// Variables render under their own names
    Literal,
    /// Variables render as block-local ranks
    Index,
    /// Variables render through their usage digests
    Usage,
}

impl DumpMode {
    fn to_hash_mode(self) -> HashMode {
        match self {
            DumpMode::Literal => HashMode::Literal,
            DumpMode::Index => HashMode::Index,
            DumpMode::Usage => HashMode::Usage,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging; payload output stays on stdout
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(args) => scan_command(args)?,
        Commands::Dump(args) => dump_command(args)?,
        Commands::PrintDefaultConfig => print_default_config()?,
        Commands::ValidateConfig(args) => validate_config(args)?,
    }

    Ok(())
}

fn scan_command(args: ScanArgs) -> anyhow::Result<()> {
    let chatty = !args.quiet;
    if chatty {
        eprintln!(
            "{}",
            style(format!("🔍 draupnir v{VERSION}")).cyan().bold()
        );
        eprintln!();
    }

    let mut config = match &args.config {
        Some(path) => {
            if chatty {
                eprintln!(
                    "{} {}",
                    style("✅ Loading configuration from").green(),
                    style(path.display()).cyan()
                );
            }
            DraupnirConfig::from_yaml_file(path)?
        }
        None => {
            if chatty {
                eprintln!("{}", style("✅ Using default configuration").green());
            }
            DraupnirConfig::default()
        }
    };

    if let Some(min_run) = args.min_run {
        config.detection.min_run_length = min_run;
    }
    if let Some(min_weight) = args.min_weight {
        config.detection.min_clone_weight = min_weight;
    }
    if let Some(deadline) = args.deadline {
        config.detection.deadline_secs = Some(deadline);
    }

    for path in &args.paths {
        if !path.exists() {
            eprintln!(
                "{} {}",
                style("❌ Path does not exist:").red(),
                path.display()
            );
            std::process::exit(1);
        }
    }

    let detector = CloneDetector::new(config)?;
    let analysis = detector.analyze_paths(&args.paths)?;

    if chatty {
        print_summary(&analysis);
    }

    let generator = ReportGenerator::new()?;
    let format = args.format.to_report_format();
    match &args.out {
        Some(out) => {
            generator.write_report(&analysis, format, out)?;
            if chatty {
                eprintln!(
                    "{} {}",
                    style("📝 Report written to").green().bold(),
                    style(out.display()).cyan()
                );
            }
        }
        None => {
            let rendered = generator.render(&analysis, format)?;
            println!("{rendered}");
        }
    }

    Ok(())
}

fn print_summary(analysis: &CloneAnalysis) {
    let stats = &analysis.stats;
    eprintln!("{}", style("📊 Analysis Summary").cyan().bold());
    eprintln!("  Files analyzed:     {}", stats.files_analyzed);
    eprintln!("  Functions analyzed: {}", stats.functions_analyzed);
    eprintln!("  Pairs compared:     {}", stats.pairs_compared);
    eprintln!("  Clones found:       {}", style(stats.clones_found).bold());
    if analysis.truncated {
        eprintln!(
            "  {}",
            style("⚠ deadline expired; results are incomplete").yellow()
        );
    }
    if !analysis.diagnostics.is_empty() {
        eprintln!(
            "  {} file(s) skipped, see report diagnostics",
            analysis.diagnostics.len()
        );
    }

    for record in analysis.records.iter().take(10) {
        eprintln!(
            "  {} {} duplicates {} (run {}, weight {})",
            style("•").dim(),
            record.function_a.qualified(),
            record.function_b.qualified(),
            record.run_length,
            record.total_weight
        );
    }
    if analysis.records.len() > 10 {
        eprintln!("  ... {} more not shown", analysis.records.len() - 10);
    }
    eprintln!();
}

fn dump_command(args: DumpArgs) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.file)?;
    let file = args.file.display().to_string();

    let mut frontend = PythonFrontend::new()?;
    let units = frontend.parse_source(&source, &file)?;
    if units.is_empty() {
        eprintln!("{}", style("no functions found").yellow());
        return Ok(());
    }

    let mode = args.mode.to_hash_mode();
    for unit in units {
        let name = unit.qualified_name();
        match prepare(unit) {
            Ok(prepared) => {
                println!("== {name}");
                print!("{}", prepared.dump(mode)?);
                println!();
            }
            Err(err) => {
                eprintln!("{} {name}: {err}", style("❌ skipped").red());
            }
        }
    }

    Ok(())
}

fn print_default_config() -> anyhow::Result<()> {
    println!("{}", style("# Default draupnir configuration").dim());
    println!("{}", style("# Save this to a file and customize as needed").dim());
    println!(
        "{}",
        style("# Usage: draupnir scan --config your-config.yml <paths>").dim()
    );
    println!();

    let config = DraupnirConfig::default();
    print!("{}", serde_yaml::to_string(&config)?);

    Ok(())
}

fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    let outcome = DraupnirConfig::from_yaml_file(&args.config)
        .and_then(|config| config.validate().map(|()| config));

    match outcome {
        Ok(config) => {
            println!(
                "{} {}",
                style("✅ Configuration is valid:").green().bold(),
                style(args.config.display()).cyan()
            );
            println!("   min_run_length:   {}", config.detection.min_run_length);
            println!("   min_clone_weight: {}", config.detection.min_clone_weight);
            println!(
                "   include_patterns: {}",
                config.files.include_patterns.join(", ")
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {err}", style("❌ Invalid configuration:").red());
            std::process::exit(1);
        }
    }
}
