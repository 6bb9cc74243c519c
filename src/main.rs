//! LeakLens - WordPress debug log and wp-config exposure scanner CLI

use clap::{ArgGroup, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::error;
use tracing_subscriber::EnvFilter;

use leaklens::config;
use leaklens::models::{FindingKind, ScanConfig, ScanResult, Target};
use leaklens::scanner::{shutdown, Scheduler};
use leaklens::targets;

/// LeakLens - finds exposed WordPress debug logs and wp-config backups
#[derive(Parser)]
#[command(name = "leaklens", version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "list"])))]
struct Cli {
    /// Single target host or URL
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// File containing one host or URL per line
    #[arg(short = 'l', long)]
    list: Option<PathBuf>,

    /// Number of targets probed concurrently
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Append [FOUND] lines to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Export every finding, errors included, as JSON lines
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Print a line for every failed request
    #[arg(long)]
    report_errors: bool,

    /// Do not print the banner
    #[arg(long)]
    no_banner: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn print_banner() {
    let banner = r#"
    ╔═══════════════════════════════════════╗
    ║  LEAKLENS v0.1.0                      ║
    ║  debug.log & wp-config finder         ║
    ║  For authorized security testing only ║
    ╚═══════════════════════════════════════╝
    "#;
    println!("{}", banner.cyan());
}

fn print_summary(result: &ScanResult) {
    let rows = [
        ("Debug logs (confirmed)", result.count(FindingKind::ConfirmedLog)),
        ("Debug logs (possible)", result.count(FindingKind::PossibleLog)),
        ("WP_DEBUG enabled", result.count(FindingKind::ConfigDebugOn)),
        ("wp-config files", result.count(FindingKind::ConfigFile)),
        ("Request errors", result.count(FindingKind::Error)),
    ];

    println!("\n{}", "  Scan Summary".bold());
    println!("  {}", "─".repeat(35));

    let mut builder = Builder::default();
    builder.push_record(["Result", "Count"]);
    for (label, count) in rows {
        builder.push_record([label.to_string(), count.to_string()]);
    }
    builder.push_record(["Targets".to_string(), result.targets_scanned.to_string()]);
    builder.push_record(["Requests".to_string(), result.total_requests.to_string()]);
    if let Some(finished) = result.finished_at {
        let elapsed = finished - result.started_at;
        builder.push_record([
            "Elapsed".to_string(),
            format!("{:.1}s", elapsed.num_milliseconds() as f64 / 1000.0),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");

    let errors = result.count(FindingKind::Error);
    if errors > 0 {
        println!(
            "\n  {} {} requests failed (use --report-errors or --jsonl to inspect)",
            "Note:".yellow().bold(),
            errors
        );
    }
}

fn load_scan_config(cli: &Cli) -> leaklens::error::Result<ScanConfig> {
    let mut scan_config = if let Some(ref path) = cli.config {
        config::load_config(path)?
    } else {
        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            config::load_config(default_path)?
        } else {
            ScanConfig::default()
        }
    };

    config::merge_cli_args(
        &mut scan_config,
        cli.threads,
        cli.timeout,
        cli.output.clone(),
        cli.jsonl.clone(),
        cli.report_errors,
    )?;
    Ok(scan_config)
}

fn load_targets(cli: &Cli) -> leaklens::error::Result<Vec<Target>> {
    match (&cli.url, &cli.list) {
        (Some(url), _) => Ok(vec![Target::parse(url)?]),
        (None, Some(path)) => targets::load_targets_file(path),
        (None, None) => Err(leaklens::error::LeakLensError::NoTargets),
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "leaklens=debug"
    } else {
        "leaklens=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if !cli.no_banner {
        print_banner();
    }

    let scan_config = load_scan_config(&cli)?;
    let targets = load_targets(&cli)?;
    if targets.is_empty() {
        eprintln!("  {} no usable targets found", "Error:".red().bold());
        std::process::exit(1);
    }

    let (trigger, shutdown) = shutdown::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
            return;
        }
        eprintln!("\n  {} finishing in-flight work...", "Interrupted:".yellow().bold());
        trigger.trigger();
    });

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    println!(
        "  {} Scanning {} targets for debug.log and wp-config files...\n",
        "[*]".bold(),
        targets.len().to_string().cyan()
    );

    let mut scheduler = Scheduler::with_defaults(scan_config.clone())?
        .with_shutdown(shutdown)
        .with_progress(pb);
    let result = scheduler.run(&targets).await?;

    print_summary(&result);

    if let Some(ref path) = scan_config.output_file {
        println!("\n  {} {}", "Results appended to:".bold(), path.display().to_string().green());
    }
    if let Some(ref path) = scan_config.jsonl_file {
        println!("  {} {}", "Findings streamed to:".bold(), path.display().to_string().green());
    }

    if result.interrupted {
        println!("\n  {} Scan interrupted", "[*]".bold());
        std::process::exit(130);
    }

    println!("\n  {} Scan completed!", "[*]".bold());
    Ok(())
}
