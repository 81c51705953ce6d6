//! tempo-replay: run scenario files against the rule engine.
//!
//! Each scenario drives a fresh session with a manually advanced pseudo
//! clock, so results never depend on wall-clock timing. The process exits
//! non-zero when any expectation fails or a scenario cannot be set up.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use tempo_core::config::load_dotenv;
use tempo_core::{CatchUpPolicy, SessionConfig};
use tempo_rules::scenario::{replay, ReplayReport, Scenario};

// ── CLI ─────────────────────────────────────────────────────────────

/// Replay deterministic rule-timer scenarios.
#[derive(Parser, Debug)]
#[command(name = "tempo-replay", version, about)]
struct Cli {
    /// Scenario files, or directories scanned for `*.yml` / `*.yaml`.
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,

    /// Override the configured catch-up policy (every-period, coalesce).
    #[arg(long)]
    catch_up: Option<CatchUpPolicy>,

    /// Drain the agenda on every clock advance.
    #[arg(long)]
    timed_execution: bool,

    /// Print reports as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Stop at the first failing scenario.
    #[arg(long)]
    fail_fast: bool,
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Expand directories into their scenario files, sorted by path.
fn collect_scenarios(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = fs::read_dir(input)
            .with_context(|| format!("failed to read {}", input.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && matches!(p.extension().and_then(|e| e.to_str()), Some("yml" | "yaml"))
            })
            .collect();
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn run_file(path: &Path, config: &SessionConfig) -> Result<ReplayReport> {
    let scenario = Scenario::from_file(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    replay(&scenario, base_dir, config).with_context(|| format!("failed to replay {}", path.display()))
}

fn print_text(path: &Path, report: &ReplayReport) {
    let verdict = if report.passed() { "PASS" } else { "FAIL" };
    println!(
        "{} {} ({}) fired={} now={}",
        verdict,
        report.scenario,
        path.display(),
        report.total_fired(),
        report.final_now
    );
    for step in report.failures() {
        println!(
            "    step {} [{}]: {}",
            step.index,
            step.step,
            step.failure.as_deref().unwrap_or_default()
        );
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = SessionConfig::from_env();
    if let Some(catch_up) = cli.catch_up {
        config.catch_up = catch_up;
    }
    if cli.timed_execution {
        config.timed_execution = true;
    }
    config.log_summary();

    let files = collect_scenarios(&cli.scenarios)?;
    info!(count = files.len(), "scenarios found");

    let mut failed = 0usize;
    for path in &files {
        let ok = match run_file(path, &config) {
            Ok(report) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_text(path, &report);
                }
                report.passed()
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{:#}", e), "scenario setup failed");
                println!("ERROR {}: {:#}", path.display(), e);
                false
            }
        };
        if !ok {
            failed += 1;
            if cli.fail_fast {
                break;
            }
        }
    }

    println!("{} scenario(s), {} failed", files.len(), failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
