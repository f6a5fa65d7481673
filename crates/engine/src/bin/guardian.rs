//! guardian: evaluate dashboard metrics and print one quality report per dashboard.
//!
//! Reads a JSON array of dashboards (as produced by the acquisition layer),
//! runs the rule engine, anomaly detector and scoring, and writes the
//! reports as JSON to stdout or `--output`. Logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use guardian_core::config::{load_dotenv, Config};
use guardian_core::{Dashboard, EngineConfig};
use guardian_engine::{Annotator, Engine, LlmAnnotator, TemplateAnnotator};

// ── CLI ─────────────────────────────────────────────────────────────

/// Dashboard data quality evaluation.
#[derive(Parser, Debug)]
#[command(name = "guardian", version, about)]
struct Cli {
    /// Path to the dashboards JSON file.
    #[arg(long, env = "GUARDIAN_INPUT", default_value = "data/dashboards/sample-dashboards.json")]
    input: PathBuf,

    /// Path to a QualityConfig YAML document (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write reports here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Explain issues with the configured LLM instead of templates.
    #[arg(long, default_value_t = false)]
    enrich: bool,

    /// Print a text digest of every report to stderr.
    #[arg(long, default_value_t = false)]
    summary: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env_config = Config::from_env();
    env_config.log_summary();

    let engine_config = match cli.config.clone().or_else(|| env_config.quality_config.clone()) {
        Some(path) => {
            let cfg = EngineConfig::from_file(&path)
                .with_context(|| format!("loading quality config {}", path.display()))?;
            info!(path = %path.display(), "loaded quality config");
            cfg
        }
        None => {
            info!("no quality config given, using defaults");
            EngineConfig::default()
        }
    };
    let engine = Engine::new(engine_config).context("invalid quality config")?;

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading dashboards from {}", cli.input.display()))?;
    let dashboards: Vec<Dashboard> =
        serde_json::from_str(&raw).context("parsing dashboards JSON")?;
    info!(dashboards = dashboards.len(), "dashboards loaded");

    let annotator: Box<dyn Annotator> = if cli.enrich && env_config.llm.is_configured() {
        Box::new(LlmAnnotator::from_config(&env_config.llm)?)
    } else {
        if cli.enrich {
            warn!(provider = %env_config.llm.provider, "--enrich requested but no LLM is configured, using templates");
        }
        Box::new(TemplateAnnotator)
    };

    let outcome = engine.run(&dashboards, annotator.as_ref()).await;
    for failure in &outcome.failures {
        warn!(position = failure.position, name = %failure.dashboard_name, error = %failure.error, "dashboard not reported");
    }

    if cli.summary {
        for report in &outcome.reports {
            eprintln!("{}", report.summary_text());
        }
    }

    let json = serde_json::to_string_pretty(&outcome.reports)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing reports to {}", path.display()))?;
            info!(path = %path.display(), reports = outcome.reports.len(), "reports written");
        }
        None => println!("{}", json),
    }

    Ok(())
}
