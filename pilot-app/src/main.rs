use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pilot_common::observability::{init_logging, LogConfig, LogFormat};
use pilot_config::{PacingSettings, PilotConfigLoader};
use pilot_docgen::CoverLetterProvider;
use pilot_drivers::{DelayRange, HumanPacing, PacingProfile, PilotDriver};
use pilot_engine::{HandlerRegistry, Orchestrator};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "form-pilot", about = "Drive job-application forms from a candidate profile")]
struct Cli {
    /// Path to the YAML configuration.
    #[arg(long, short, default_value = "pilot.yaml")]
    config: PathBuf,

    /// Run the browser with a visible window regardless of the config.
    #[arg(long)]
    headed: bool,

    /// Emit JSON-encoded logs instead of text.
    #[arg(long)]
    json_logs: bool,

    /// Duplicate log events to stderr.
    #[arg(long, short)]
    verbose: bool,
}

fn pacing_profile(settings: &PacingSettings) -> PacingProfile {
    let range = |b: pilot_config::DelayBounds| DelayRange::new(b.min_ms, b.max_ms);
    PacingProfile {
        letter_keystroke: range(settings.letter_keystroke),
        digit_keystroke: range(settings.digit_keystroke),
        symbol_keystroke: range(settings.symbol_keystroke),
        micro_pause: range(settings.micro_pause),
        micro_pause_chance: settings.micro_pause_chance,
        action_gap: range(settings.action_gap),
        hover_gap: range(settings.hover_gap),
        reading_pause: range(settings.reading_pause),
        settle: range(settings.settle),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = PilotConfigLoader::new().with_file(&cli.config).load()?;

    let log_path = init_logging(LogConfig {
        emit_stderr: cli.verbose,
        format: if cli.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..LogConfig::default()
    })?;
    info!(
        target: "app",
        config = %cli.config.display(),
        log = %log_path.display(),
        targets = cfg.targets.len(),
        "form-pilot starting"
    );

    let headless = cfg.browser.headless && !cli.headed;
    let factory = PilotDriver::new(&cfg.browser.webdriver_url, headless);
    let pacing = Arc::new(HumanPacing::new(pacing_profile(&cfg.pacing)));

    let mut orchestrator = Orchestrator::new(HandlerRegistry::with_defaults(), pacing);
    if let Some(docgen) = &cfg.docgen {
        orchestrator = orchestrator.with_artifacts(Arc::new(CoverLetterProvider::new(
            docgen.output_dir.clone(),
            docgen.fallback_attachment.clone(),
        )));
    }

    let reports = orchestrator
        .run(&factory, &cfg.profile, &cfg.targets)
        .await;

    let mut failures = 0usize;
    for report in &reports {
        let r = &report.result;
        if r.success {
            println!(
                "{}: submitted ({}) in {} ms",
                report.target.name,
                r.confirmation_id.as_deref().unwrap_or("no confirmation id"),
                r.duration_ms
            );
        } else {
            failures += 1;
            println!(
                "{}: FAILED ({}) after {} ms",
                report.target.name,
                r.error.as_deref().unwrap_or("unknown error"),
                r.duration_ms
            );
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} submissions failed", reports.len());
    }
    Ok(())
}
