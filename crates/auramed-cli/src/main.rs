//! AuraMed: edge respiratory triage from a cough recording and vitals.

use std::path::PathBuf;

use auramed_core::EdgeConfig;
use auramed_reason::ReasoningConfig;
use auramed_runtime::{LatencyTracker, Orchestrator};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod scenarios;

fn resolve_data_dir() -> PathBuf {
    std::env::var("AURAMED_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn build_orchestrator(data_dir: &std::path::Path) -> anyhow::Result<Orchestrator> {
    let config_path = std::env::var("AURAMED_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir.join("edge.json"));
    let config = EdgeConfig::load(Some(&config_path))?;

    let reasoning = ReasoningConfig::load(&data_dir.join("reasoning.json"));
    let reasoner = auramed_reason::create_reasoner(&reasoning)?;

    let model_dir = data_dir.join("models").join("hear");
    let encoder = auramed_audio::create_encoder(&config, Some(&model_dir));

    Ok(Orchestrator::new(config, encoder, reasoner))
}

fn print_help() {
    println!("AuraMed: edge respiratory triage");
    println!();
    println!("Usage: auramed <command>");
    println!();
    println!("Commands:");
    println!("  triage <audio.wav> --age <months> --rate <bpm> [flags]");
    println!("      --danger-signs --unable-to-drink --vomits-everything");
    println!("      --convulsions --lethargic    Danger-sign flags");
    println!("      --json                       Print the decision as JSON");
    println!("  demo [dir]                       Run the three demo journeys");
    println!("  status                           Show runtime configuration");
    println!("  help                             Show this help message");
    println!();
    println!("Environment:");
    println!("  AURAMED_DATA_DIR   data directory (default ./data)");
    println!("  AURAMED_CONFIG     edge config JSON (default <data>/edge.json)");
    println!("  RUST_LOG           log filter (default info)");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = resolve_data_dir();

    match args.get(1).map(String::as_str) {
        Some("triage") => {
            let parsed = args::parse_triage(&args[2..])?;
            let patient = parsed.patient()?;
            let orchestrator = build_orchestrator(&data_dir)?;

            let decision = orchestrator.predict(&parsed.audio, &patient)?;
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                scenarios::print_decision(&decision);
            }
        }
        Some("demo") => {
            let dir = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("demo"));
            let orchestrator = build_orchestrator(&data_dir)?;
            let journeys = scenarios::prepare(&dir, orchestrator.config().sample_rate)?;

            let mut tracker = LatencyTracker::new();
            let outcomes = scenarios::run(&orchestrator, &journeys, &mut tracker);
            scenarios::print_report(&outcomes, &tracker);

            let failed = outcomes.iter().filter(|o| !o.passed()).count();
            info!("Demo complete: {} of {} journeys passed", outcomes.len() - failed, outcomes.len());
            if failed > 0 {
                std::process::exit(1);
            }
        }
        Some("status") => {
            let orchestrator = build_orchestrator(&data_dir)?;
            println!("{}", serde_json::to_string_pretty(&orchestrator.status())?);
        }
        Some("--help") | Some("-h") | Some("help") | None => print_help(),
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'auramed help' for usage.", other);
            std::process::exit(1);
        }
    }

    Ok(())
}
