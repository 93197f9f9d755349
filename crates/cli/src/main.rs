use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::fmt::SubscriberBuilder;

use reachset::{Configuration, ObstacleSetChecker, ReachabilityAnalysis, Rect};

#[derive(Parser)]
#[command(name = "reachset")]
#[command(about = "Reachable-set computation for automated road vehicles")]
struct Cmd {
    /// JSON configuration file
    #[arg(long)]
    config: PathBuf,

    /// JSON obstacle scenario (static and per-step dynamic rectangles in the
    /// curvilinear frame); omitted means free space
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Output path for the JSON result summary; printed to stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Obstacle scenario consumed by the AABB collision checker.
#[derive(Debug, Default, Deserialize)]
struct Scenario {
    #[serde(default)]
    static_obstacles: Vec<Rect>,
    /// Outer index is the step.
    #[serde(default)]
    dynamic_obstacles: Vec<Vec<Rect>>,
}

/// Error with the process exit code it maps to: 1 configuration, 2 collision
/// checker construction, 3 internal.
struct CliError {
    code: u8,
    inner: anyhow::Error,
}

fn main() -> ExitCode {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match run(&cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err.inner);
            ExitCode::from(err.code)
        }
    }
}

fn run(cmd: &Cmd) -> Result<(), CliError> {
    let config = load_config(&cmd.config).map_err(|inner| CliError { code: 1, inner })?;
    let checker = build_checker(cmd.scenario.as_deref(), &config)
        .map_err(|inner| CliError { code: 2, inner })?;

    let analysis = ReachabilityAnalysis::new(config, checker).map_err(|e| CliError {
        code: e.exit_code(),
        inner: e.into(),
    })?;
    let result = analysis.compute().map_err(|e| CliError {
        code: e.exit_code(),
        inner: e.into(),
    })?;

    let steps = result.max_step();
    let drivable_area: Vec<Vec<&Rect>> = (0..=steps)
        .map(|step| result.drivable_area_at(step).iter().collect())
        .collect();
    let num_nodes: Vec<usize> = (0..=steps)
        .map(|step| result.reachable_set_at(step).len())
        .collect();
    let summary = serde_json::json!({
        "version": reachset::VERSION,
        "steps": steps,
        "num_nodes": num_nodes,
        "drivable_area": drivable_area,
    });

    write_summary(cmd.out.as_deref(), &summary).map_err(|inner| CliError { code: 3, inner })?;
    tracing::info!(steps, "done");
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<Configuration> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration {}", path.display()))?;
    let config: Configuration = serde_json::from_str(&text)
        .with_context(|| format!("parsing configuration {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn build_checker(
    scenario: Option<&Path>,
    config: &Configuration,
) -> anyhow::Result<ObstacleSetChecker> {
    let scenario = match scenario {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            serde_json::from_str::<Scenario>(&text)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => Scenario::default(),
    };
    if config.reachable_set.rasterize_obstacles {
        tracing::debug!("scenario rectangles are consumed as-is; nothing to rasterize");
    }
    Ok(ObstacleSetChecker::new(
        scenario.static_obstacles,
        scenario.dynamic_obstacles,
        config.vehicle.ego.radius_disc,
    ))
}

fn write_summary(out: Option<&Path>, summary: &serde_json::Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(summary)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, text)
                .with_context(|| format!("writing summary {}", path.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}
