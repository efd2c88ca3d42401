//! `marquee run`: drive the coordinator from JSON lines on stdin.
//!
//! Each line is `{"type":"push",...}`, `{"type":"settings",...}` or
//! `{"type":"reset"}`. Frames go to stdout; logs go to stderr. EOF shuts the
//! pipeline down.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use marquee_agent::{CoordinatorEffects, IntakeSender, OverlayPipeline};
use marquee_core::effects::{Animator, PhysicalTimeEffects};
use marquee_effects::{
    ConsoleRenderer, FileBootstrap, InstantAnimator, RealTimeHandler, TimedAnimator,
};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::CliConfig;

#[derive(Debug)]
pub struct RunArgs {
    pub settings: Option<PathBuf>,
    pub snapshots: Option<PathBuf>,
    /// Play animations for their configured durations.
    pub animate: bool,
}

/// Only the discriminant; the full line is handed to the coordinator so
/// malformed bodies are counted there.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
}

pub async fn run(args: RunArgs, config: CliConfig) -> Result<()> {
    let time: Arc<dyn PhysicalTimeEffects> = Arc::new(RealTimeHandler::new());
    let animator: Arc<dyn Animator> = if args.animate {
        Arc::new(TimedAnimator::new(Arc::clone(&time)))
    } else {
        Arc::new(InstantAnimator)
    };
    let mut effects =
        CoordinatorEffects::new(time, Arc::new(ConsoleRenderer::stdout()), animator);

    let settings = args.settings.or(config.bootstrap.settings);
    let snapshots = args.snapshots.or(config.bootstrap.snapshots);
    if settings.is_some() || snapshots.is_some() {
        effects = effects.with_bootstrap(Arc::new(FileBootstrap::new(settings, snapshots)));
    } else {
        tracing::info!("No bootstrap files configured, waiting for settings on stdin");
    }

    let pipeline = OverlayPipeline::start(effects, config.coordinator)?;
    let intake = pipeline.intake();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        forward(&intake, line).await?;
    }

    let stats = pipeline.stats().await?;
    tracing::info!(
        ticks = stats.ticks,
        renders = stats.renders,
        forced = stats.forced_renders,
        malformed = stats.malformed_intake,
        "Input closed, shutting down"
    );
    pipeline.shutdown().await?;
    Ok(())
}

async fn forward(intake: &IntakeSender, line: &str) -> Result<()> {
    let kind = match serde_json::from_str::<Envelope>(line) {
        Ok(envelope) => envelope.kind,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring line without a message type");
            return Ok(());
        }
    };
    match kind.as_str() {
        "push" => intake.push_json(line).await?,
        "settings" => intake.settings_json(line).await?,
        "reset" => intake.reset().await?,
        other => tracing::warn!(kind = other, "Ignoring unknown message type"),
    }
    Ok(())
}
