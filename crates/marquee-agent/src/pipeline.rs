//! # Overlay Pipeline
//!
//! Wiring layer that starts the coordinator actor and hands out the channel
//! interface around it:
//! - [`IntakeSender`] for pushes, settings and resets
//! - a broadcast of [`DisplayEvent`]s
//! - status and stats queries
//! - bridges from arbitrary streams into the intake

use std::sync::Arc;

use futures::{Stream, StreamExt};
use marquee_core::effects::{Animator, BootstrapSource, PhysicalTimeEffects, Renderer};
use marquee_core::{IntakeEvent, MarqueeError, PushUpdate, Result, SettingsUpdate};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::CoordinatorOptions;
use crate::coordinator::{Command, Coordinator};
use crate::events::DisplayEvent;
use crate::phase::PhaseRunner;
use crate::state::{CoordinatorStats, CoordinatorStatus};
use crate::task_registry::TaskRegistry;

/// Effect handlers the coordinator drives.
#[derive(Clone)]
pub struct CoordinatorEffects {
    pub time: Arc<dyn PhysicalTimeEffects>,
    pub renderer: Arc<dyn Renderer>,
    pub animator: Arc<dyn Animator>,
    /// Startup source; `None` waits for the first settings message.
    pub bootstrap: Option<Arc<dyn BootstrapSource>>,
}

impl CoordinatorEffects {
    pub fn new(
        time: Arc<dyn PhysicalTimeEffects>,
        renderer: Arc<dyn Renderer>,
        animator: Arc<dyn Animator>,
    ) -> Self {
        Self {
            time,
            renderer,
            animator,
            bootstrap: None,
        }
    }

    pub fn with_bootstrap(mut self, bootstrap: Arc<dyn BootstrapSource>) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }
}

impl std::fmt::Debug for CoordinatorEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorEffects")
            .field("bootstrap", &self.bootstrap.is_some())
            .finish_non_exhaustive()
    }
}

/// Cloneable handle for feeding the coordinator.
#[derive(Debug, Clone)]
pub struct IntakeSender {
    tx: mpsc::Sender<Command>,
}

impl IntakeSender {
    pub async fn push(&self, update: PushUpdate) -> Result<()> {
        self.send_command(Command::Push(update)).await
    }

    /// Forward an unparsed push; malformed documents are logged and counted
    /// by the coordinator.
    pub async fn push_json(&self, raw: impl Into<String>) -> Result<()> {
        self.send_command(Command::PushRaw(raw.into())).await
    }

    pub async fn settings(&self, settings: SettingsUpdate) -> Result<()> {
        self.send_command(Command::Settings(settings)).await
    }

    /// Forward an unparsed settings document; one that fails to parse keeps
    /// the current configuration.
    pub async fn settings_json(&self, raw: impl Into<String>) -> Result<()> {
        self.send_command(Command::SettingsRaw(raw.into())).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send_command(Command::Reset).await
    }

    pub async fn send(&self, event: IntakeEvent) -> Result<()> {
        match event {
            IntakeEvent::Push(update) => self.push(update).await,
            IntakeEvent::Settings(settings) => self.settings(settings).await,
            IntakeEvent::Reset => self.reset().await,
        }
    }

    async fn send_command(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| MarqueeError::channel("coordinator is not running"))
    }
}

/// Owns the running coordinator and its bridges.
pub struct OverlayPipeline {
    intake: IntakeSender,
    events: broadcast::Sender<DisplayEvent>,
    shutdown_tx: mpsc::Sender<()>,
    coordinator_task: JoinHandle<()>,
    tasks: TaskRegistry,
}

impl OverlayPipeline {
    /// Validate `options`, spawn the coordinator and start bootstrapping.
    pub fn start(effects: CoordinatorEffects, options: CoordinatorOptions) -> Result<Self> {
        if options.intake_capacity == 0 {
            return Err(MarqueeError::invalid("intake_capacity must be positive"));
        }
        if options.event_capacity == 0 {
            return Err(MarqueeError::invalid("event_capacity must be positive"));
        }
        if options.bootstrap_timeout_ms == 0 {
            return Err(MarqueeError::invalid("bootstrap_timeout_ms must be positive"));
        }
        if options.self_key.trim().is_empty() {
            return Err(MarqueeError::invalid("self_key must not be blank"));
        }

        let (intake_tx, intake_rx) = mpsc::channel(options.intake_capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (events, _) = broadcast::channel(options.event_capacity);

        let runner = PhaseRunner::new(
            Arc::clone(&effects.time),
            effects.renderer,
            effects.animator,
        );
        let coordinator = Coordinator::new(
            &options,
            runner,
            effects.time,
            effects.bootstrap,
            intake_rx,
            shutdown_rx,
            events.clone(),
        );
        let coordinator_task = tokio::spawn(coordinator.run());

        tracing::info!(self_key = %options.self_key, "Overlay pipeline started");
        Ok(Self {
            intake: IntakeSender { tx: intake_tx },
            events,
            shutdown_tx,
            coordinator_task,
            tasks: TaskRegistry::new(),
        })
    }

    pub fn intake(&self) -> IntakeSender {
        self.intake.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> Result<CoordinatorStatus> {
        let (reply, rx) = oneshot::channel();
        self.intake.send_command(Command::Status(reply)).await?;
        rx.await
            .map_err(|_| MarqueeError::channel("coordinator dropped status query"))
    }

    pub async fn stats(&self) -> Result<CoordinatorStats> {
        let (reply, rx) = oneshot::channel();
        self.intake.send_command(Command::Stats(reply)).await?;
        rx.await
            .map_err(|_| MarqueeError::channel("coordinator dropped stats query"))
    }

    /// Forward every item of `stream` as a push until it ends or the
    /// pipeline shuts down.
    pub fn attach_push_stream<S>(&self, stream: S)
    where
        S: Stream<Item = PushUpdate> + Send + 'static,
    {
        let intake = self.intake();
        self.tasks.spawn_cancellable(async move {
            futures::pin_mut!(stream);
            while let Some(update) = stream.next().await {
                if intake.push(update).await.is_err() {
                    break;
                }
            }
        });
    }

    pub fn attach_settings_stream<S>(&self, stream: S)
    where
        S: Stream<Item = SettingsUpdate> + Send + 'static,
    {
        let intake = self.intake();
        self.tasks.spawn_cancellable(async move {
            futures::pin_mut!(stream);
            while let Some(settings) = stream.next().await {
                if intake.settings(settings).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Number of stream bridges still running.
    pub fn active_bridges(&self) -> usize {
        self.tasks.active()
    }

    /// Stop the bridges, the scheduler and the coordinator, and wait for the
    /// coordinator to exit.
    pub async fn shutdown(self) -> Result<()> {
        self.tasks.shutdown();
        let _ = self.shutdown_tx.send(()).await;
        self.coordinator_task
            .await
            .map_err(|e| MarqueeError::internal(format!("coordinator task failed: {e}")))?;
        tracing::info!("Overlay pipeline stopped");
        Ok(())
    }
}

impl std::fmt::Debug for OverlayPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayPipeline")
            .field("bridges", &self.tasks.active())
            .finish_non_exhaustive()
    }
}
