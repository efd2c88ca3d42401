//! # Coordinator
//!
//! Single-actor event loop that owns all mutable rotation state: the
//! snapshot cache, the scheduler, the transition controller and the
//! reactor. Every input (timer ticks, phase completions, pushes, settings,
//! resets, queries) arrives as a message, so no two handlers ever interleave.
//!
//! ## Priorities
//!
//! The loop is biased: shutdown first, then internal messages (ticks,
//! phase completions and bootstrap results), then external intake. Internal
//! work is bounded by the one timer, the one running phase and the one
//! bootstrap task, so intake cannot starve.
//!
//! ## Bootstrap
//!
//! Initial fetches run in their own task, each bounded by
//! `bootstrap_timeout_ms`, and report back through the mailbox. Live intake
//! is served meanwhile and always wins: bootstrap settings are ignored once
//! any configuration or reset has been applied, and bootstrap snapshots
//! never overwrite a pushed one.

use std::future::Future;
use std::sync::Arc;

use marquee_core::effects::{BootstrapError, BootstrapSource, PhysicalTimeEffects};
use marquee_core::{
    AnimationDirection, ConfigVersion, DisplayContent, DisplayTarget, EmptyReason, PushUpdate,
    SettingsUpdate,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::cache::SnapshotCache;
use crate::config::CoordinatorOptions;
use crate::events::DisplayEvent;
use crate::phase::{PhaseGauge, PhaseReport, PhaseRunner, PhaseWork};
use crate::reactor::{ConfigurationReactor, Reconfigured};
use crate::scheduler::{RotationScheduler, TickHandler};
use crate::state::{CoordinatorState, CoordinatorStats, CoordinatorStatus};
use crate::transition::{DropReason, PhaseCommand, RequestOutcome, ShowRequest, TransitionController};

/// Messages accepted from outside the actor.
#[derive(Debug)]
pub(crate) enum Command {
    Push(PushUpdate),
    PushRaw(String),
    Settings(SettingsUpdate),
    SettingsRaw(String),
    Reset,
    Status(oneshot::Sender<CoordinatorStatus>),
    Stats(oneshot::Sender<CoordinatorStats>),
}

/// Messages the actor sends itself.
#[derive(Debug)]
enum Internal {
    Tick { version: ConfigVersion, index: usize },
    PhaseDone(PhaseReport),
    BootstrapSnapshots(Result<Vec<PushUpdate>, BootstrapError>),
    BootstrapSettings(Result<SettingsUpdate, BootstrapError>),
}

pub(crate) struct Coordinator {
    state: CoordinatorState,
    cache: SnapshotCache,
    scheduler: RotationScheduler,
    controller: TransitionController,
    reactor: ConfigurationReactor,
    runner: PhaseRunner,
    gauge: Arc<PhaseGauge>,
    time: Arc<dyn PhysicalTimeEffects>,
    bootstrap: Option<Arc<dyn BootstrapSource>>,
    bootstrap_timeout_ms: u64,
    bootstrap_task: Option<JoinHandle<()>>,

    /// Command that started the running phase.
    in_flight: Option<PhaseCommand>,
    phase_task: Option<JoinHandle<()>>,

    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    intake_rx: mpsc::Receiver<Command>,
    shutdown_rx: mpsc::Receiver<()>,
    events: broadcast::Sender<DisplayEvent>,
    stats: CoordinatorStats,
}

impl Coordinator {
    pub(crate) fn new(
        options: &CoordinatorOptions,
        runner: PhaseRunner,
        time: Arc<dyn PhysicalTimeEffects>,
        bootstrap: Option<Arc<dyn BootstrapSource>>,
        intake_rx: mpsc::Receiver<Command>,
        shutdown_rx: mpsc::Receiver<()>,
        events: broadcast::Sender<DisplayEvent>,
    ) -> Self {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        Self {
            state: CoordinatorState::new(),
            cache: SnapshotCache::new(),
            scheduler: RotationScheduler::new(Arc::clone(&time)),
            controller: TransitionController::new(),
            reactor: ConfigurationReactor::new(&options.self_key, options.default_interval_ms),
            runner,
            gauge: Arc::new(PhaseGauge::default()),
            time,
            bootstrap,
            bootstrap_timeout_ms: options.bootstrap_timeout_ms,
            bootstrap_task: None,
            in_flight: None,
            phase_task: None,
            internal_tx,
            internal_rx,
            intake_rx,
            shutdown_rx,
            events,
            stats: CoordinatorStats::default(),
        }
    }

    pub(crate) async fn run(mut self) {
        tracing::info!("Coordinator starting");
        self.start_bootstrap();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    tracing::debug!("Coordinator received shutdown");
                    break;
                }

                Some(internal) = self.internal_rx.recv() => match internal {
                    Internal::Tick { version, index } => self.on_tick(version, index),
                    Internal::PhaseDone(report) => self.on_phase_done(report),
                    Internal::BootstrapSnapshots(result) => self.on_bootstrap_snapshots(result).await,
                    Internal::BootstrapSettings(result) => self.on_bootstrap_settings(result),
                },

                command = self.intake_rx.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    None => {
                        tracing::debug!("All intake senders dropped");
                        break;
                    }
                },
            }
        }

        self.scheduler.stop();
        for task in [self.phase_task.take(), self.bootstrap_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
        tracing::info!(
            ticks = self.stats.ticks,
            renders = self.stats.renders,
            "Coordinator stopped"
        );
    }

    /// Fetch snapshots, then settings, so the first configured render
    /// already has data.
    fn start_bootstrap(&mut self) {
        let Some(source) = self.bootstrap.clone() else {
            return;
        };
        let time = Arc::clone(&self.time);
        let timeout_ms = self.bootstrap_timeout_ms;
        let done_tx = self.internal_tx.clone();
        self.bootstrap_task = Some(tokio::spawn(async move {
            let snapshots = within(&*time, timeout_ms, source.fetch_snapshots()).await;
            if done_tx.send(Internal::BootstrapSnapshots(snapshots)).is_err() {
                return;
            }
            let settings = within(&*time, timeout_ms, source.fetch_settings()).await;
            let _ = done_tx.send(Internal::BootstrapSettings(settings));
        }));
    }

    async fn on_bootstrap_snapshots(&mut self, result: Result<Vec<PushUpdate>, BootstrapError>) {
        let snapshots = match result {
            Ok(snapshots) => snapshots,
            Err(err) => {
                tracing::warn!(error = %err, "Bootstrap snapshots unavailable");
                return;
            }
        };
        if self.stats.resets > 0 {
            tracing::debug!("Session reset before bootstrap snapshots arrived, discarding them");
            return;
        }

        let received_at = self.now().await;
        let showing = self.controller.showing_key().cloned();
        let mut loaded = 0usize;
        let mut refresh = None;
        for update in snapshots {
            let (key, payload) = update.sanitized_payload();
            if self.cache.get(&key).is_some() {
                continue;
            }
            if showing.as_ref() == Some(&key) {
                refresh = Some(key.clone());
            }
            self.cache.put(key, payload, received_at);
            loaded += 1;
        }
        tracing::info!(count = loaded, "Bootstrap snapshots loaded");

        if let Some(key) = refresh {
            self.request(DisplayTarget::Entry { key }, true);
        }
    }

    fn on_bootstrap_settings(&mut self, result: Result<SettingsUpdate, BootstrapError>) {
        self.bootstrap_task = None;
        if self.state.config_version != ConfigVersion::default() {
            tracing::debug!("Live configuration already applied, ignoring bootstrap settings");
            return;
        }
        match result {
            Ok(settings) => self.on_settings(settings),
            Err(err) => {
                tracing::warn!(error = %err, "Bootstrap settings unavailable, showing unconfigured state");
                self.request(DisplayTarget::empty(EmptyReason::Unconfigured), false);
            }
        }
    }

    async fn on_command(&mut self, command: Command) {
        match command {
            Command::Push(update) => self.on_push(update).await,
            Command::PushRaw(raw) => match PushUpdate::from_json(&raw) {
                Ok(update) => self.on_push(update).await,
                Err(err) => {
                    self.stats.malformed_intake += 1;
                    tracing::warn!(error = %err, "Discarding malformed push");
                }
            },
            Command::Settings(settings) => self.on_settings(settings),
            Command::SettingsRaw(raw) => self.on_settings_raw(&raw),
            Command::Reset => self.on_reset(),
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
            Command::Stats(reply) => {
                let _ = reply.send(self.stats());
            }
        }
    }

    fn on_tick(&mut self, version: ConfigVersion, index: usize) {
        if version != self.state.config_version {
            tracing::trace!(%version, index, "Ignoring tick from replaced timer");
            return;
        }
        let Some(key) = self.state.rotation.key_at(index).cloned() else {
            return;
        };
        self.stats.ticks += 1;
        self.state.current_index = index;
        tracing::debug!(%key, index, "Rotation tick");
        self.request(DisplayTarget::Entry { key }, false);
    }

    async fn on_push(&mut self, update: PushUpdate) {
        self.stats.pushes += 1;
        let received_at = self.now().await;
        let (key, payload) = update.sanitized_payload();
        self.cache.put(key.clone(), payload, received_at);

        if self.controller.showing_key() == Some(&key) {
            tracing::debug!(%key, "Push for the entry on screen, re-rendering");
            self.request(DisplayTarget::Entry { key }, true);
        }
    }

    fn on_settings(&mut self, settings: SettingsUpdate) {
        let bind = self.tick_binder();
        let outcome = self
            .reactor
            .apply_config(settings, &mut self.state, &mut self.scheduler, bind);
        self.after_reconfigure(outcome);
    }

    fn on_settings_raw(&mut self, raw: &str) {
        let bind = self.tick_binder();
        match self
            .reactor
            .apply_raw(raw, &mut self.state, &mut self.scheduler, bind)
        {
            Some(outcome) => self.after_reconfigure(outcome),
            None => self.stats.malformed_intake += 1,
        }
    }

    fn after_reconfigure(&mut self, outcome: Reconfigured) {
        let version = outcome.version();
        self.controller.invalidate(version);
        self.stats.configs_applied += 1;
        self.emit(DisplayEvent::ConfigApplied {
            version,
            keys: self.state.rotation.keys().to_vec(),
            interval_ms: self.state.rotation.interval_ms(),
        });
        if let Reconfigured::Empty { reason, .. } = outcome {
            self.request(DisplayTarget::empty(reason), false);
        }
    }

    fn on_reset(&mut self) {
        let outcome = self
            .reactor
            .reset(&mut self.state, &mut self.scheduler, &mut self.cache);
        let version = outcome.version();
        self.controller.invalidate(version);
        self.stats.resets += 1;
        self.emit(DisplayEvent::SessionReset { version });
        self.request(DisplayTarget::empty(EmptyReason::Reset), true);
    }

    fn on_phase_done(&mut self, report: PhaseReport) {
        if report.animation_failed {
            self.stats.animation_failures += 1;
        }
        if report.render_failed {
            self.stats.render_failures += 1;
        }

        let finished = match self.in_flight.take() {
            Some(command) if command.generation() == report.generation => Some(command),
            other => {
                self.in_flight = other;
                None
            }
        };
        if let Some(PhaseCommand::RenderIn {
            target,
            generation,
            forced,
        }) = finished
        {
            self.stats.renders += 1;
            if forced {
                self.stats.forced_renders += 1;
            }
            self.emit(DisplayEvent::Rendered {
                target,
                generation,
                forced,
            });
        }

        let live = self.state.config_version;
        if let Some(next) = self.controller.phase_completed(report.generation, live) {
            self.launch(next);
        }
    }

    /// Route a show request through the transition controller.
    fn request(&mut self, target: DisplayTarget, forced: bool) {
        let request = ShowRequest {
            target,
            generation: self.controller.issue(),
            config_version: self.state.config_version,
            forced,
        };
        let generation = request.generation;
        match self.controller.request_show(request, self.state.config_version) {
            RequestOutcome::Started(command) => self.launch(command),
            RequestOutcome::Queued => {
                tracing::debug!(%generation, "Transition queued behind running phase");
            }
            RequestOutcome::AlreadyShown => {
                self.stats.noop_requests += 1;
            }
            RequestOutcome::Dropped(reason) => {
                match reason {
                    DropReason::StaleConfig => self.stats.dropped_stale_config += 1,
                    DropReason::Superseded => self.stats.dropped_superseded += 1,
                }
                tracing::debug!(%generation, ?reason, "Request dropped");
                self.emit(DisplayEvent::RequestDropped { generation, reason });
            }
        }
    }

    /// Spawn the phase task for `command`. Content is resolved from the
    /// cache at this point, so a render always reads the freshest snapshot.
    fn launch(&mut self, command: PhaseCommand) {
        let generation = command.generation();
        self.emit(DisplayEvent::PhaseEntered {
            phase: command.phase(),
            generation,
        });

        let work = match &command {
            PhaseCommand::AnimateOut { generation } => PhaseWork::Out {
                generation: *generation,
                step: self.state.animation.step(AnimationDirection::Out),
            },
            PhaseCommand::RenderIn {
                target,
                generation,
                forced,
            } => PhaseWork::In {
                generation: *generation,
                content: self.resolve(target),
                forced: *forced,
                step: self.state.animation.step(AnimationDirection::In),
            },
        };
        self.in_flight = Some(command);

        let runner = self.runner.clone();
        let gauge = Arc::clone(&self.gauge);
        let done_tx = self.internal_tx.clone();
        self.phase_task = Some(tokio::spawn(async move {
            let report = {
                let _running = gauge.enter();
                runner.run(work).await
            };
            let _ = done_tx.send(Internal::PhaseDone(report));
        }));
    }

    fn resolve(&self, target: &DisplayTarget) -> DisplayContent {
        match target {
            DisplayTarget::Entry { key } => DisplayContent::Entry {
                key: key.clone(),
                snapshot: self.cache.get(key).cloned(),
            },
            DisplayTarget::Empty { reason } => DisplayContent::Empty { reason: *reason },
        }
    }

    /// Tick handlers post back into the mailbox tagged with the version they
    /// were created for.
    fn tick_binder(&self) -> impl FnOnce(ConfigVersion) -> TickHandler {
        let tx = self.internal_tx.clone();
        move |version: ConfigVersion| -> TickHandler {
            Box::new(move |index: usize| {
                let _ = tx.send(Internal::Tick { version, index });
            })
        }
    }

    async fn now(&self) -> marquee_core::PhysicalTime {
        match self.time.physical_time().await {
            Ok(now) => now,
            Err(err) => {
                tracing::warn!(error = %err, "Clock unavailable, stamping snapshot at epoch");
                marquee_core::PhysicalTime::default()
            }
        }
    }

    fn emit(&self, event: DisplayEvent) {
        let _ = self.events.send(event);
    }

    fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            config_version: self.state.config_version,
            current_index: self.state.current_index,
            keys: self.state.rotation.keys().to_vec(),
            interval_ms: self.state.rotation.interval_ms(),
            phase: self.controller.phase(),
            displayed: self.controller.displayed().cloned(),
            displayed_key: self.controller.displayed_key().cloned(),
            generation: self.controller.latest_generation(),
            timer_active: self.scheduler.is_running(),
            live_timers: self.scheduler.live_timers(),
            cached_keys: self.cache.len(),
        }
    }

    fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            timers_started: self.scheduler.timers_started(),
            timers_stopped: self.scheduler.timers_stopped(),
            max_concurrent_phases: self.gauge.peak(),
            ..self.stats.clone()
        }
    }
}

/// Bound a bootstrap fetch; running out of time counts as unreachable.
async fn within<T, F>(
    time: &dyn PhysicalTimeEffects,
    timeout_ms: u64,
    fetch: F,
) -> Result<T, BootstrapError>
where
    F: Future<Output = Result<T, BootstrapError>>,
{
    tokio::select! {
        biased;

        result = fetch => result,
        slept = time.sleep_ms(timeout_ms) => {
            if let Err(err) = slept {
                tracing::warn!(error = %err, "Bootstrap timer failed");
            }
            Err(BootstrapError::Unreachable {
                reason: format!("no response within {timeout_ms}ms"),
            })
        }
    }
}
