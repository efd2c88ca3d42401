//! # Marquee Agent - Rotation Coordinator
//!
//! Runtime crate that cycles a set of keyed data sources through a single
//! render target, with animated leave/enter transitions, live data refresh
//! and reconfiguration at any time.
//!
//! ## Components
//!
//! - **SnapshotCache**: latest payload per key, fed by pushes
//! - **RotationScheduler**: the one cancellable rotation timer
//! - **TransitionController**: serialises out/in phases; newest request wins
//! - **ConfigurationReactor**: settings and reset → new rotation + version
//! - **OverlayPipeline**: spawns the coordinator actor and exposes intake,
//!   events, status and stats
//!
//! ## Ordering
//!
//! Asynchronous work is ordered by two counters. A `ConfigVersion` is bumped
//! by every reconfiguration and reset; a `Generation` is issued per show
//! request. Work tagged with an older version, or older than the newest
//! accepted generation, is dropped without touching the screen.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marquee_agent::{CoordinatorEffects, CoordinatorOptions, OverlayPipeline};
//!
//! let pipeline = OverlayPipeline::start(
//!     CoordinatorEffects::new(time, renderer, animator).with_bootstrap(bootstrap),
//!     CoordinatorOptions::default(),
//! )?;
//! let intake = pipeline.intake();
//! intake.push_json(r#"{"key":"gifter","payload":{"name":"Ann"}}"#).await?;
//! pipeline.shutdown().await?;
//! ```

#![allow(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
mod coordinator;
pub mod events;
pub mod phase;
pub mod pipeline;
pub mod reactor;
pub mod scheduler;
pub mod state;
pub mod task_registry;
pub mod transition;

pub use cache::SnapshotCache;
pub use config::{CoordinatorOptions, DEFAULT_SELF_KEY};
pub use events::DisplayEvent;
pub use pipeline::{CoordinatorEffects, IntakeSender, OverlayPipeline};
pub use reactor::{ConfigurationReactor, Reconfigured};
pub use scheduler::RotationScheduler;
pub use state::{CoordinatorState, CoordinatorStats, CoordinatorStatus};
pub use task_registry::TaskRegistry;
pub use transition::{DropReason, PhaseCommand, RequestOutcome, ShowRequest, TransitionController};
