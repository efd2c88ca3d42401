//! Marquee Testing Infrastructure
//!
//! Doubles for the coordinator's effect traits plus helpers for driving
//! paused Tokio time.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! marquee-testkit = { path = "../marquee-testkit" }
//! ```
//!
//! ```rust,ignore
//! use marquee_testkit::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn rotates() {
//!     let renderer = RecordingRenderer::new();
//!     let animator = ScriptedAnimator::instant(paused_clock());
//!     // ... start a pipeline, then:
//!     pass_ms(5_000).await;
//!     assert_eq!(renderer.labels(), ["follower", "gifter"]);
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

pub mod animation;
pub mod bootstrap;
pub mod render;
pub mod time;

pub use animation::{ScriptedAnimator, StepScript};
pub use bootstrap::MemoryBootstrap;
pub use render::{RecordingRenderer, RenderedFrame};
pub use time::{init_test_tracing, pass_ms, paused_clock, settle};
