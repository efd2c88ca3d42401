//! Marquee Effects - production effect handlers
//!
//! Standard implementations of the effect traits defined in `marquee-core`:
//! a Tokio-backed clock, duration-accurate animators, a console renderer and
//! a file-backed bootstrap source.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

pub mod animation;
pub mod bootstrap;
pub mod render;
pub mod time;

pub use animation::{InstantAnimator, TimedAnimator};
pub use bootstrap::FileBootstrap;
pub use render::ConsoleRenderer;
pub use time::RealTimeHandler;
