//! Effect interfaces (no implementations).
//!
//! Handlers live in `marquee-effects`; test doubles in `marquee-testkit`.
//! The coordinator only ever talks to the outside world through these.

pub mod animation;
pub mod bootstrap;
pub mod render;
pub mod time;

pub use animation::{AnimationError, Animator};
pub use bootstrap::{BootstrapError, BootstrapSource};
pub use render::{RenderError, Renderer};
pub use time::{PhysicalTimeEffects, TimeError};
