//! Line-oriented renderer for terminals and logs.

use std::io::Write;

use async_trait::async_trait;
use marquee_core::effects::{RenderError, Renderer};
use marquee_core::{DisplayContent, EmptyReason};
use parking_lot::Mutex;

/// Writes one line per mounted frame.
pub struct ConsoleRenderer {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleRenderer {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl std::fmt::Debug for ConsoleRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleRenderer").finish_non_exhaustive()
    }
}

/// Single-line textual form of a frame.
pub fn format_frame(content: &DisplayContent, forced: bool) -> String {
    let marker = if forced { "*" } else { " " };
    match content {
        DisplayContent::Entry { key, snapshot } => match snapshot.as_ref().and_then(|s| s.payload.as_ref()) {
            Some(payload) => format!("{marker}[{key}] {payload}"),
            None => format!("{marker}[{key}] (no data yet)"),
        },
        DisplayContent::Empty { reason } => {
            let text = match reason {
                EmptyReason::NoSources => "no sources selected",
                EmptyReason::Reset => "session reset",
                EmptyReason::Unconfigured => "not configured",
            };
            format!("{marker}({text})")
        }
    }
}

#[async_trait]
impl Renderer for ConsoleRenderer {
    async fn render(&self, content: &DisplayContent, forced: bool) -> Result<(), RenderError> {
        let line = format_frame(content, forced);
        let mut out = self.out.lock();
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|e| RenderError::TargetUnavailable {
                reason: e.to_string(),
            })
    }
}
