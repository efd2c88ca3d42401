//! Renderer double that records every mounted frame.

use async_trait::async_trait;
use marquee_core::effects::{RenderError, Renderer};
use marquee_core::{DisplayContent, EmptyReason};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub content: DisplayContent,
    pub forced: bool,
}

impl RenderedFrame {
    /// Key for entries, `empty:<reason>` for the empty state.
    pub fn label(&self) -> String {
        match &self.content {
            DisplayContent::Entry { key, .. } => key.to_string(),
            DisplayContent::Empty { reason } => format!("empty:{}", reason_label(*reason)),
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        self.content.snapshot().and_then(|s| s.payload.as_ref())
    }
}

fn reason_label(reason: EmptyReason) -> &'static str {
    match reason {
        EmptyReason::NoSources => "no_sources",
        EmptyReason::Reset => "reset",
        EmptyReason::Unconfigured => "unconfigured",
    }
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Mutex<Vec<RenderedFrame>>,
    failing: Mutex<bool>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following render fail after recording the attempt.
    pub fn fail_renders(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn frames(&self) -> Vec<RenderedFrame> {
        self.frames.lock().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.frames.lock().iter().map(RenderedFrame::label).collect()
    }

    pub fn last(&self) -> Option<RenderedFrame> {
        self.frames.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn clear(&self) {
        self.frames.lock().clear();
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn render(&self, content: &DisplayContent, forced: bool) -> Result<(), RenderError> {
        self.frames.lock().push(RenderedFrame {
            content: content.clone(),
            forced,
        });
        if *self.failing.lock() {
            return Err(RenderError::Template {
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}
