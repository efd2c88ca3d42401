//! `marquee check-settings`: show how a settings file normalises.

use std::path::Path;

use anyhow::{Context, Result};
use marquee_core::RotationSet;
use marquee_effects::bootstrap::parse_settings;

use crate::config::CliConfig;

pub fn run(path: &Path, config: &CliConfig) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings {}", path.display()))?;
    let settings = parse_settings(path, &raw)?;
    let set = RotationSet::from_settings(
        &settings,
        &config.coordinator.self_key,
        config.coordinator.default_interval_ms,
    );
    println!("{}", describe(&set));
    Ok(())
}

fn describe(set: &RotationSet) -> String {
    if set.is_empty() {
        return "no sources selected".to_string();
    }
    let keys: Vec<&str> = set.keys().iter().map(|key| key.as_str()).collect();
    let cadence = if set.is_recurring() {
        format!("every {}ms", set.interval_ms())
    } else {
        "static".to_string()
    };
    format!("{} ({cadence})", keys.join(", "))
}
