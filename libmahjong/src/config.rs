use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Client-side pacing and timeout knobs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Pause before each presentation step.
    pub step_delay_ms: u64,

    /// Pause between seats during the initial flower exchange.
    pub flower_step_delay_ms: u64,

    /// Countdown used when a prompt carries no remaining time.
    pub default_response_ms: u64,

    /// Whether an expired countdown produces the default submission.
    pub auto_skip_on_timeout: bool,

    /// Initial step capacity of a queued sequence.
    pub queue_capacity_hint: usize,
}

impl ClientConfig {
    #[must_use]
    pub const fn new(step_delay_ms: u64) -> Self {
        Self {
            step_delay_ms,
            flower_step_delay_ms: 0,
            default_response_ms: 10_000,
            auto_skip_on_timeout: true,
            queue_capacity_hint: 16,
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("failed to parse client config")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    #[inline]
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    #[inline]
    #[must_use]
    pub const fn flower_step_delay(&self) -> Duration {
        Duration::from_millis(self.flower_step_delay_ms)
    }

    #[inline]
    #[must_use]
    pub const fn default_response(&self) -> Duration {
        Duration::from_millis(self.default_response_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let cfg = ClientConfig::from_json_str(r#"{"step_delay_ms":250}"#).unwrap();
        assert_eq!(cfg.step_delay_ms, 250);
        assert_eq!(cfg.default_response_ms, 10_000);
        assert!(cfg.auto_skip_on_timeout);
        assert_eq!(cfg.queue_capacity_hint, 16);
        assert_eq!(ClientConfig::from_json_str("{}").unwrap(), ClientConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        ClientConfig::from_json_str(r#"{"step_delay":1}"#).unwrap_err();
        ClientConfig::from_json_str(r#"{"step_delay_ms":-1}"#).unwrap_err();
    }

    #[test]
    fn missing_file() {
        ClientConfig::from_path("/nonexistent/client.json").unwrap_err();
    }
}
