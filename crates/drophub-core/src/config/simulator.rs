//! Simulated transfer cadence configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Step size and pacing for the simulated upload transfer.
///
/// The cadence is policy, not correctness: any step size in 1–100
/// produces a valid monotone progress sequence ending at 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Progress increment per step, in percent (default 10).
    #[serde(default = "default_step_percent")]
    pub step_percent: u8,
    /// Pause before each step, in milliseconds (default 150).
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
}

impl SimulatorConfig {
    /// The pause before each progress step.
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            step_percent: default_step_percent(),
            step_interval_ms: default_step_interval_ms(),
        }
    }
}

fn default_step_percent() -> u8 {
    10
}

fn default_step_interval_ms() -> u64 {
    150
}
