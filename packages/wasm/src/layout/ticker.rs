//! Converts host frame timestamps into simulation time steps.

use serde::{Deserialize, Serialize};

/// Configuration for the tick driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Longest step handed to the simulation, in seconds (default: 0.1).
    pub max_dt: f64,
    /// Gaps longer than this many seconds yield a zero step (default: 1.0).
    pub inactive_timeout: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            max_dt: 0.1,
            inactive_timeout: 1.0,
        }
    }
}

/// Tracks the previous frame timestamp.
#[derive(Debug, Clone, Default)]
pub struct TickDriver {
    config: TickConfig,
    last_ms: Option<f64>,
}

impl TickDriver {
    pub fn new(config: TickConfig) -> Self {
        Self {
            config,
            last_ms: None,
        }
    }

    /// Record a frame at `timestamp_ms` and return the step in seconds.
    ///
    /// The first frame, frames after an idle gap and frames whose timestamp
    /// does not advance all produce 0.
    pub fn advance(&mut self, timestamp_ms: f64) -> f64 {
        let previous = self.last_ms.replace(timestamp_ms);
        let Some(previous) = previous else {
            return 0.0;
        };

        let dt = (timestamp_ms - previous) / 1000.0;
        if !(dt > 0.0 && dt.is_finite()) || dt > self.config.inactive_timeout {
            0.0
        } else {
            dt.min(self.config.max_dt)
        }
    }

    /// Forget the previous frame, e.g. after the host pauses rendering.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut ticker = TickDriver::default();
        assert_eq!(ticker.advance(1234.0), 0.0);
        assert!((ticker.advance(1250.0) - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_slow_frame_is_clamped() {
        let mut ticker = TickDriver::default();
        ticker.advance(0.0);
        assert_eq!(ticker.advance(500.0), 0.1);
    }

    #[test]
    fn test_idle_gap_is_zero() {
        let mut ticker = TickDriver::default();
        ticker.advance(0.0);
        assert_eq!(ticker.advance(2500.0), 0.0);
        // Normal cadence resumes from the new timestamp.
        assert!((ticker.advance(2520.0) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let mut ticker = TickDriver::default();
        ticker.advance(100.0);
        assert_eq!(ticker.advance(50.0), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut ticker = TickDriver::new(TickConfig {
            max_dt: 0.05,
            inactive_timeout: 10.0,
        });
        ticker.advance(0.0);
        assert_eq!(ticker.advance(200.0), 0.05);

        ticker.reset();
        assert_eq!(ticker.advance(300.0), 0.0);
    }
}
