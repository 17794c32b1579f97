/// Exponential backoff shared by WiFi connects and failed update checks
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
    pub max_exponent: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        // 5s, 10s, 20s, 40s, then capped at 60s
        Self {
            base: Duration::from_secs(5),
            max: Duration::from_secs(60),
            max_exponent: 4,
        }
    }
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(self.max_exponent);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}
