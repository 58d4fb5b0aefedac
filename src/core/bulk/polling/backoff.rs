//! Exponential back-off between polling rounds

use crate::config::PollConfig;
use std::time::Duration;

/// Delay sequence `d0, d0*g, d0*g^2, ...`, optionally capped
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    growth_factor: f64,
    max_delay: Option<Duration>,
}

impl Backoff {
    pub fn new(initial: Duration, growth_factor: f64, max_delay: Option<Duration>) -> Self {
        Self {
            next: initial,
            growth_factor,
            max_delay,
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(
            config.initial_delay(),
            config.growth_factor,
            config.max_delay(),
        )
    }

    /// Delay to wait now; advances the sequence
    pub fn next_delay(&mut self) -> Duration {
        let current = self.capped(self.next);
        self.next = self.capped(grow(self.next, self.growth_factor));
        current
    }

    fn capped(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}

/// `delay * factor`, saturating instead of panicking on overflow
fn grow(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Delay that follows round `round` (1-based): `initial * factor^(round-1)`
pub fn delay_after_round(config: &PollConfig, round: u32) -> Duration {
    let exponent = round.saturating_sub(1) as i32;
    let delay = grow(config.initial_delay(), config.growth_factor.powi(exponent));
    match config.max_delay() {
        Some(max) => delay.min(max),
        None => delay,
    }
}
