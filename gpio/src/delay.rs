//! Blocking delay sources.
//!
//! Every wait the LCD driver performs goes through a [Delay], so tests can record the requested
//! durations instead of sleeping.

use std::fmt::Debug;
use std::thread::sleep;
use std::time::Duration;

pub trait Delay: Debug {
    /// Blocks for at least `duration`.
    fn delay(&self, duration: Duration);

    /// Blocks for at least `ms` milliseconds.
    fn delay_ms(&self, ms: u64) {
        self.delay(Duration::from_millis(ms))
    }
}

/// Delay backed by [std::thread::sleep].
#[derive(Copy, Clone, Debug, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay(&self, duration: Duration) {
        sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn std_delay_blocks_at_least_the_duration() {
        let start = Instant::now();
        StdDelay.delay_ms(2);
        assert!(start.elapsed() >= Duration::from_millis(2));
    }
}
