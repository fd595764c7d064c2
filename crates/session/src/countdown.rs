use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// A pending once-per-period tick.
///
/// Dropping the countdown cancels it; nothing fires afterwards.
#[derive(Debug)]
pub struct Countdown {
    interval: Interval,
}

impl Countdown {
    /// The first tick fires one full period after the start.
    pub fn start(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Waits for the next period. Cancel-safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
