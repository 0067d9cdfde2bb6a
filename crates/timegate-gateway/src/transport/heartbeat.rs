//! Per-session keepalive ticker.
//!
//! One ticker per open session, owned by that session's relay loop so it can
//! never outlive the session. On the wire the tick becomes an SSE comment:
//! content-free, but enough to keep intermediaries from closing an idle stream.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub struct HeartbeatTicker {
    ticker: Interval,
}

impl HeartbeatTicker {
    /// The first tick fires one full interval after creation, not immediately.
    pub fn new(every: Duration) -> Self {
        let mut ticker = interval_at(Instant::now() + every, every);
        // A tick the relay could not consume in time is dropped, not replayed
        // in a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { ticker }
    }

    pub async fn tick(&mut self) {
        self.ticker.tick().await;
    }
}
