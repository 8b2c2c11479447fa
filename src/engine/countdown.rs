//! The one-second countdown timer driving live display refresh.

use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Single periodic timer. Starting a countdown replaces any previous
/// interval, so at most one timer is ever active; the first tick of a fresh
/// interval fires immediately, so a restart also redraws right away.
#[derive(Debug, Default)]
pub struct Countdown {
    interval: Option<Interval>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        let mut ticker = interval(TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(ticker);
    }

    /// Wait for the next tick; pends forever while no countdown is running.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}
