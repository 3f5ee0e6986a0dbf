use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use std::time::{Duration, Instant};

/// Source of wall-clock and monotonic time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
    fn instant(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Fires at most once per period. The first poll always fires.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        let fire = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.period,
        };
        if fire {
            self.last = Some(now);
        }
        fire
    }
}
