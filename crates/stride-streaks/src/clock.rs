use chrono::{DateTime, Utc};

/// Source of "now", injected wherever current time is needed so tests can
/// pin arbitrary dates. Never a process-wide override.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
