//! Wall-clock sources.

use std::sync::Arc;

use parking_lot::Mutex;
use time::{OffsetDateTime, UtcOffset};

use crate::tracing::prelude::*;
use crate::types::WallTime;

/// Supplies the current time of day once per tick.
pub trait Clock: Send {
    fn now(&self) -> WallTime;
}

/// Local wall clock.
///
/// The UTC offset is captured once, at construction. On Unix the `time`
/// crate refuses to look up the local offset once other threads exist, so
/// construct this before starting the async runtime.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    /// Capture the local UTC offset, falling back to UTC if it can't be
    /// determined.
    pub fn detect() -> Self {
        let offset = match UtcOffset::current_local_offset() {
            Ok(offset) => offset,
            Err(e) => {
                warn!("Could not determine local UTC offset ({e}), using UTC");
                UtcOffset::UTC
            }
        };
        Self { offset }
    }

    pub fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> WallTime {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        WallTime::new(now.hour(), now.minute(), now.second())
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// the other to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<WallTime>>,
}

impl ManualClock {
    pub fn new(start: WallTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, time: WallTime) {
        *self.now.lock() = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> WallTime {
        *self.now.lock()
    }
}
