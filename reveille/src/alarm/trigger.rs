//! Deciding when the alarm fires.
//!
//! # State Machine
//!
//! ```text
//!         armed, minute matches, second < 5, guard open
//!  Idle ─────────────────────────────────────────────────► Ringing
//!   ▲                                                         │
//!   │          silence() (button, API, or auto-dismiss)       │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler is polled, so "current minute equals alarm minute" holds
//! for a whole minute of ticks. Two rules together make it fire once per
//! matching minute:
//!
//! - **Trigger window:** only the first [`TRIGGER_WINDOW_SECS`] seconds of
//!   the minute count, so a tick that lands late (jitter, a slow render)
//!   still catches it, unlike an exact `second == 0` check.
//! - **Suppression interval:** after firing, the alarm stays closed for
//!   [`SUPPRESSION_INTERVAL`], even if silenced while the window is still
//!   open.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::AlarmConfig;
use crate::types::WallTime;

/// Seconds at the start of the alarm minute during which it may fire.
pub const TRIGGER_WINDOW_SECS: u8 = 5;

/// Minimum time between two firings.
pub const SUPPRESSION_INTERVAL: Duration = Duration::from_secs(55);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    #[default]
    Idle,
    Ringing,
}

/// Result of [`AlarmTrigger::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerStatus {
    /// Nothing to do.
    Idle,

    /// Fired on this tick. Returned exactly once per firing; the caller
    /// starts notification dispatch.
    Triggered,

    /// Still ringing from an earlier trigger. Not re-entrant.
    Ringing,

    /// Trigger condition holds but the alarm fired less than
    /// [`SUPPRESSION_INTERVAL`] ago.
    Suppressed,
}

/// Remembers the last firing and enforces [`SUPPRESSION_INTERVAL`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerGuard {
    last_trigger: Option<Instant>,
}

impl TriggerGuard {
    /// True if no firing happened, or the last one is more than the
    /// suppression interval ago.
    pub fn is_open(&self, now: Instant) -> bool {
        self.last_trigger
            .is_none_or(|last| now.saturating_duration_since(last) > SUPPRESSION_INTERVAL)
    }

    pub fn record(&mut self, now: Instant) {
        self.last_trigger = Some(now);
    }

    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }
}

/// The Idle/Ringing state machine.
#[derive(Debug, Default)]
pub struct AlarmTrigger {
    state: AlarmState,
    guard: TriggerGuard,
}

impl AlarmTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn is_ringing(&self) -> bool {
        self.state == AlarmState::Ringing
    }

    pub fn guard(&self) -> &TriggerGuard {
        &self.guard
    }

    /// Evaluate the trigger condition for this tick.
    ///
    /// | State   | armed and in window | guard  | Result       |
    /// |---------|---------------------|--------|--------------|
    /// | Ringing | any                 | any    | `Ringing`    |
    /// | Idle    | no                  | any    | `Idle`       |
    /// | Idle    | yes                 | closed | `Suppressed` |
    /// | Idle    | yes                 | open   | `Triggered`  |
    pub fn check(&mut self, config: &AlarmConfig, wall: WallTime, now: Instant) -> TriggerStatus {
        if self.is_ringing() {
            return TriggerStatus::Ringing;
        }

        if !in_trigger_window(config, wall) {
            return TriggerStatus::Idle;
        }

        if !self.guard.is_open(now) {
            return TriggerStatus::Suppressed;
        }

        self.guard.record(now);
        self.state = AlarmState::Ringing;
        TriggerStatus::Triggered
    }

    /// Ringing -> Idle. Returns false if it wasn't ringing.
    ///
    /// The guard is left alone, so silencing inside the trigger window
    /// does not re-arm the same minute.
    pub fn silence(&mut self) -> bool {
        let was_ringing = self.is_ringing();
        self.state = AlarmState::Idle;
        was_ringing
    }
}

fn in_trigger_window(config: &AlarmConfig, wall: WallTime) -> bool {
    config.enabled
        && wall.hour == config.time.hour()
        && wall.minute == config.time.minute()
        && wall.second < TRIGGER_WINDOW_SECS
}
