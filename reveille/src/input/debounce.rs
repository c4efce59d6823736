//! Debouncing raw button levels into press edges.
//!
//! Each button runs its own small state machine over two levels: the
//! last *observed* raw level and the last *confirmed* level.
//!
//! ```text
//!            raw level changes                stable for >= debounce
//!  Stable ─────────────────────► Settling ───────────────────────────► Stable
//!    ▲                             │  │          (confirm; emit edge
//!    │   raw returns to confirmed  │  │           if released→pressed)
//!    └─────────────────────────────┘  │
//!                                     │ raw changes again
//!                                     └──► Settling (timer restarts)
//! ```
//!
//! A press produces exactly one [`ButtonEdge`], however long it is held.
//! Bounce shorter than the debounce window only restarts the timer.
//! Releases are confirmed the same way but never produce an edge.

use std::time::Duration;

use strum::EnumCount;
use tokio::time::Instant;

use super::{ButtonEdge, ButtonId, RawLevels};

/// Debounce window used by the hardware variants.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, Default)]
struct ButtonState {
    observed: bool,
    changed_at: Option<Instant>,
    confirmed: bool,
}

impl ButtonState {
    /// Feed one raw sample. Returns true on a confirmed press.
    fn update(&mut self, level: bool, now: Instant, debounce: Duration) -> bool {
        if level != self.observed {
            self.observed = level;
            self.changed_at = Some(now);
        }

        if self.observed == self.confirmed {
            return false;
        }

        let stable = self
            .changed_at
            .is_none_or(|since| now.saturating_duration_since(since) >= debounce);
        if !stable {
            return false;
        }

        self.confirmed = self.observed;
        self.confirmed
    }
}

/// Per-button debouncer for all [`ButtonId`]s.
///
/// Owns every button's timers. [`poll`](Self::poll) is a pure function of
/// the raw levels, the timestamp, and that stored state.
#[derive(Debug)]
pub struct Debouncer {
    debounce: Duration,
    buttons: [ButtonState; ButtonId::COUNT],
}

impl Debouncer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            buttons: [ButtonState::default(); ButtonId::COUNT],
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Sample every button once.
    ///
    /// Returns the presses confirmed on this sample, in [`ButtonId`]
    /// declaration order. Several buttons may confirm in the same poll.
    pub fn poll(&mut self, levels: &RawLevels, now: Instant) -> Vec<ButtonEdge> {
        let debounce = self.debounce;
        levels
            .iter()
            .filter(|&(button, level)| self.buttons[button.index()].update(level, now, debounce))
            .map(|(button, _)| ButtonEdge { button, at: now })
            .collect()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
