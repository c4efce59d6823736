//! Button identities, raw levels, and debounced edges.
//!
//! Physical or virtual buttons report raw levels (pressed or not) once per
//! tick through a [`RawButtonSource`]. The [`Debouncer`] turns those into
//! [`ButtonEdge`]s, the only input the alarm state machine consumes.

mod debounce;
pub mod keyboard;
mod virtual_buttons;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use virtual_buttons::VirtualButtons;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tokio::time::Instant;

/// The five logical buttons.
///
/// Identity is stable across targets; which pin or key drives each one is
/// the source's business.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ButtonId {
    /// Enter or leave edit mode.
    ModeToggle,
    /// Step the selected field up while editing.
    Increment,
    /// Step the selected field down while editing.
    Decrement,
    /// Move the edit cursor, or silence a ringing alarm.
    ConfirmOrSilence,
    /// Arm or disarm the alarm.
    AlarmToggle,
}

impl ButtonId {
    const fn index(self) -> usize {
        self as usize
    }
}

/// Raw, pre-debounce levels for every button. `true` means pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawLevels([bool; ButtonId::COUNT]);

impl RawLevels {
    /// All buttons released.
    pub const fn released() -> Self {
        Self([false; ButtonId::COUNT])
    }

    /// Only `button` pressed.
    pub fn only(button: ButtonId) -> Self {
        let mut levels = Self::released();
        levels.set(button, true);
        levels
    }

    pub fn get(&self, button: ButtonId) -> bool {
        self.0[button.index()]
    }

    pub fn set(&mut self, button: ButtonId, pressed: bool) {
        self.0[button.index()] = pressed;
    }

    /// Iterate `(button, pressed)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ButtonId, bool)> + '_ {
        ButtonId::iter().map(|button| (button, self.get(button)))
    }
}

/// A debounced released-to-pressed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    pub button: ButtonId,
    /// When the debouncer confirmed the press.
    pub at: Instant,
}

/// Reports raw button levels once per tick.
///
/// Implementations must not block; they run on the polling loop.
pub trait RawButtonSource: Send {
    fn read_levels(&mut self, now: Instant) -> RawLevels;
}

/// A source with nothing attached. Every button reads released.
#[derive(Debug, Default)]
pub struct NoButtons;

impl RawButtonSource for NoButtons {
    fn read_levels(&mut self, _now: Instant) -> RawLevels {
        RawLevels::released()
    }
}
