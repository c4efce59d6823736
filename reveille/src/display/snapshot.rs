use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmConfig, AlarmState, EditCursor};
use crate::types::WallTime;

/// Immutable, display-ready view of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Wall-clock time at this tick.
    pub time: WallTime,
    pub alarm: AlarmConfig,
    /// Field being edited, or `None` outside edit mode.
    pub editing: Option<EditCursor>,
    pub state: AlarmState,
    /// Whether the notifier (speaker, buzzer) is reachable.
    pub notifier_connected: bool,
}

impl StatusSnapshot {
    pub fn new(
        time: WallTime,
        alarm: AlarmConfig,
        editing: Option<EditCursor>,
        state: AlarmState,
        notifier_connected: bool,
    ) -> Self {
        Self {
            time,
            alarm,
            editing,
            state,
            notifier_connected,
        }
    }

    pub fn is_ringing(&self) -> bool {
        self.state == AlarmState::Ringing
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::new(
            WallTime::default(),
            AlarmConfig::default(),
            None,
            AlarmState::Idle,
            false,
        )
    }
}

/// Single-line rendering of the same fields the hardware display draws.
impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  Alarm: {} {}",
            self.time,
            self.alarm.time,
            if self.alarm.enabled { "ON" } else { "OFF" }
        )?;

        match self.editing {
            Some(EditCursor::Hour) => write!(f, "  SET HOUR")?,
            Some(EditCursor::Minute) => write!(f, "  SET MINUTE")?,
            None => {}
        }

        write!(
            f,
            "  BT: {}",
            if self.notifier_connected {
                "Connected"
            } else {
                "Disconnected"
            }
        )?;

        if self.is_ringing() {
            write!(f, "  ALARM!")?;
        }
        Ok(())
    }
}
