//! Alarm configuration, edit mode, and the trigger state machine, owned
//! together by [`AlarmClock`].

mod settings;
mod trigger;

pub use settings::{AlarmConfig, AlarmSettings, EditCursor};
pub use trigger::{
    AlarmState, AlarmTrigger, SUPPRESSION_INTERVAL, TRIGGER_WINDOW_SECS, TriggerGuard,
    TriggerStatus,
};

use tokio::time::Instant;

use crate::display::StatusSnapshot;
use crate::input::{ButtonEdge, ButtonId};
use crate::tracing::prelude::*;
use crate::types::WallTime;

/// The single owner of all alarm state.
///
/// Every mutation goes through `&mut self` on the polling loop; nothing
/// else holds a reference, so no locking is needed.
#[derive(Debug, Default)]
pub struct AlarmClock {
    settings: AlarmSettings,
    trigger: AlarmTrigger,
}

impl AlarmClock {
    pub fn new(config: AlarmConfig) -> Self {
        Self {
            settings: AlarmSettings::new(config),
            trigger: AlarmTrigger::new(),
        }
    }

    pub fn config(&self) -> AlarmConfig {
        self.settings.config()
    }

    pub fn edit_cursor(&self) -> Option<EditCursor> {
        self.settings.edit_cursor()
    }

    pub fn state(&self) -> AlarmState {
        self.trigger.state()
    }

    /// Apply one debounced press.
    pub fn handle_edge(&mut self, edge: ButtonEdge) {
        debug!(button = %edge.button, "Button pressed");

        match edge.button {
            ButtonId::ModeToggle => {
                self.settings.toggle_edit_mode();
                match self.settings.edit_cursor() {
                    Some(_) => info!(alarm = %self.config().time, "Editing alarm time"),
                    None => info!(alarm = %self.config().time, "Alarm time set"),
                }
            }
            ButtonId::Increment => self.settings.increment(),
            ButtonId::Decrement => self.settings.decrement(),
            ButtonId::ConfirmOrSilence => self.dismiss_or_confirm(),
            ButtonId::AlarmToggle => {
                self.settings.toggle_enabled();
                info!(enabled = self.config().enabled, "Alarm toggled");
            }
        }
    }

    /// While editing, move the cursor. Otherwise silence a ringing alarm.
    fn dismiss_or_confirm(&mut self) {
        if self.settings.is_editing() {
            self.settings.advance_cursor();
        } else {
            self.dismiss();
        }
    }

    /// Silence the alarm from outside the button path (API, auto-dismiss).
    /// Returns false if it wasn't ringing.
    pub fn dismiss(&mut self) -> bool {
        let silenced = self.trigger.silence();
        if silenced {
            info!("Alarm silenced");
        }
        silenced
    }

    /// Run the trigger state machine for this tick.
    pub fn check_trigger(&mut self, wall: WallTime, now: Instant) -> TriggerStatus {
        let config = self.settings.config();
        let status = self.trigger.check(&config, wall, now);
        match status {
            TriggerStatus::Triggered => {
                info!(alarm = %config.time, time = %wall, "Alarm triggered");
            }
            TriggerStatus::Suppressed => {
                trace!(time = %wall, "Alarm condition suppressed");
            }
            TriggerStatus::Idle | TriggerStatus::Ringing => {}
        }
        status
    }

    /// Display-ready view of the current state.
    pub fn snapshot(&self, wall: WallTime, notifier_connected: bool) -> StatusSnapshot {
        StatusSnapshot::new(
            wall,
            self.settings.config(),
            self.settings.edit_cursor(),
            self.trigger.state(),
            notifier_connected,
        )
    }
}
