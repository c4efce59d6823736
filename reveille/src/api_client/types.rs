//! API data transfer objects.
//!
//! These types define the API contract shared between the server and
//! clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Everything the clock face shows, as of the last tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct AlarmStatus {
    /// Wall-clock time, `HH:MM:SS`.
    pub time: String,
    /// Configured alarm time, `HH:MM`.
    pub alarm: String,
    pub alarm_enabled: bool,
    /// `hour` or `minute` while the alarm time is being edited.
    pub editing: Option<String>,
    pub ringing: bool,
    /// Whether the audio output is reachable.
    pub notifier_connected: bool,
    /// One-line rendering of the display.
    pub display: String,
}
