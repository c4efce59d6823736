use serde::{Deserialize, Serialize};

use crate::types::AlarmTime;

/// Which field the increment/decrement buttons act on while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditCursor {
    Hour,
    Minute,
}

impl EditCursor {
    fn next(self) -> Self {
        match self {
            EditCursor::Hour => EditCursor::Minute,
            EditCursor::Minute => EditCursor::Hour,
        }
    }
}

/// When the alarm goes off and whether it is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    pub time: AlarmTime,
    pub enabled: bool,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            time: AlarmTime::DEFAULT,
            enabled: true,
        }
    }
}

/// The alarm configuration plus the edit-mode cursor that mutates it.
///
/// Edit mode and cursor are a single `Option`: there is no cursor outside
/// edit mode. Every operation is total; steps wrap.
#[derive(Debug, Clone, Default)]
pub struct AlarmSettings {
    config: AlarmConfig,
    edit: Option<EditCursor>,
}

impl AlarmSettings {
    pub fn new(config: AlarmConfig) -> Self {
        Self { config, edit: None }
    }

    pub fn config(&self) -> AlarmConfig {
        self.config
    }

    /// The cursor, or `None` when not editing.
    pub fn edit_cursor(&self) -> Option<EditCursor> {
        self.edit
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Enter or leave edit mode. Entering always starts on the hour.
    pub fn toggle_edit_mode(&mut self) {
        self.edit = match self.edit {
            Some(_) => None,
            None => Some(EditCursor::Hour),
        };
    }

    /// Hour -> Minute -> Hour. No-op outside edit mode.
    pub fn advance_cursor(&mut self) {
        if let Some(cursor) = self.edit {
            self.edit = Some(cursor.next());
        }
    }

    /// Step the selected field up. No-op outside edit mode.
    pub fn increment(&mut self) {
        self.config.time = match self.edit {
            Some(EditCursor::Hour) => self.config.time.next_hour(),
            Some(EditCursor::Minute) => self.config.time.next_minute(),
            None => return,
        };
    }

    /// Step the selected field down. No-op outside edit mode.
    pub fn decrement(&mut self) {
        self.config.time = match self.edit {
            Some(EditCursor::Hour) => self.config.time.previous_hour(),
            Some(EditCursor::Minute) => self.config.time.previous_minute(),
            None => return,
        };
    }

    /// Arm or disarm. Works in and out of edit mode.
    pub fn toggle_enabled(&mut self) {
        self.config.enabled = !self.config.enabled;
    }
}
