//! Small value types shared across the crate.

mod alarm_time;
mod wall_time;

pub use alarm_time::AlarmTime;
pub use wall_time::WallTime;
