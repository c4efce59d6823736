//! Reveille: an alarm clock built around a polled state machine.
//!
//! The core tracks wall-clock time, the alarm configuration, edit-mode
//! navigation, debounced button edges, and the trigger/silence lifecycle
//! of the alarm. Everything slow (fetching the wake-up message, speaking
//! it) runs on a background dispatch worker. Displays, buttons, and audio
//! sinks plug in through small capability traits.

pub mod alarm;
pub mod api;
pub mod api_client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod input;
pub mod tracing;
pub mod types;
