//! HTTP API for observing and driving the clock.
//!
//! Mounted under `/api/v0`. Handlers never touch alarm state directly:
//! they read the latest [`StatusSnapshot`](crate::display::StatusSnapshot)
//! from a watch channel and send presses or commands to the polling loop.

mod server;
mod v0;

pub use server::{SharedState, router, serve};
