//! The polling loop.
//!
//! One [`Controller`] owns the alarm state and every collaborator. Each
//! tick runs synchronously and never blocks:
//!
//! ```text
//! clock ─► buttons ─► debouncer ─► AlarmClock::handle_edge
//!                                          │
//!      dispatch outcomes ─► (auto-dismiss) │
//!                                          ▼
//!                              AlarmClock::check_trigger ─► Dispatcher
//!                                          │
//!                                          ▼
//!                                 snapshot ─► renderer, watch channel
//! ```
//!
//! The only concurrent work is the dispatch worker, which talks back
//! through the dispatcher's outcome channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::alarm::{AlarmClock, AlarmConfig, AlarmState, TriggerStatus};
use crate::clock::Clock;
use crate::dispatch::{DispatchOutcome, DispatchRequest, Dispatcher, Notifier};
use crate::display::{Renderer, StatusSnapshot};
use crate::input::{Debouncer, RawButtonSource};
use crate::tracing::prelude::*;
use crate::types::WallTime;

/// Requests from outside the polling loop (the API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Silence a ringing alarm, as if the set button were pressed.
    Dismiss,
}

pub struct Controller {
    clock: Box<dyn Clock>,
    buttons: Box<dyn RawButtonSource>,
    renderer: Box<dyn Renderer>,
    notifier: Arc<dyn Notifier>,
    debouncer: Debouncer,
    alarm: AlarmClock,
    dispatcher: Dispatcher,
    tick_duration: Duration,
    auto_dismiss: bool,
    command_rx: Option<mpsc::Receiver<ControlCommand>>,
    status_tx: watch::Sender<StatusSnapshot>,
}

/// Everything a [`Controller`] is built from.
pub struct ControllerParts {
    pub clock: Box<dyn Clock>,
    pub buttons: Box<dyn RawButtonSource>,
    pub renderer: Box<dyn Renderer>,
    pub notifier: Arc<dyn Notifier>,
    pub dispatcher: Dispatcher,
    pub alarm: AlarmConfig,
    pub debounce: Duration,
    pub tick: Duration,
    pub auto_dismiss: bool,
}

impl Controller {
    /// Build a controller and the watch receiver that sees every snapshot.
    pub fn new(parts: ControllerParts) -> (Self, watch::Receiver<StatusSnapshot>) {
        let alarm = AlarmClock::new(parts.alarm);
        let initial = alarm.snapshot(parts.clock.now(), parts.notifier.is_connected());
        let (status_tx, status_rx) = watch::channel(initial);

        let controller = Self {
            clock: parts.clock,
            buttons: parts.buttons,
            renderer: parts.renderer,
            notifier: parts.notifier,
            debouncer: Debouncer::new(parts.debounce),
            alarm,
            dispatcher: parts.dispatcher,
            tick_duration: parts.tick,
            auto_dismiss: parts.auto_dismiss,
            command_rx: None,
            status_tx,
        };
        (controller, status_rx)
    }

    /// Accept [`ControlCommand`]s on the returned sender.
    pub fn command_channel(&mut self) -> mpsc::Sender<ControlCommand> {
        let (tx, rx) = mpsc::channel(8);
        self.command_rx = Some(rx);
        tx
    }

    pub fn alarm(&self) -> &AlarmClock {
        &self.alarm
    }

    /// Tick until cancelled, then shut down the collaborators.
    pub async fn run(mut self, cancellation: CancellationToken) {
        info!(
            alarm = %self.alarm.config().time,
            enabled = self.alarm.config().enabled,
            tick_ms = self.tick_duration.as_millis() as u64,
            "Alarm clock running"
        );

        let mut interval = tokio::time::interval(self.tick_duration);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    break;
                }
                _ = interval.tick() => {
                    self.tick(Instant::now());
                }
            }
        }

        self.shutdown().await;
    }

    /// One pass of the loop.
    pub fn tick(&mut self, now: Instant) {
        let wall = self.clock.now();

        let levels = self.buttons.read_levels(now);
        for edge in self.debouncer.poll(&levels, now) {
            self.alarm.handle_edge(edge);
        }

        self.drain_commands();
        while let Some(outcome) = self.dispatcher.poll_outcome() {
            self.handle_outcome(outcome);
        }

        if self.alarm.check_trigger(wall, now) == TriggerStatus::Triggered {
            self.start_dispatch(wall);
        }

        let snapshot = self.alarm.snapshot(wall, self.notifier.is_connected());
        self.renderer.render(&snapshot);
        self.status_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn drain_commands(&mut self) {
        let Some(rx) = self.command_rx.as_mut() else {
            return;
        };
        while let Ok(command) = rx.try_recv() {
            match command {
                ControlCommand::Dismiss => {
                    if !self.alarm.dismiss() {
                        debug!("Dismiss requested but alarm is not ringing");
                    }
                }
            }
        }
    }

    fn start_dispatch(&mut self, wall: WallTime) {
        let request = DispatchRequest {
            alarm: self.alarm.config().time,
            fired_at: wall,
        };
        let status = self.dispatcher.dispatch(request);
        debug!(?status, "Notification dispatch requested");
    }

    fn handle_outcome(&mut self, outcome: DispatchOutcome) {
        if let Err(e) = &outcome.result {
            warn!(
                alarm = %outcome.request.alarm,
                "Alarm is ringing without sound: {e}"
            );
        }

        if self.auto_dismiss && self.alarm.state() == AlarmState::Ringing {
            info!("Dispatch finished, auto-dismissing");
            self.alarm.dismiss();
        }
    }

    async fn shutdown(mut self) {
        info!("Alarm clock shutting down");
        self.dispatcher.shutdown().await;
        self.notifier.shutdown().await;
        self.renderer.clear();
        trace!("Alarm clock stopped.");
    }
}
