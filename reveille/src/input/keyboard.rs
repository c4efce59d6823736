//! Keyboard input for running without hardware.
//!
//! Lines typed on stdin are turned into virtual presses, one per
//! recognised character, so `+++` steps the selected field three times.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::ButtonId;
use crate::tracing::prelude::*;

/// Key legend shown at startup.
pub const KEY_HELP: &str =
    "keys: m=mode  +/u=up  -/d=down  s=set/silence  a=alarm on/off  (then Enter)";

/// Map one key to a button.
pub fn button_for_key(key: char) -> Option<ButtonId> {
    match key.to_ascii_lowercase() {
        'm' => Some(ButtonId::ModeToggle),
        '+' | 'u' => Some(ButtonId::Increment),
        '-' | 'd' => Some(ButtonId::Decrement),
        's' => Some(ButtonId::ConfirmOrSilence),
        'a' => Some(ButtonId::AlarmToggle),
        _ => None,
    }
}

/// Map a typed line to presses, skipping unknown characters.
pub fn buttons_for_line(line: &str) -> Vec<ButtonId> {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| {
            let button = button_for_key(c);
            if button.is_none() {
                debug!(key = %c, "Ignoring unmapped key");
            }
            button
        })
        .collect()
}

/// Read stdin until EOF or cancellation, forwarding presses.
pub fn spawn_stdin_reader(
    press_tx: mpsc::Sender<ButtonId>,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let line = tokio::select! {
                _ = cancellation.cancelled() => break,
                line = lines.next_line() => line,
            };

            match line {
                Ok(Some(line)) => {
                    for button in buttons_for_line(&line) {
                        if press_tx.send(button).await.is_err() {
                            debug!("Press channel closed, stopping keyboard reader");
                            return;
                        }
                    }
                }
                Ok(None) => {
                    debug!("stdin closed, keyboard input disabled");
                    break;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    break;
                }
            }
        }
    })
}
