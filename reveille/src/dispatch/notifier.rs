//! Ways of announcing the alarm.

use std::env;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::process::Command;

use super::{DispatchError, Notifier};
use crate::tracing::prelude::*;

/// Logs the message instead of playing it. Always connected.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, text: &str) -> Result<(), DispatchError> {
        info!("Would speak: {text}");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Speaks through an external text-to-speech command, with the message
/// appended as the last argument (e.g. `espeak -s 140`).
///
/// Reports connected while the program is found on `PATH` and the last
/// delivery didn't fail. The child is killed if the dispatch times out.
#[derive(Debug)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
    available: bool,
    last_ok: AtomicBool,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        let available = program_exists(&program);
        if !available {
            warn!(%program, "Speech command not found, alarm will be silent");
        }
        Self {
            program,
            args,
            available,
            last_ok: AtomicBool::new(true),
        }
    }

    /// Split a whitespace-separated command line. `None` if blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self::new(program, words.collect()))
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn deliver(&self, text: &str) -> Result<(), DispatchError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;

        let result = match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(DispatchError::DeliveryFailed(format!(
                "{} exited with {status}",
                self.program
            ))),
            Err(e) => Err(DispatchError::DeliveryFailed(format!(
                "could not run {}: {e}",
                self.program
            ))),
        };

        self.last_ok.store(result.is_ok(), Ordering::Relaxed);
        result
    }

    fn is_connected(&self) -> bool {
        self.available && self.last_ok.load(Ordering::Relaxed)
    }
}

/// Resolve like a shell would: paths are checked directly, bare names
/// against `PATH`.
fn program_exists(program: &str) -> bool {
    if program.contains('/') {
        return Path::new(program).is_file();
    }
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
