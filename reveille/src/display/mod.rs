//! What the display shows, and the renderers that show it.

mod snapshot;

pub use snapshot::StatusSnapshot;

use std::io::{self, Write};

use crate::tracing::prelude::*;

/// Draws a snapshot once per tick.
///
/// Rendering problems stay inside the renderer; nothing here can stop
/// the polling loop.
pub trait Renderer: Send {
    fn render(&mut self, snapshot: &StatusSnapshot);

    /// Blank the display on shutdown.
    fn clear(&mut self) {}
}

/// Renderer for running headless.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _snapshot: &StatusSnapshot) {}
}

/// Text-mode display: one line per change.
///
/// The clock ticks ten times a second but the picture only changes once a
/// second at most, so unchanged snapshots are skipped.
pub struct ConsoleRenderer<W: Write + Send = io::Stdout> {
    out: W,
    last: Option<StatusSnapshot>,
}

impl ConsoleRenderer {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, snapshot: &StatusSnapshot) {
        if self.last.as_ref() == Some(snapshot) {
            return;
        }

        if let Err(e) = writeln!(self.out, "{snapshot}").and_then(|_| self.out.flush()) {
            debug!("Console render failed: {e}");
        }
        self.last = Some(snapshot.clone());
    }

    fn clear(&mut self) {
        if let Err(e) = writeln!(self.out).and_then(|_| self.out.flush()) {
            debug!("Console clear failed: {e}");
        }
        self.last = None;
    }
}
