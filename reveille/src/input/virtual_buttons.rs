use std::time::Duration;

use strum::{EnumCount, IntoEnumIterator};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{ButtonId, RawButtonSource, RawLevels};
use crate::tracing::prelude::*;

/// Capacity of the press request channel.
const PRESS_QUEUE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
enum Phase {
    #[default]
    Idle,
    Pressed {
        until: Instant,
    },
    Releasing {
        until: Instant,
    },
}

/// Buttons driven by discrete press requests instead of pins.
///
/// Each request on the channel becomes a raw level held high for `hold`,
/// followed by a release of the same length, so presses go through the
/// same [`Debouncer`](super::Debouncer) as physical buttons. Repeated
/// requests for one button are queued rather than merged, so five quick
/// "increment" requests step the alarm five times.
///
/// `hold` must outlast the debounce window as seen through the polling
/// interval, or presses will be filtered out as bounce.
#[derive(Debug)]
pub struct VirtualButtons {
    press_rx: mpsc::Receiver<ButtonId>,
    hold: Duration,
    queued: [u32; ButtonId::COUNT],
    phases: [Phase; ButtonId::COUNT],
}

impl VirtualButtons {
    /// Create the source and the sender used to request presses.
    pub fn new(hold: Duration) -> (Self, mpsc::Sender<ButtonId>) {
        let (press_tx, press_rx) = mpsc::channel(PRESS_QUEUE_DEPTH);
        let source = Self {
            press_rx,
            hold,
            queued: [0; ButtonId::COUNT],
            phases: [Phase::Idle; ButtonId::COUNT],
        };
        (source, press_tx)
    }

    fn drain_requests(&mut self) {
        while let Ok(button) = self.press_rx.try_recv() {
            trace!(%button, "Virtual press queued");
            self.queued[button.index()] += 1;
        }
    }

    fn advance(&mut self, button: ButtonId, now: Instant) -> bool {
        let i = button.index();
        let phase = match self.phases[i] {
            Phase::Pressed { until } if now >= until => Phase::Releasing {
                until: now + self.hold,
            },
            Phase::Releasing { until } if now >= until => Phase::Idle,
            phase => phase,
        };

        let phase = match phase {
            Phase::Idle if self.queued[i] > 0 => {
                self.queued[i] -= 1;
                Phase::Pressed {
                    until: now + self.hold,
                }
            }
            phase => phase,
        };

        self.phases[i] = phase;
        matches!(phase, Phase::Pressed { .. })
    }
}

impl RawButtonSource for VirtualButtons {
    fn read_levels(&mut self, now: Instant) -> RawLevels {
        self.drain_requests();

        let mut levels = RawLevels::released();
        for button in ButtonId::iter() {
            levels.set(button, self.advance(button, now));
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Debouncer;

    const HOLD: Duration = Duration::from_millis(120);
    const TICK: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn press_holds_then_releases() {
        let (mut buttons, tx) = VirtualButtons::new(HOLD);
        let start = Instant::now();

        tx.send(ButtonId::Increment).await.unwrap();

        assert!(buttons.read_levels(start).get(ButtonId::Increment));
        assert!(buttons.read_levels(start + TICK).get(ButtonId::Increment));
        assert!(!buttons.read_levels(start + TICK * 2).get(ButtonId::Increment));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_requests_are_not_merged() {
        let (mut buttons, tx) = VirtualButtons::new(HOLD);
        let mut debouncer = Debouncer::default();
        let start = Instant::now();

        for _ in 0..3 {
            tx.send(ButtonId::Increment).await.unwrap();
        }

        let mut edges = 0;
        for i in 0..20 {
            let now = start + TICK * i;
            let levels = buttons.read_levels(now);
            edges += debouncer.poll(&levels, now).len();
        }

        assert_eq!(edges, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn different_buttons_press_concurrently() {
        let (mut buttons, tx) = VirtualButtons::new(HOLD);
        let start = Instant::now();

        tx.send(ButtonId::ModeToggle).await.unwrap();
        tx.send(ButtonId::AlarmToggle).await.unwrap();

        let levels = buttons.read_levels(start);
        assert!(levels.get(ButtonId::ModeToggle));
        assert!(levels.get(ButtonId::AlarmToggle));
        assert!(!levels.get(ButtonId::Increment));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_source_reads_released() {
        let (mut buttons, _tx) = VirtualButtons::new(HOLD);
        assert_eq!(buttons.read_levels(Instant::now()), RawLevels::released());
    }
}
