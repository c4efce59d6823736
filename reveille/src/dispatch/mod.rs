//! Background notification dispatch.
//!
//! When the alarm fires, the polling loop hands a [`DispatchRequest`] to
//! the [`Dispatcher`] and moves on. A worker task fetches the message from
//! the [`ContentProvider`] and hands it to the [`Notifier`]; both may be
//! slow or fail. The result comes back as a [`DispatchOutcome`] the loop
//! picks up with [`Dispatcher::poll_outcome`]. Nothing in the worker
//! touches alarm state.
//!
//! At most one dispatch is in flight. A second request while one is
//! running is dropped. Every attempt is bounded by a timeout.

mod content;
mod notifier;

pub use content::{GREETINGS, GreetingProvider, HttpTextProvider};
pub use notifier::{CommandNotifier, LogNotifier};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::tracing::prelude::*;
use crate::types::{AlarmTime, WallTime};

/// Default bound on one fetch-and-deliver attempt.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How long shutdown waits for the worker before aborting it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Errors from the content/notifier path. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Dispatch timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Dispatch worker is not running")]
    WorkerGone,
}

/// Supplies the text to announce. Called only from the dispatch worker.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch_message(&self) -> Result<String, DispatchError>;
}

/// Announces text: speech, tone, or a log line.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), DispatchError>;

    /// Whether the output device is reachable. Read once per tick by the
    /// polling loop, so it must be cheap and must not block.
    fn is_connected(&self) -> bool;

    /// Release the device. Called once at shutdown.
    async fn shutdown(&self) {}
}

/// What the worker is asked to announce. A copy of the state at trigger
/// time; the worker never sees the live alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRequest {
    pub alarm: AlarmTime,
    pub fired_at: WallTime,
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub request: DispatchRequest,
    pub result: Result<(), DispatchError>,
}

/// Result of [`Dispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Queued,
    /// Another dispatch is still running; this one was dropped.
    Busy,
    /// The worker has exited; nothing will be announced.
    WorkerGone,
}

/// Handle held by the polling loop. Every method is non-blocking except
/// [`shutdown`](Self::shutdown).
pub struct Dispatcher {
    request_tx: mpsc::Sender<DispatchRequest>,
    outcome_rx: mpsc::Receiver<DispatchOutcome>,
    in_flight: Option<DispatchRequest>,
    worker: JoinHandle<()>,
    cancellation: CancellationToken,
}

impl Dispatcher {
    /// Start the worker task.
    pub fn spawn(
        provider: Arc<dyn ContentProvider>,
        notifier: Arc<dyn Notifier>,
        timeout: Duration,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::channel(1);
        let (outcome_tx, outcome_rx) = mpsc::channel(1);
        let cancellation = CancellationToken::new();

        let worker = tokio::spawn(run_worker(
            request_rx,
            outcome_tx,
            provider,
            notifier,
            timeout,
            cancellation.clone(),
        ));

        Self {
            request_tx,
            outcome_rx,
            in_flight: None,
            worker,
            cancellation,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Queue a request without waiting.
    pub fn dispatch(&mut self, request: DispatchRequest) -> DispatchStatus {
        if let Some(running) = self.in_flight {
            warn!(
                running = %running.fired_at,
                "Dispatch already in flight, dropping new request"
            );
            return DispatchStatus::Busy;
        }

        match self.request_tx.try_send(request) {
            Ok(()) => {
                debug!(alarm = %request.alarm, "Dispatch queued");
                self.in_flight = Some(request);
                DispatchStatus::Queued
            }
            Err(TrySendError::Full(_)) => {
                warn!("Dispatch queue full, dropping request");
                DispatchStatus::Busy
            }
            Err(TrySendError::Closed(_)) => {
                error!("Dispatch worker is gone, alarm will be silent");
                DispatchStatus::WorkerGone
            }
        }
    }

    /// Collect a finished dispatch, if any.
    ///
    /// If the worker died with a request in flight, that request is
    /// reported once as failed with [`DispatchError::WorkerGone`].
    pub fn poll_outcome(&mut self) -> Option<DispatchOutcome> {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => {
                self.in_flight = None;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.in_flight.take().map(|request| DispatchOutcome {
                    request,
                    result: Err(DispatchError::WorkerGone),
                })
            }
        }
    }

    /// Stop the worker, abandoning any dispatch in progress.
    pub async fn shutdown(self) {
        self.cancellation.cancel();

        let mut worker = self.worker;
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut worker).await {
            Ok(Ok(())) => debug!("Dispatch worker stopped"),
            Ok(Err(e)) => warn!("Dispatch worker ended abnormally: {e}"),
            Err(_) => {
                warn!("Dispatch worker did not stop in time, aborting");
                worker.abort();
            }
        }
    }
}

async fn run_worker(
    mut request_rx: mpsc::Receiver<DispatchRequest>,
    outcome_tx: mpsc::Sender<DispatchOutcome>,
    provider: Arc<dyn ContentProvider>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    cancellation: CancellationToken,
) {
    trace!("Dispatch worker started.");

    loop {
        let request = tokio::select! {
            _ = cancellation.cancelled() => break,
            request = request_rx.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let result = tokio::select! {
            _ = cancellation.cancelled() => break,
            result = attempt(provider.as_ref(), notifier.as_ref(), timeout) => result,
        };

        match &result {
            Ok(()) => info!(alarm = %request.alarm, "Wake-up message delivered"),
            Err(e) => warn!(alarm = %request.alarm, "Alarm notification failed: {e}"),
        }

        if outcome_tx
            .send(DispatchOutcome { request, result })
            .await
            .is_err()
        {
            debug!("Dispatch outcome channel closed");
            break;
        }
    }

    trace!("Dispatch worker stopped.");
}

/// One best-effort fetch and delivery, bounded by `limit`. No retries.
async fn attempt(
    provider: &dyn ContentProvider,
    notifier: &dyn Notifier,
    limit: Duration,
) -> Result<(), DispatchError> {
    let work = async {
        let text = provider.fetch_message().await?;
        info!("ALARM! Message: {text}");
        notifier.deliver(&text).await
    };

    tokio::time::timeout(limit, work)
        .await
        .map_err(|_| DispatchError::TimedOut(limit))?
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake collaborators shared by dispatch and controller tests.

    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub struct FixedProvider(pub &'static str);

    #[async_trait]
    impl ContentProvider for FixedProvider {
        async fn fetch_message(&self) -> Result<String, DispatchError> {
            Ok(self.0.to_string())
        }
    }

    pub struct UnreachableProvider;

    #[async_trait]
    impl ContentProvider for UnreachableProvider {
        async fn fetch_message(&self) -> Result<String, DispatchError> {
            Err(DispatchError::ContentUnavailable(
                "connection refused".into(),
            ))
        }
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub delivered: Mutex<Vec<String>>,
        pub shut_down: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn messages(&self) -> Vec<String> {
            self.delivered.lock().clone()
        }

        pub fn was_shut_down(&self) -> bool {
            self.shut_down.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, text: &str) -> Result<(), DispatchError> {
            self.delivered.lock().push(text.to_string());
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn shutdown(&self) {
            self.shut_down.store(true, Ordering::SeqCst);
        }
    }

    /// A notifier whose device never answers.
    pub struct HangingNotifier;

    #[async_trait]
    impl Notifier for HangingNotifier {
        async fn deliver(&self, _text: &str) -> Result<(), DispatchError> {
            std::future::pending().await
        }

        fn is_connected(&self) -> bool {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn request() -> DispatchRequest {
        DispatchRequest {
            alarm: AlarmTime::DEFAULT,
            fired_at: WallTime::new(7, 30, 0),
        }
    }

    async fn next_outcome(dispatcher: &mut Dispatcher) -> DispatchOutcome {
        loop {
            if let Some(outcome) = dispatcher.poll_outcome() {
                return outcome;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_fetched_message() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut dispatcher = Dispatcher::spawn(
            Arc::new(FixedProvider("Rise and shine!")),
            notifier.clone(),
            DEFAULT_DISPATCH_TIMEOUT,
        );

        assert_eq!(dispatcher.dispatch(request()), DispatchStatus::Queued);
        assert!(dispatcher.is_busy());

        let outcome = next_outcome(&mut dispatcher).await;
        assert_eq!(outcome.request, request());
        assert_eq!(outcome.result, Ok(()));
        assert!(!dispatcher.is_busy());
        assert_eq!(notifier.messages(), vec!["Rise and shine!".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_becomes_outcome() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut dispatcher = Dispatcher::spawn(
            Arc::new(UnreachableProvider),
            notifier.clone(),
            DEFAULT_DISPATCH_TIMEOUT,
        );

        dispatcher.dispatch(request());
        let outcome = next_outcome(&mut dispatcher).await;

        assert!(matches!(
            outcome.result,
            Err(DispatchError::ContentUnavailable(_))
        ));
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_notifier_times_out() {
        let timeout = Duration::from_secs(3);
        let mut dispatcher =
            Dispatcher::spawn(Arc::new(FixedProvider("hello")), Arc::new(HangingNotifier), timeout);

        dispatcher.dispatch(request());
        let outcome = next_outcome(&mut dispatcher).await;

        assert_eq!(outcome.result, Err(DispatchError::TimedOut(timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_while_busy_is_dropped() {
        let mut dispatcher = Dispatcher::spawn(
            Arc::new(FixedProvider("hello")),
            Arc::new(HangingNotifier),
            Duration::from_secs(3),
        );

        assert_eq!(dispatcher.dispatch(request()), DispatchStatus::Queued);
        assert_eq!(dispatcher.dispatch(request()), DispatchStatus::Busy);

        next_outcome(&mut dispatcher).await;
        assert_eq!(dispatcher.dispatch(request()), DispatchStatus::Queued);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_without_dispatch_is_empty() {
        let mut dispatcher = Dispatcher::spawn(
            Arc::new(FixedProvider("hello")),
            Arc::new(RecordingNotifier::default()),
            DEFAULT_DISPATCH_TIMEOUT,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(dispatcher.poll_outcome().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_abandons_hung_dispatch() {
        let mut dispatcher = Dispatcher::spawn(
            Arc::new(FixedProvider("hello")),
            Arc::new(HangingNotifier),
            Duration::from_secs(3600),
        );
        dispatcher.dispatch(request());
        tokio::task::yield_now().await;

        // Returns promptly: the worker observes cancellation mid-attempt.
        tokio::time::timeout(Duration::from_secs(1), dispatcher.shutdown())
            .await
            .expect("shutdown should not wait for the hung notifier");
    }
}
