//! The alarm clock daemon.
//!
//! Runs the polling loop, the notification worker, the HTTP API, and a
//! keyboard reader on stdin until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use reveille::api::{self, SharedState};
use reveille::clock::SystemClock;
use reveille::config::ClockConfig;
use reveille::controller::{Controller, ControllerParts};
use reveille::dispatch::{
    CommandNotifier, ContentProvider, Dispatcher, GreetingProvider, HttpTextProvider,
    LogNotifier, Notifier,
};
use reveille::display::ConsoleRenderer;
use reveille::input::{VirtualButtons, keyboard};
use reveille::tracing::init_journald_or_stdout;
use reveille::tracing::prelude::*;

fn main() -> Result<()> {
    init_journald_or_stdout();

    // The local offset can only be read safely while single-threaded.
    let clock = SystemClock::detect();

    let config = ClockConfig::from_env().context("invalid configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(config, clock));

    // A blocking stdin read can't be interrupted; don't wait on it.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

fn content_provider(config: &ClockConfig) -> Result<Arc<dyn ContentProvider>> {
    match &config.message_url {
        Some(url) => {
            let provider = HttpTextProvider::new(url.as_str())?;
            info!(url = provider.url(), "Fetching wake-up messages over HTTP");
            Ok(Arc::new(provider))
        }
        None => Ok(Arc::new(GreetingProvider::new())),
    }
}

fn notifier(config: &ClockConfig) -> Arc<dyn Notifier> {
    match config
        .speak_command
        .as_deref()
        .and_then(CommandNotifier::from_command_line)
    {
        Some(command) => Arc::new(command),
        None => {
            if config.speak_command.is_some() {
                warn!("Speak command is empty, messages will only be logged");
            }
            Arc::new(LogNotifier)
        }
    }
}

async fn run(config: ClockConfig, clock: SystemClock) -> Result<()> {
    let cancellation = CancellationToken::new();

    let notifier = notifier(&config);
    let dispatcher = Dispatcher::spawn(
        content_provider(&config)?,
        notifier.clone(),
        config.dispatch_timeout,
    );

    let (buttons, press_tx) = VirtualButtons::new(config.button_hold);

    let (mut controller, status_rx) = Controller::new(ControllerParts {
        clock: Box::new(clock),
        buttons: Box::new(buttons),
        renderer: Box::new(ConsoleRenderer::stdout()),
        notifier,
        dispatcher,
        alarm: config.alarm,
        debounce: config.debounce,
        tick: config.tick,
        auto_dismiss: config.auto_dismiss,
    });
    let command_tx = controller.command_channel();

    let listener = TcpListener::bind(config.api_addr)
        .await
        .with_context(|| format!("failed to bind API to {}", config.api_addr))?;
    let api_task = tokio::spawn(api::serve(
        listener,
        SharedState {
            status_rx,
            press_tx: press_tx.clone(),
            command_tx,
        },
        cancellation.clone(),
    ));

    let keyboard_task = keyboard::spawn_stdin_reader(press_tx, cancellation.clone());
    info!("{}", keyboard::KEY_HELP);

    let controller_task = tokio::spawn(controller.run(cancellation.clone()));

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupted, shutting down"),
        Err(e) => error!("Failed to listen for shutdown signal: {e}"),
    }
    cancellation.cancel();

    if let Err(e) = controller_task.await {
        error!("Controller task failed: {e}");
    }
    match api_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("API server failed: {e}"),
        Err(e) => error!("API task failed: {e}"),
    }
    keyboard_task.abort();

    Ok(())
}
