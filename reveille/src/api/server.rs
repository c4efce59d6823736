use std::io;
use std::sync::Arc;

use axum::{Json, Router, routing::get};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use super::v0;
use crate::controller::ControlCommand;
use crate::display::StatusSnapshot;
use crate::input::ButtonId;
use crate::tracing::prelude::*;

#[derive(OpenApi)]
#[openapi(info(
    title = "reveille",
    description = "Alarm clock status and remote buttons"
))]
struct ApiDoc;

/// Handles the API handlers share. Cheap to clone.
#[derive(Clone)]
pub struct SharedState {
    pub status_rx: watch::Receiver<StatusSnapshot>,
    pub press_tx: mpsc::Sender<ButtonId>,
    pub command_tx: mpsc::Sender<ControlCommand>,
}

impl SharedState {
    pub fn status(&self) -> StatusSnapshot {
        self.status_rx.borrow().clone()
    }
}

/// Build the full application router.
pub fn router(state: SharedState) -> Router {
    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v0", v0::routes())
        .split_for_parts();

    let openapi = Arc::new(openapi);
    router
        .route(
            "/api/openapi.json",
            get(move || {
                let openapi = openapi.clone();
                async move { Json(openapi.as_ref().clone()) }
            }),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `listener` until `cancellation` fires.
pub async fn serve(
    listener: TcpListener,
    state: SharedState,
    cancellation: CancellationToken,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "API listening");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancellation.cancelled().await })
        .await?;

    debug!("API server stopped");
    Ok(())
}
