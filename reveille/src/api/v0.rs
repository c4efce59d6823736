//! API v0 endpoints.
//!
//! Version 0 signals an unstable API; breaking changes are expected.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tokio::sync::mpsc::error::TrySendError;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::server::SharedState;
use crate::alarm::EditCursor;
use crate::api_client::types::AlarmStatus;
use crate::controller::ControlCommand;
use crate::display::StatusSnapshot;
use crate::input::ButtonId;
use crate::tracing::prelude::*;

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(get_status))
        .routes(routes!(press_button))
        .routes(routes!(dismiss_alarm))
}

impl From<&StatusSnapshot> for AlarmStatus {
    fn from(snapshot: &StatusSnapshot) -> Self {
        let editing = snapshot.editing.map(|cursor| match cursor {
            EditCursor::Hour => "hour".to_string(),
            EditCursor::Minute => "minute".to_string(),
        });

        Self {
            time: snapshot.time.to_string(),
            alarm: snapshot.alarm.time.to_string(),
            alarm_enabled: snapshot.alarm.enabled,
            editing,
            ringing: snapshot.is_ringing(),
            notifier_connected: snapshot.notifier_connected,
            display: snapshot.to_string(),
        }
    }
}

fn queue_status<T>(result: Result<(), TrySendError<T>>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::ACCEPTED,
        Err(TrySendError::Full(_)) => StatusCode::TOO_MANY_REQUESTS,
        Err(TrySendError::Closed(_)) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Return the clock's state as of the last tick.
#[utoipa::path(
    get,
    path = "/status",
    tag = "alarm",
    responses(
        (status = OK, description = "Current clock status", body = AlarmStatus),
    ),
)]
async fn get_status(State(state): State<SharedState>) -> Json<AlarmStatus> {
    Json(AlarmStatus::from(&state.status()))
}

/// Queue one press of a button, as if it were pushed on the device.
#[utoipa::path(
    post,
    path = "/buttons/{button}",
    tag = "buttons",
    params(
        ("button" = String, Path, description = "mode-toggle, increment, decrement, confirm-or-silence, or alarm-toggle"),
    ),
    responses(
        (status = ACCEPTED, description = "Press queued"),
        (status = NOT_FOUND, description = "Unknown button"),
        (status = TOO_MANY_REQUESTS, description = "Press queue full"),
        (status = SERVICE_UNAVAILABLE, description = "Clock is not accepting input"),
    ),
)]
async fn press_button(State(state): State<SharedState>, Path(button): Path<String>) -> StatusCode {
    let Ok(button) = button.parse::<ButtonId>() else {
        return StatusCode::NOT_FOUND;
    };

    debug!(%button, "Remote press");
    queue_status(state.press_tx.try_send(button))
}

/// Silence a ringing alarm.
#[utoipa::path(
    post,
    path = "/alarm/dismiss",
    tag = "alarm",
    responses(
        (status = ACCEPTED, description = "Dismiss queued"),
        (status = TOO_MANY_REQUESTS, description = "Command queue full"),
        (status = SERVICE_UNAVAILABLE, description = "Clock is not accepting commands"),
    ),
)]
async fn dismiss_alarm(State(state): State<SharedState>) -> StatusCode {
    queue_status(state.command_tx.try_send(ControlCommand::Dismiss))
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use http::{Method, Request};
    use http_body_util::BodyExt;
    use tokio::sync::{mpsc, watch};
    use tower::ServiceExt;

    use super::*;
    use crate::alarm::{AlarmConfig, AlarmState};
    use crate::api::router;
    use crate::types::WallTime;

    struct Fixture {
        app: Router,
        status_tx: watch::Sender<StatusSnapshot>,
        press_rx: mpsc::Receiver<ButtonId>,
        command_rx: mpsc::Receiver<ControlCommand>,
    }

    fn fixture() -> Fixture {
        let (status_tx, status_rx) = watch::channel(StatusSnapshot::default());
        let (press_tx, press_rx) = mpsc::channel(4);
        let (command_tx, command_rx) = mpsc::channel(4);
        let app = router(SharedState {
            status_rx,
            press_tx,
            command_tx,
        });
        Fixture {
            app,
            status_tx,
            press_rx,
            command_rx,
        }
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let f = fixture();
        let response = f
            .app
            .oneshot(request(Method::GET, "/api/v0/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"OK");
    }

    #[tokio::test]
    async fn status_reflects_latest_snapshot() {
        let f = fixture();
        f.status_tx.send_replace(StatusSnapshot::new(
            WallTime::new(7, 30, 2),
            AlarmConfig::default(),
            Some(EditCursor::Minute),
            AlarmState::Ringing,
            false,
        ));

        let response = f
            .app
            .oneshot(request(Method::GET, "/api/v0/status"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let status: AlarmStatus = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(status.time, "07:30:02");
        assert_eq!(status.alarm, "07:30");
        assert!(status.alarm_enabled);
        assert_eq!(status.editing.as_deref(), Some("minute"));
        assert!(status.ringing);
        assert!(!status.notifier_connected);
        assert!(status.display.contains("ALARM!"));
    }

    #[tokio::test]
    async fn press_queues_button() {
        let mut f = fixture();
        let response = f
            .app
            .oneshot(request(Method::POST, "/api/v0/buttons/confirm-or-silence"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(f.press_rx.try_recv().ok(), Some(ButtonId::ConfirmOrSilence));
    }

    #[tokio::test]
    async fn unknown_button_is_not_found() {
        let mut f = fixture();
        let response = f
            .app
            .oneshot(request(Method::POST, "/api/v0/buttons/snooze"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(f.press_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn press_after_clock_stopped_is_unavailable() {
        let f = fixture();
        drop(f.press_rx);

        let response = f
            .app
            .oneshot(request(Method::POST, "/api/v0/buttons/increment"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn dismiss_sends_command() {
        let mut f = fixture();
        let response = f
            .app
            .oneshot(request(Method::POST, "/api/v0/alarm/dismiss"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(f.command_rx.try_recv().ok(), Some(ControlCommand::Dismiss));
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let f = fixture();
        let response = f
            .app
            .oneshot(request(Method::GET, "/api/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(doc["paths"]["/api/v0/buttons/{button}"].is_object());
        assert!(doc["paths"]["/api/v0/status"].is_object());
    }
}
