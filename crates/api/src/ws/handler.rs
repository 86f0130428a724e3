use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use hazard_core::identity::{CredentialError, CredentialValidator, SessionIdentity};

use crate::middleware::auth::bearer_token;
use crate::state::AppState;
use crate::ws::manager::WsManager;
use crate::ws::protocol::ClientFrame;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsAuthParams {
    pub token: Option<String>,
}

/// Why an upgrade request was refused. The connection is never opened.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl IntoResponse for HandshakeError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "code": "UNAUTHORIZED",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Resolve the connection identity from `?token=` or the Authorization
/// header, in that order.
pub fn authenticate_handshake(
    validator: &dyn CredentialValidator,
    query_token: Option<&str>,
    headers: &HeaderMap,
) -> Result<SessionIdentity, HandshakeError> {
    let token = query_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(headers))
        .ok_or(HandshakeError::MissingCredential)?;

    let credential = validator.validate(token)?;
    Ok(SessionIdentity::from(credential))
}

/// HTTP handler that authenticates, then upgrades the connection.
///
/// A missing or invalid credential is answered with 401 and no upgrade.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsAuthParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let identity =
        match authenticate_handshake(state.credentials.as_ref(), params.token.as_deref(), &headers) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket handshake rejected");
                return e.into_response();
            }
        };

    let ws_manager = Arc::clone(&state.ws_manager);
    ws.on_upgrade(move |socket| handle_socket(socket, ws_manager, Arc::new(identity)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection and its identity with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Handles subscribe/unsubscribe frames on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, identity: Arc<SessionIdentity>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, subject = %identity.subject(), "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), identity).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_frame(&ws_manager, &conn_id, text.as_str()).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Apply one client frame. Refused subscriptions are dropped without a
/// reply; the connection stays open.
async fn handle_frame(ws_manager: &WsManager, conn_id: &str, text: &str) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(conn_id = %conn_id, error = %e, "Ignoring unrecognised frame");
            return;
        }
    };

    match frame {
        ClientFrame::Subscribe { destination } => {
            match ws_manager.subscribe(conn_id, destination.as_deref()).await {
                Ok(dest) => {
                    tracing::debug!(conn_id = %conn_id, destination = %dest, "Subscription admitted");
                }
                Err(e) => {
                    tracing::warn!(
                        conn_id = %conn_id,
                        destination = ?destination,
                        error = %e,
                        "Subscription dropped"
                    );
                }
            }
        }
        ClientFrame::Unsubscribe { destination } => {
            let removed = ws_manager.unsubscribe(conn_id, destination.as_deref()).await;
            tracing::debug!(conn_id = %conn_id, destination = ?destination, removed, "Unsubscribe");
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    use super::*;
    use crate::auth::jwt::{generate_access_token, JwtConfig, JwtValidator};

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "handshake-test-secret".into(),
            access_token_expiry_mins: 5,
        }
    }

    #[test]
    fn query_token_is_accepted() {
        let token = generate_access_token("u@example.com", &["USER"], &config()).unwrap();
        let validator = JwtValidator::new(config());

        let identity =
            authenticate_handshake(&validator, Some(&token), &HeaderMap::new()).unwrap();
        assert_eq!(identity.subject(), "u@example.com");
    }

    #[test]
    fn header_token_is_accepted() {
        let token = generate_access_token("ops@example.com", &["ADMIN"], &config()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        let identity =
            authenticate_handshake(&JwtValidator::new(config()), None, &headers).unwrap();
        assert!(identity.is_admin());
    }

    #[test]
    fn missing_and_invalid_tokens_are_rejected() {
        let validator = JwtValidator::new(config());
        assert_matches!(
            authenticate_handshake(&validator, None, &HeaderMap::new()),
            Err(HandshakeError::MissingCredential)
        );
        assert_matches!(
            authenticate_handshake(&validator, Some("  "), &HeaderMap::new()),
            Err(HandshakeError::MissingCredential)
        );
        assert_matches!(
            authenticate_handshake(&validator, Some("garbage"), &HeaderMap::new()),
            Err(HandshakeError::Credential(CredentialError::Invalid))
        );
    }
}
