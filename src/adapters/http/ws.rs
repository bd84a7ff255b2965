use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::adapters::http::state::HttpState;
use crate::domain::events::{ClientMessage, ServerEvent};
use crate::domain::thresholds::ThresholdError;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(st): State<HttpState>,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, st))
}

/// Conexión bidireccional: reenvía los eventos difundidos por el
/// servidor y atiende los mensajes `set_threshold` y `get_status` del
/// cliente. Las respuestas directas van solo a este socket; los cambios
/// de umbral se difunden a todos.
async fn handle_socket(socket: WebSocket, st: HttpState) {
    info!("Cliente WebSocket conectado");
    let mut events = st.notifier.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let hello = ServerEvent::Connected {
        message: "Connected to YOLO inference server".to_string(),
        thresholds: st.inference.thresholds().current(),
    };
    if send_event(&mut sender, &hello).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Cliente WebSocket rezagado, {missed} eventos perdidos");
                }
                Err(RecvError::Closed) => break,
            },
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = handle_client_message(&text, &st) {
                        if send_event(&mut sender, &reply).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => debug!("Trama WebSocket no textual ignorada"),
                Some(Err(e)) => {
                    warn!("Error en el socket: {e}");
                    break;
                }
            },
        }
    }
    info!("Cliente WebSocket desconectado");
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).unwrap_or_default();
    sender.send(Message::Text(json.into())).await
}

/// Procesa un mensaje entrante y devuelve la respuesta directa para
/// este cliente, si la hay.
fn handle_client_message(text: &str, st: &HttpState) -> Option<ServerEvent> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(_) => {
            debug!("Mensaje de cliente no reconocido: {text}");
            return None;
        }
    };

    match message {
        ClientMessage::SetThreshold(patch) => {
            match st.inference.thresholds().apply(&patch) {
                Ok(updated) => {
                    // La confirmación llega a todos los clientes, este
                    // incluido, por el canal de difusión.
                    st.notifier.emit(ServerEvent::ThresholdsUpdated(updated));
                    None
                }
                Err(e) => Some(ServerEvent::Error {
                    message: match e {
                        ThresholdError::NotNumeric => "Invalid threshold values".to_string(),
                        other => other.to_string(),
                    },
                }),
            }
        }
        ClientMessage::GetStatus => Some(ServerEvent::StatusUpdate(st.inference.status())),
    }
}
