//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching subscription commands and forwarding filtered boost events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{BoostEvent, CategorySlug};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads subscription commands from the client and applies them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<BoostEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(boost_event) => {
                        if subs.matches(boost_event.category()) {
                            let msg = WsMessage {
                                id: uuid::Uuid::new_v4().to_string(),
                                msg_type: WsMessageType::Event,
                                timestamp: chrono::Utc::now(),
                                payload: serde_json::to_value(&boost_event).unwrap_or_default(),
                            };
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON
/// response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error_message(String::new(), 400, "malformed JSON");
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload.clone()) else {
        return error_message(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { categories } => {
            let (slugs, wildcard) = parse_categories(&categories);
            subs.subscribe(&slugs, wildcard);
            let response = WsMessage {
                id: msg.id,
                msg_type: WsMessageType::Response,
                timestamp: chrono::Utc::now(),
                payload: serde_json::json!({
                    "subscribed": slugs.iter().map(CategorySlug::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            };
            serde_json::to_string(&response).ok()
        }
        WsCommand::Unsubscribe { categories } => {
            let (slugs, _) = parse_categories(&categories);
            subs.unsubscribe(&slugs);
            let response = WsMessage {
                id: msg.id,
                msg_type: WsMessageType::Response,
                timestamp: chrono::Utc::now(),
                payload: serde_json::json!({
                    "unsubscribed": slugs.iter().map(CategorySlug::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                }),
            };
            serde_json::to_string(&response).ok()
        }
    }
}

/// Splits raw category strings into valid slugs and the wildcard flag;
/// unparseable entries are ignored.
fn parse_categories(raw: &[String]) -> (Vec<CategorySlug>, bool) {
    let mut slugs = Vec::new();
    let mut wildcard = false;
    for entry in raw {
        if entry == "*" {
            wildcard = true;
        } else if let Ok(slug) = CategorySlug::new(entry) {
            slugs.push(slug);
        }
    }
    (slugs, wildcard)
}

fn error_message(id: String, code: u32, message: &str) -> Option<String> {
    let err = WsMessage {
        id,
        msg_type: WsMessageType::Error,
        timestamp: chrono::Utc::now(),
        payload: serde_json::json!({
            "code": code,
            "message": message,
        }),
    };
    serde_json::to_string(&err).ok()
}
