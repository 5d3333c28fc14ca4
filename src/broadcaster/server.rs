//! HTTP/WebSocket Transport
//!
//! An `axum` router exposing `/ws` for the subscriber wire protocol and
//! `/health` as a plain liveness check, mirroring how this codebase exposes
//! its other realtime subsystems.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use super::protocol::{ClientMessage, ServerMessage};
use super::Broadcaster;

pub fn router(broadcaster: Arc<Broadcaster>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(broadcaster)
}

pub async fn serve(bind_host: &str, bind_port: u16, broadcaster: Arc<Broadcaster>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{bind_host}:{bind_port}").parse()?;
    let app = router(broadcaster);
    log::info!("broadcaster listening on ws://{addr}/ws");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn ws_handler(ws: WebSocketUpgrade, State(broadcaster): State<Arc<Broadcaster>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, broadcaster))
}

async fn handle_ws(mut socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    let subscriber = broadcaster.register().await;
    let idle_timeout = Duration::from_secs(broadcaster.idle_timeout_secs());

    loop {
        tokio::select! {
            message = subscriber.recv() => {
                let Ok(text) = serde_json::to_string(&message) else { continue };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            received = tokio::time::timeout(idle_timeout, socket.recv()) => {
                match received {
                    Ok(Some(Ok(Message::Text(text)))) => {
                        handle_client_message(&text, &subscriber, &broadcaster);
                    }
                    Ok(Some(Ok(Message::Close(_)))) | Ok(None) => break,
                    Ok(Some(Err(err))) => {
                        log::warn!("subscriber {} socket error: {err}", subscriber.id);
                        break;
                    }
                    Ok(Some(Ok(_))) => {}
                    Err(_elapsed) => {
                        log::info!("subscriber {} idle timeout", subscriber.id);
                        break;
                    }
                }
            }
        }
    }

    broadcaster.remove(subscriber.id);
}

fn handle_client_message(text: &str, subscriber: &Arc<super::Subscriber>, broadcaster: &Arc<Broadcaster>) {
    let parsed: Result<ClientMessage, _> = serde_json::from_str(text);
    let Ok(message) = parsed else {
        log::debug!("ignoring unparseable client message: {text}");
        return;
    };
    match message {
        ClientMessage::Ping { timestamp } => {
            let subscriber = subscriber.clone();
            tokio::spawn(async move {
                subscriber.enqueue(ServerMessage::pong(timestamp)).await;
            });
        }
        ClientMessage::Config { mirror_mode, .. } => {
            if let Some(mirror) = mirror_mode {
                subscriber.set_mirror_mode(mirror);
            }
        }
        ClientMessage::ClearGestureHistory => {
            let _ = broadcaster.control_sender().send(super::ControlMessage::ClearGestureHistory);
        }
    }
}
