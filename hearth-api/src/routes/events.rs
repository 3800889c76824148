use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::instrument;

use crate::{
    actor::Actor,
    app_state::AppState,
    domain::{change_feed::ChangeEvent, models::MemberId},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(subscribe))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeQuery {
    /// Restrict the stream to one member's changes; family-wide events are
    /// always delivered.
    member_id: Option<i64>,
}

#[instrument(name = "events_subscribe", skip(ws, app_state, _actor))]
async fn subscribe(
    _actor: Actor,
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Query(query): Query<SubscribeQuery>,
) -> impl IntoResponse {
    let rx = app_state.change_feed.subscribe();
    let filter = query.member_id.map(MemberId::new);
    ws.on_upgrade(move |socket| forward_events(socket, rx, filter))
}

async fn forward_events(
    socket: WebSocket,
    mut rx: tokio::sync::broadcast::Receiver<ChangeEvent>,
    filter: Option<MemberId>,
) {
    let (mut sender, mut receiver) = socket.split();

    // Drain (and ignore) anything the client sends; dropping the read half
    // would close the socket.
    tokio::spawn(async move { while let Some(Ok(_)) = receiver.next().await {} });

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            // Slow subscribers skip missed events; the client reloads on
            // the next one anyway.
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("event subscriber lagged, skipped {skipped}");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if !event.concerns(filter) {
            continue;
        }

        let frame = match serde_json::to_string(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("failed to serialize change event: {e}");
                continue;
            }
        };

        if sender.send(Message::Text(frame)).await.is_err() {
            break;
        }
    }
}
