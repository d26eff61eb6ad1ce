//! Session gateway (section 4.E): one authenticated WebSocket per client,
//! generalizing the source's socket.io transport into a plain JSON envelope
//! -- inbound `{event, requestId, data}`, outbound ack `{type:"ack",
//! requestId, success, ...}` or unsolicited push `{type:"event", event,
//! data}`. Each connection owns one send task draining an mpsc channel so
//! room broadcasts and direct pushes (timeouts, pairing notifications) can
//! all funnel through the same socket write half, the same `JoinHandle`-fed
//! task shape the teacher used for its own websocket send/recv split.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::auth::{jwt::validate_access_token, middleware::extract_token_raw};
use crate::matchmaking::QueuedPlayer;
use crate::models::problem::DuelProblemView;
use crate::room_engine::{NewPlayer, RoomSnapshot};
use crate::validation;
use crate::AppState;

#[derive(Clone)]
pub struct SessionHandle {
    pub tx: mpsc::UnboundedSender<Message>,
    pub joined_rooms: Arc<Mutex<HashSet<Uuid>>>,
}

impl SessionHandle {
    fn push(&self, event: &str, data: Value) {
        let envelope = json!({ "type": "event", "event": event, "data": data });
        let _ = self.tx.send(Message::Text(envelope.to_string()));
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let token = match extract_token_raw(&headers, uri.query()) {
        Some(t) => t,
        None => return (StatusCode::UNAUTHORIZED, "missing access token").into_response(),
    };
    let claims = match validate_access_token(&token, &state.config.access_token_secret) {
        Ok(c) => c,
        Err(_) => return (StatusCode::UNAUTHORIZED, "invalid or expired token").into_response(),
    };
    let user_id = claims.user_id;
    if state.store.get_user(user_id).await.is_err() {
        return (StatusCode::UNAUTHORIZED, "unknown user").into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let handle = SessionHandle {
        tx,
        joined_rooms: Arc::new(Mutex::new(HashSet::new())),
    };
    state.sessions.write().await.insert(user_id, handle.clone());
    tracing::info!(user_id = %user_id, "session connected");

    let send_task: JoinHandle<()> = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => dispatch(&state, user_id, &handle, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    tracing::info!(user_id = %user_id, "session disconnected");
    state.sessions.write().await.remove(&user_id);
    state.matchmaking.remove(user_id).await;
    state.room_engine.notify_disconnect(user_id).await;
    send_task.abort();
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboundEnvelope {
    event: String,
    #[serde(default)]
    request_id: Option<Value>,
    #[serde(default)]
    data: Value,
}

fn ack(request_id: Option<Value>, payload: Value) -> Message {
    let mut out = serde_json::Map::new();
    out.insert("type".into(), json!("ack"));
    out.insert("requestId".into(), request_id.unwrap_or(Value::Null));
    if let Value::Object(fields) = payload {
        out.extend(fields);
    }
    Message::Text(Value::Object(out).to_string())
}

async fn dispatch(state: &AppState, user_id: Uuid, handle: &SessionHandle, raw: &str) {
    let envelope: InboundEnvelope = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(_) => return,
    };

    let payload = match envelope.event.as_str() {
        "findMatch" => handle_find_match(state, user_id, handle).await,
        "cancelMatchmaking" => handle_cancel_matchmaking(state, user_id).await,
        "getMatchmakingStatus" => handle_matchmaking_status(state, user_id).await,
        "submitSolution" => handle_submit_solution(state, user_id, envelope.data).await,
        "leaveMatch" => handle_leave_match(state, user_id, envelope.data).await,
        "getRoomStatus" => handle_get_room_status(state, envelope.data).await,
        "getActiveMatches" => handle_get_active_matches(state, user_id).await,
        "rejoinMatch" => handle_rejoin_match(state, user_id, handle, envelope.data).await,
        "sendMessage" => handle_send_message(state, user_id, envelope.data).await,
        other => json!({ "success": false, "message": format!("unknown event: {other}") }),
    };

    let _ = handle.tx.send(ack(envelope.request_id, payload));
}

async fn attach_room(state: &AppState, handle: &SessionHandle, room_id: Uuid) {
    let mut joined = handle.joined_rooms.lock().await;
    if !joined.insert(room_id) {
        return;
    }
    drop(joined);

    let mut rx = state.room_engine.subscribe(room_id);
    let tx = handle.tx.clone();
    tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if tx.send(Message::Text(msg)).is_err() {
                break;
            }
        }
    });
}

fn spawn_matchmaking_deadline(state: AppState, user_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(state.config.matchmaking_timeout_ms.max(0) as u64)).await;
        if state.matchmaking.remove(user_id).await.is_some() {
            tracing::info!(user_id = %user_id, "matchmaking deadline fired");
            if let Some(handle) = state.sessions.read().await.get(&user_id).cloned() {
                handle.push("matchmakingTimeout", json!({}));
            }
        }
    })
}

async fn handle_find_match(state: &AppState, user_id: Uuid, handle: &SessionHandle) -> Value {
    if state.matchmaking.has(user_id).await {
        return json!({ "success": false, "message": "already in the matchmaking queue" });
    }
    if !state.room_engine.active_matches(user_id).await.is_empty() {
        return json!({ "success": false, "message": "already in an active match" });
    }

    let user = match state.store.get_user(user_id).await {
        Ok(u) => u,
        Err(e) => return json!({ "success": false, "message": e.to_string() }),
    };

    let candidate = QueuedPlayer {
        user_id,
        username: user.username.clone(),
        rating: user.rating,
        joined_at: state.clock.now(),
    };

    let opponent = {
        let _guard = state.pairing_lock.lock().await;
        let found = state.matchmaking.find_match(&candidate).await;
        if let Some(ref opponent) = found {
            state.matchmaking.remove(opponent.user_id).await;
        }
        found
    };

    let Some(opponent) = opponent else {
        let deadline = spawn_matchmaking_deadline(state.clone(), user_id);
        state.matchmaking.add(candidate, deadline).await;
        tracing::info!(user_id = %user_id, "queued for matchmaking");
        return json!({ "success": true, "message": "searching for an opponent", "status": "searching" });
    };

    let opponent_user = match state.store.get_user(opponent.user_id).await {
        Ok(u) => u,
        Err(e) => return json!({ "success": false, "message": e.to_string() }),
    };

    let a = NewPlayer {
        user_id,
        username: user.username.clone(),
        rating: user.rating,
        games_played: user.duels_played,
    };
    let b = NewPlayer {
        user_id: opponent.user_id,
        username: opponent_user.username.clone(),
        rating: opponent_user.rating,
        games_played: opponent_user.duels_played,
    };

    let created = match state.room_engine.create(a, b).await {
        Ok(created) => created,
        Err(e) => return json!({ "success": false, "message": e.to_string() }),
    };
    let room_id = created.room_id;

    attach_room(state, handle, room_id).await;
    let opponent_handle = state.sessions.read().await.get(&opponent.user_id).cloned();
    if let Some(ref opponent_handle) = opponent_handle {
        attach_room(state, opponent_handle, room_id).await;
    }

    // Pushed directly to each session rather than over the room's broadcast
    // channel: neither side has subscribed yet at this point (attach_room
    // above only wires up *future* room broadcasts), so a pubsub publish here
    // would be silently dropped for both players.
    let match_found = json!({
        "roomId": room_id,
        "problem": DuelProblemView::from(&created.problem),
        "startedAt": created.started_at,
        "endsAt": created.ends_at,
    });
    handle.push("matchFound", match_found.clone());
    if let Some(opponent_handle) = opponent_handle {
        opponent_handle.push("matchFound", match_found);
    }

    tracing::info!(room_id = %room_id, a = %user_id, b = %opponent.user_id, "matchmaking paired two players");
    json!({ "success": true, "message": "matched", "status": "matched", "roomId": room_id })
}

async fn handle_cancel_matchmaking(state: &AppState, user_id: Uuid) -> Value {
    match state.matchmaking.remove(user_id).await {
        Some(_) => json!({ "success": true, "message": "left the matchmaking queue" }),
        None => json!({ "success": false, "message": "not in the matchmaking queue" }),
    }
}

async fn handle_matchmaking_status(state: &AppState, user_id: Uuid) -> Value {
    let queue_size = state.matchmaking.size().await;
    match state.matchmaking.get(user_id).await {
        Some(entry) => {
            let wait_time = (state.clock.now() - entry.joined_at).num_milliseconds().max(0);
            json!({ "success": true, "inQueue": true, "queueSize": queue_size, "waitTime": wait_time })
        }
        None => json!({ "success": true, "inQueue": false, "queueSize": queue_size, "waitTime": 0 }),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomIdPayload {
    room_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitSolutionPayload {
    room_id: Uuid,
    code: String,
    language: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessagePayload {
    room_id: Uuid,
    message: String,
}

async fn handle_submit_solution(state: &AppState, user_id: Uuid, data: Value) -> Value {
    let payload: SubmitSolutionPayload = match serde_json::from_value(data) {
        Ok(p) => p,
        Err(_) => return json!({ "success": false, "message": "roomId, code, and language are required" }),
    };
    match state.room_engine.submit(payload.room_id, user_id, &payload.code, &payload.language).await {
        Ok((score, passed)) => json!({ "success": true, "score": score, "passedTestcases": passed }),
        Err(e) => json!({ "success": false, "message": e.to_string() }),
    }
}

async fn handle_leave_match(state: &AppState, user_id: Uuid, data: Value) -> Value {
    let payload: RoomIdPayload = match serde_json::from_value(data) {
        Ok(p) => p,
        Err(_) => return json!({ "success": false, "message": "roomId is required" }),
    };
    match state.room_engine.forfeit(payload.room_id, user_id).await {
        Ok(()) => json!({ "success": true, "message": "left the match" }),
        Err(e) => json!({ "success": false, "message": e.to_string() }),
    }
}

fn snapshot_fields(snapshot: RoomSnapshot) -> Value {
    json!({
        "success": true,
        "roomId": snapshot.room_id,
        "problemId": snapshot.problem_id,
        "roomStatus": snapshot.room_status,
        "users": snapshot.users,
        "isActive": snapshot.is_active,
        "remainingTime": snapshot.remaining_time_ms,
    })
}

async fn handle_get_room_status(state: &AppState, data: Value) -> Value {
    let payload: RoomIdPayload = match serde_json::from_value(data) {
        Ok(p) => p,
        Err(_) => return json!({ "success": false, "message": "roomId is required" }),
    };
    match state.room_engine.status(payload.room_id).await {
        Ok(snapshot) => snapshot_fields(snapshot),
        Err(e) => json!({ "success": false, "message": e.to_string() }),
    }
}

async fn handle_get_active_matches(state: &AppState, user_id: Uuid) -> Value {
    let matches = state.room_engine.active_matches(user_id).await;
    json!({ "success": true, "matches": matches })
}

async fn handle_rejoin_match(state: &AppState, user_id: Uuid, handle: &SessionHandle, data: Value) -> Value {
    let payload: RoomIdPayload = match serde_json::from_value(data) {
        Ok(p) => p,
        Err(_) => return json!({ "success": false, "message": "roomId is required" }),
    };
    match state.room_engine.rejoin(payload.room_id, user_id).await {
        Ok(snapshot) => {
            attach_room(state, handle, payload.room_id).await;
            if let Some(opponent) = snapshot.users.iter().find(|u| u.user_id != user_id) {
                if let Some(opponent_handle) = state.sessions.read().await.get(&opponent.user_id).cloned() {
                    opponent_handle.push("opponentReconnected", json!({ "userId": user_id }));
                }
            }
            snapshot_fields(snapshot)
        }
        Err(e) => json!({ "success": false, "message": e.to_string() }),
    }
}

async fn handle_send_message(state: &AppState, user_id: Uuid, data: Value) -> Value {
    let payload: SendMessagePayload = match serde_json::from_value(data) {
        Ok(p) => p,
        Err(_) => return json!({ "success": false, "message": "roomId and message are required" }),
    };
    let message = validation::truncate_chat_message(&payload.message);
    let username = match state.store.get_user(user_id).await {
        Ok(u) => u.username,
        Err(e) => return json!({ "success": false, "message": e.to_string() }),
    };
    match state.room_engine.send_chat(payload.room_id, user_id, &username, &message).await {
        Ok(()) => json!({ "success": true }),
        Err(e) => json!({ "success": false, "message": e.to_string() }),
    }
}
