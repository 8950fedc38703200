use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use tubepulse_common::{ChannelProfile, ChannelVideo, TubePulseError};
use tubepulse_engine::aggregate_once;
use youtube_client::YoutubeError;

use crate::session::Session;
use crate::AppState;

/// Page size for the one-shot search path; the aggregation path uses the
/// configured (larger) page size.
const QUICK_SEARCH_PAGE_SIZE: u32 = 10;

/// Uploads listed on a channel profile.
const CHANNEL_VIDEO_COUNT: u32 = 10;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/ws", get(ws_handler))
        .route("/api/search", get(api_search))
        .route("/api/word-stats/{query}", get(api_word_stats))
        .route("/api/channel/{channel_id}", get(api_channel))
        .with_state(state)
}

// --- WebSocket ---

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one connection: inbound search requests go to the session, results
/// broadcast by aggregators come back out as consolidated payloads.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket connection established");
    let (mut sender, mut receiver) = socket.split();
    let (mut session, mut result_rx) = Session::new();

    loop {
        tokio::select! {
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        session.handle_message(&text, &state.registry).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
            result = result_rx.recv() => {
                // The session holds the sender, so the channel cannot close
                // while we are in the loop.
                let Some(result) = result else { break };
                let payload = session.apply_result(result);
                match serde_json::to_string(&payload) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to serialize payload"),
                }
            }
        }
    }

    session.leave_all();
    info!("WebSocket connection closed");
}

// --- REST ---

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

/// One-shot search: the synchronous counterpart of the subscription path.
/// Unlike the WebSocket path, upstream failure surfaces here as a 502 with
/// the upstream error body.
async fn api_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let result = aggregate_once(
        state.client.as_ref(),
        state.registry.fetcher(),
        &params.query,
        QUICK_SEARCH_PAGE_SIZE,
        state.registry.settings().sentiment_timeout,
    )
    .await;

    match result {
        Ok((aggregated, _corpus)) => Json(aggregated).into_response(),
        Err(e) => {
            warn!(query = %params.query, error = %e, "Synchronous search failed");
            error_response(upstream_error(e))
        }
    }
}

async fn api_word_stats(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> Response {
    match state.registry.word_stats(&query).await {
        Some(stats) => Json(stats).into_response(),
        None => error_response(TubePulseError::NotFound(format!(
            "no word stats for query {query:?}"
        ))),
    }
}

async fn api_channel(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<String>,
) -> Response {
    let (details, latest) = tokio::join!(
        state.client.channel_details(&channel_id),
        state
            .client
            .channel_latest_videos(&channel_id, CHANNEL_VIDEO_COUNT),
    );

    let details = match details {
        Ok(list) => list,
        Err(e) => {
            warn!(channel_id, error = %e, "Channel details fetch failed");
            return error_response(upstream_error(e));
        }
    };
    let latest = match latest {
        Ok(list) => list,
        Err(e) => {
            warn!(channel_id, error = %e, "Channel uploads fetch failed");
            return error_response(upstream_error(e));
        }
    };

    let Some(channel) = details.items.into_iter().next() else {
        return error_response(TubePulseError::NotFound(format!(
            "no channel {channel_id:?}"
        )));
    };

    let snippet = channel.snippet.unwrap_or_default();
    let statistics = channel.statistics;
    let latest_videos = latest
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.video_id()?.to_string();
            let snippet = item.snippet.unwrap_or_default();
            Some(ChannelVideo {
                video_id,
                title: snippet.title,
                description: snippet.description,
                published_at: snippet.published_at,
                thumbnail_url: snippet.thumbnails.and_then(|t| t.default).and_then(|t| t.url),
            })
        })
        .collect();

    let profile = ChannelProfile {
        channel_id,
        title: snippet.title,
        description: snippet.description,
        subscriber_count: statistics.as_ref().and_then(|s| s.subscriber_count.clone()),
        video_count: statistics.as_ref().and_then(|s| s.video_count.clone()),
        view_count: statistics.as_ref().and_then(|s| s.view_count.clone()),
        latest_videos,
    };
    Json(profile).into_response()
}

/// Lift a client error into the application error type, keeping the upstream
/// body as the message.
fn upstream_error(e: YoutubeError) -> TubePulseError {
    let status = e.status().unwrap_or(StatusCode::BAD_GATEWAY.as_u16());
    let message = match e {
        YoutubeError::Api { message, .. } => message,
        other => other.to_string(),
    };
    TubePulseError::Upstream { status, message }
}

fn error_response(e: TubePulseError) -> Response {
    let status = match &e {
        TubePulseError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        TubePulseError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, e.to_string()).into_response()
}
