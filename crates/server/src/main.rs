use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{CategoryId, ChannelId, ChannelKind, GuildId},
    error::{ApiError, ErrorCode},
    protocol::{InboundEvent, Reply},
};
use storage::Storage;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use wizard::{pending::PendingActions, Navigator, SweepReport};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url, Settings};

#[derive(Debug, Serialize, Deserialize)]
struct LayoutResponse {
    categories: Vec<CategoryView>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryView {
    id: CategoryId,
    name: String,
    order: u32,
    channels: Vec<ChannelId>,
}

#[derive(Debug, Deserialize)]
struct UpsertChannelRequest {
    guild_id: i64,
    name: String,
    #[serde(default = "default_kind")]
    kind: ChannelKind,
}

fn default_kind() -> ChannelKind {
    ChannelKind::Text
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let navigator =
        Navigator::new(storage).with_pending(PendingActions::with_ttl(settings.pending_ttl()));
    let _sweeper = spawn_sweeper(navigator.clone(), &settings);

    let app = build_router(Arc::new(AppState { navigator }));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "navigator listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drops idle wizard sessions and expired confirm tokens.
fn spawn_sweeper(navigator: Navigator, settings: &Settings) -> JoinHandle<()> {
    let session_ttl = settings.session_ttl();
    let pending_ttl = settings.pending_ttl();
    let mut ticker = tokio::time::interval(settings.sweep_interval());
    tokio::spawn(async move {
        loop {
            ticker.tick().await;
            let report = navigator.sweep(Utc::now(), session_ttl, pending_ttl);
            if report != SweepReport::default() {
                debug!(
                    edit_sessions = report.edit_sessions,
                    navi_sessions = report.navi_sessions,
                    pending = report.pending,
                    "reclaimed idle wizard state"
                );
            }
        }
    })
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/interactions", post(interactions))
        .route("/navigator", get(navigator_layout))
        .route("/directory/channels/:channel_id", put(upsert_channel))
        .with_state(state)
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state
        .navigator
        .storage
        .health_check()
        .await
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::internal(e.to_string())),
            )
        })?;
    Ok("ok")
}

async fn interactions(
    State(state): State<Arc<AppState>>,
    Json(event): Json<InboundEvent>,
) -> Json<Reply> {
    Json(state.navigator.dispatch(event).await)
}

async fn navigator_layout(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LayoutResponse>, (StatusCode, Json<ApiError>)> {
    let doc = state.navigator.storage.read_all().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::internal(e.to_string())),
        )
    })?;
    let categories = doc
        .sorted_categories()
        .into_iter()
        .map(|category| CategoryView {
            id: category.id.clone(),
            name: category.name.clone(),
            order: category.order,
            channels: doc.channels_in(&category.id),
        })
        .collect();
    Ok(Json(LayoutResponse { categories }))
}

async fn upsert_channel(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<i64>,
    Json(req): Json<UpsertChannelRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, "channel name cannot be empty")),
        ));
    }
    state
        .navigator
        .storage
        .upsert_channel(ChannelId(channel_id), GuildId(req.guild_id), name, req.kind)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::internal(e.to_string())),
            )
        })?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
