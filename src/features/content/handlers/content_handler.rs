use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::content::backends::Document;
use crate::features::content::models::{ContentEvent, SectionKind};
use crate::features::content::services::ContentStore;
use crate::shared::types::ApiResponse;

fn parse_section(section: &str) -> Result<SectionKind> {
    section.parse::<SectionKind>().map_err(AppError::NotFound)
}

/// Get every content section
#[utoipa::path(
    get,
    path = "/api/content",
    tag = "content",
    responses(
        (status = 200, description = "All sections keyed by name, defaults filled in")
    )
)]
pub async fn get_all_content(
    State(store): State<Arc<ContentStore>>,
) -> Json<ApiResponse<Document>> {
    Json(ApiResponse::success(Some(store.get_all().await), None, None))
}

/// Get one content section
#[utoipa::path(
    get,
    path = "/api/content/{section}",
    tag = "content",
    params(
        ("section" = SectionKind, Path, description = "Section name")
    ),
    responses(
        (status = 200, description = "Section document"),
        (status = 404, description = "Unknown section")
    )
)]
pub async fn get_section(
    State(store): State<Arc<ContentStore>>,
    Path(section): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let section = parse_section(&section)?;
    let data = store.get_section(section).await;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Replace one content section
#[utoipa::path(
    put,
    path = "/api/content/{section}",
    tag = "content",
    params(
        ("section" = SectionKind, Path, description = "Section name")
    ),
    responses(
        (status = 200, description = "Section saved"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Unknown section"),
        (status = 500, description = "Local write failed")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn update_section(
    State(store): State<Arc<ContentStore>>,
    Path(section): Path<String>,
    AppJson(data): AppJson<Value>,
) -> Result<Json<ApiResponse<()>>> {
    let section = parse_section(&section)?;

    if !store.update_section(section, data).await {
        return Err(AppError::Internal(format!(
            "Failed to save content section {}",
            section
        )));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some(format!("Section {} updated", section)),
        None,
    )))
}

/// Restore every section to its default
#[utoipa::path(
    post,
    path = "/api/content/reset",
    tag = "content",
    responses(
        (status = 200, description = "Content reset"),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Local write failed")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn reset_content(State(store): State<Arc<ContentStore>>) -> Result<Json<ApiResponse<()>>> {
    if !store.reset().await {
        return Err(AppError::Internal("Failed to reset content".to_string()));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Content reset to defaults".to_string()),
        None,
    )))
}

/// Change notifications, skipping over any the listener lagged behind on
pub(crate) fn content_events(
    rx: broadcast::Receiver<ContentEvent>,
) -> impl Stream<Item = ContentEvent> {
    BroadcastStream::new(rx).filter_map(|item| match item {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            debug!("Content listener lagged, skipped {} events", skipped);
            None
        }
    })
}

/// Subscribe to content changes
///
/// Emits `storage` and `content-updated` events whose data is the storage
/// key or the section name. Listeners re-read the section on each event.
#[utoipa::path(
    get,
    path = "/api/content/events",
    tag = "content",
    responses(
        (status = 200, description = "SSE stream of content change events", content_type = "text/event-stream")
    )
)]
pub async fn content_events_stream(State(store): State<Arc<ContentStore>>) -> Response {
    let stream = content_events(store.subscribe()).map(|event| {
        Ok::<_, std::convert::Infallible>(Event::default().event(event.name()).data(event.data()))
    });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("ping"),
        )
        .into_response()
}
