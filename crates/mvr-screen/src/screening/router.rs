use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};

use super::domain::{DecisionResult, FactRecord, ScreeningId};
use super::extraction::{FactExtractor, SourceDocument};
use super::repository::{ScreeningRecord, ScreeningRepository, ScreeningView};
use super::service::ScreeningService;
use crate::error::AppError;

pub(crate) const DOCUMENT_NAME_HEADER: &str = "x-document-name";
const DEFAULT_DOCUMENT_NAME: &str = "upload";
const RECENT_LIMIT: usize = 20;

/// Router builder exposing HTTP endpoints for decisions and screenings.
pub fn screening_router<X, R>(service: Arc<ScreeningService<X, R>>) -> Router
where
    X: FactExtractor + 'static,
    R: ScreeningRepository + 'static,
{
    Router::new()
        .route("/api/v1/mvr/decisions", post(decide_handler::<X, R>))
        .route(
            "/api/v1/mvr/screenings",
            post(screen_handler::<X, R>).get(recent_handler::<X, R>),
        )
        .route(
            "/api/v1/mvr/screenings/:screening_id",
            get(status_handler::<X, R>),
        )
        .with_state(service)
}

pub(crate) async fn decide_handler<X, R>(
    State(service): State<Arc<ScreeningService<X, R>>>,
    Json(facts): Json<FactRecord>,
) -> Json<DecisionResult>
where
    X: FactExtractor + 'static,
    R: ScreeningRepository + 'static,
{
    Json(service.decide(&facts))
}

pub(crate) async fn screen_handler<X, R>(
    State(service): State<Arc<ScreeningService<X, R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ScreeningView>), AppError>
where
    X: FactExtractor + 'static,
    R: ScreeningRepository + 'static,
{
    let name = headers
        .get(DOCUMENT_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DOCUMENT_NAME);
    let document = SourceDocument::new(name, body.to_vec());

    let record = service.screen(document)?;
    Ok((StatusCode::CREATED, Json(record.view())))
}

pub(crate) async fn status_handler<X, R>(
    State(service): State<Arc<ScreeningService<X, R>>>,
    Path(screening_id): Path<String>,
) -> Result<Json<ScreeningView>, AppError>
where
    X: FactExtractor + 'static,
    R: ScreeningRepository + 'static,
{
    let record = service.get(&ScreeningId(screening_id))?;
    Ok(Json(record.view()))
}

pub(crate) async fn recent_handler<X, R>(
    State(service): State<Arc<ScreeningService<X, R>>>,
) -> Result<Json<Vec<ScreeningView>>, AppError>
where
    X: FactExtractor + 'static,
    R: ScreeningRepository + 'static,
{
    let records = service.recent(RECENT_LIMIT)?;
    Ok(Json(records.iter().map(ScreeningRecord::view).collect()))
}
