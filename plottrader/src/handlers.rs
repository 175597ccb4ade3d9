use std::time::Duration;

use axum::Json;
use axum::extract::{Path as AxumPath, Query, State};

use plottrader_execution::OrderData;
use plottrader_geometry::{parse_duration, parse_plot};

use crate::clients::build_orderer;
use crate::dto::{CreatePlotOrderRequest, CreateSessionRequest, PlotOrderResponse, SessionResponse, StopQuery, TokenQuery};
use crate::error::AppError;
use crate::state::AppState;

fn with_default_snapshot_dir(mut credentials: serde_json::Value, state: &AppState) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut credentials {
        map.entry("snapshot_dir").or_insert_with(|| {
            serde_json::Value::String(state.config.snapshot_dir.to_string_lossy().into_owned())
        });
    }
    credentials
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let credentials = with_default_snapshot_dir(request.credentials, &state);
    let orderer = build_orderer(&request.client, credentials.clone()).await?;
    let session = state.sessions.create(&credentials, orderer)?;
    Ok(Json(SessionResponse { token: session.token.clone(), sibling_tokens: Vec::new() }))
}

pub async fn get_session(
    State(state): State<AppState>,
    AxumPath(token): AxumPath<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(&token)?;
    let siblings = state.sessions.siblings(&token)?;
    Ok(Json(SessionResponse {
        token: session.token.clone(),
        sibling_tokens: siblings.into_iter().map(|s| s.token.clone()).collect(),
    }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    AxumPath(token): AxumPath<String>,
) -> Result<(), AppError> {
    state.sessions.delete(&token)?;
    Ok(())
}

pub async fn create_plot_order(
    State(state): State<AppState>,
    Json(request): Json<CreatePlotOrderRequest>,
) -> Result<Json<PlotOrderResponse>, AppError> {
    let session = state.sessions.get(&request.token)?;
    let plot = parse_plot(&request.plot).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let interval: Duration = parse_duration(&request.interval).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let summary = session
        .orderer
        .create(OrderData::Typed(request.order), plot, interval)
        .await?;
    Ok(Json(summary.into()))
}

pub async fn get_plot_order(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<PlotOrderResponse>, AppError> {
    let session = state.sessions.get(&query.token)?;
    let summary = session.orderer.get(&id).await?;
    Ok(Json(summary.into()))
}

pub async fn delete_plot_order(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(query): Query<StopQuery>,
) -> Result<(), AppError> {
    let session = state.sessions.get(&query.token)?;
    session.orderer.stop(&id, query.cancel_on_venue).await?;
    Ok(())
}
