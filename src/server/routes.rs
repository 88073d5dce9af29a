use axum::{
    extract::{Path, Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::Error;
use crate::linker::{self, CrossLinker};
use crate::query::{QueryEngine, SearchCriteria};
use crate::server::AppState;
use std::sync::Arc;

type ApiResult = Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Default, Deserialize)]
pub struct ChemicalParams {
    /// Keyword search; takes precedence over the criteria fields
    pub q: Option<String>,
    pub name: Option<String>,
    pub cas: Option<String>,
    pub un_number: Option<String>,
    pub formula: Option<String>,
    pub hazard_keyword: Option<String>,
    pub physical_state: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ChemicalParams {
    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            name: self.name.clone(),
            cas: self.cas.clone(),
            un_number: self.un_number.clone(),
            formula: self.formula.clone(),
            hazard_keyword: self.hazard_keyword.clone(),
            physical_state: self.physical_state.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn api_error(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        Error::InvalidValue(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

fn to_json<T: Serialize>(value: &T) -> ApiResult {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| api_error(e.into()))
}

pub async fn handle_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    let chemicals = QueryEngine::new(&state.chemicals).get_statistics().await.map_err(api_error)?;
    let limits = QueryEngine::new(&state.limits).get_statistics().await.map_err(api_error)?;
    Ok(Json(serde_json::json!({
        "chemicals": chemicals,
        "exposure_limits": limits,
    })))
}

pub async fn handle_chemicals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChemicalParams>,
) -> ApiResult {
    let engine = QueryEngine::new(&state.chemicals);

    if let Some(q) = &params.q {
        let results = engine.search(q).await.map_err(api_error)?;
        return to_json(&results);
    }

    let criteria = params.criteria();
    if !criteria.is_empty() {
        let results = engine.advanced_search(&criteria).await.map_err(api_error)?;
        return to_json(&results);
    }

    let page = engine
        .get_all(params.page.unwrap_or(1), params.page_size.unwrap_or(state.page_size))
        .await
        .map_err(api_error)?;
    to_json(&page)
}

pub async fn handle_chemical(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult {
    match state.chemicals.get_by_id(id).await.map_err(api_error)? {
        Some(record) => to_json(&record),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { error: format!("chemical {} not found", id) }),
        )),
    }
}

pub async fn handle_limits(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> ApiResult {
    let engine = QueryEngine::new(&state.limits);

    if let Some(q) = &params.q {
        let results = engine.search(q).await.map_err(api_error)?;
        return to_json(&results);
    }

    let page = engine
        .get_all(params.page.unwrap_or(1), params.page_size.unwrap_or(state.page_size))
        .await
        .map_err(api_error)?;
    to_json(&page)
}

pub async fn handle_lookup(
    State(state): State<Arc<AppState>>,
    Path(cas): Path<String>,
) -> ApiResult {
    let combined = linker::lookup(&state.chemicals, &state.limits, &cas).await.map_err(api_error)?;
    to_json(&combined)
}

pub async fn handle_completeness(
    State(state): State<Arc<AppState>>,
    Path(cas): Path<String>,
) -> ApiResult {
    let report = linker::completeness(&state.chemicals, &state.limits, &cas).await.map_err(api_error)?;
    to_json(&report)
}

pub async fn handle_link(State(state): State<Arc<AppState>>) -> ApiResult {
    let summary = CrossLinker::new(&state.chemicals, &state.limits).run().await.map_err(api_error)?;
    to_json(&summary)
}
