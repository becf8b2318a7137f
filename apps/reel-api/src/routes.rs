use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use reel_service::{
	Error, HybridSearchRequest, IndexAssetsRequest, IndexAssetsResponse, SearchResponse,
	SearchTextRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/assets/search", post(search))
		.route("/v1/assets/search_vectors", post(search_vectors))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/assets/upsert", post(upsert_assets)).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchTextRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search_text(payload).await?;

	Ok(Json(response))
}

async fn search_vectors(
	State(state): State<AppState>,
	Json(payload): Json<HybridSearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.hybrid_search(payload).await?;

	Ok(Json(response))
}

async fn upsert_assets(
	State(state): State<AppState>,
	Json(payload): Json<IndexAssetsRequest>,
) -> Result<Json<IndexAssetsResponse>, ApiError> {
	let response = state.service.index_assets(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } => {
				let fields = field_path(&message).map(|field| vec![field]);

				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, fields)
			},
			Error::Store { message } => {
				tracing::error!(error = %message, "Asset store request failed.");

				ApiError::new(StatusCode::BAD_GATEWAY, "STORE_ERROR", message, None)
			},
			Error::Provider { message } => {
				tracing::error!(error = %message, "Embedding provider request failed.");

				ApiError::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

/// Pulls the leading field path, such as `filter_tags[1]`, out of a validation message.
fn field_path(message: &str) -> Option<String> {
	let head = message.split_whitespace().next()?;
	let is_path = head.starts_with(|ch: char| ch.is_ascii_lowercase())
		&& head.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '[' | ']' | '.'));

	is_path.then(|| format!("$.{head}"))
}
