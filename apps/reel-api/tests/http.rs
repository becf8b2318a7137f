use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;

use reel_api::{routes, state::AppState};
use reel_config::{
	Config, EmbeddingProviderConfig, Providers as ProviderSettings, Qdrant, Search,
	SearchDiversity, Security, Service, Storage,
};
use reel_domain::{AssetRecord, asset_id};
use reel_service::{AssetStore, BoxFuture, Providers, QueryEncoder, ReelService};
use reel_storage::{
	memory::MemoryStore,
	models::{ScoredAsset, VectorQuery},
};
use reel_testkit::TestCollection;

const DIM: u32 = 3;

fn test_config(qdrant_url: String, collection: String) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage { qdrant: Qdrant { url: qdrant_url, collection, vector_dim: DIM } },
		providers: ProviderSettings {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test".to_string(),
				dimensions: DIM,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		search: Search {
			default_top_k: 5,
			max_top_k: 20,
			default_threshold: 0.0,
			diversity: SearchDiversity {
				enabled: true,
				mmr_lambda: 0.7,
				multi_query_mmr_lambda: 0.6,
			},
		},
		security: Security { bind_localhost_only: true },
	}
}

struct AxisEncoder;
impl QueryEncoder for AxisEncoder {
	fn encode<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, reel_providers::Result<Vec<Vec<f32>>>> {
		let vectors = texts
			.iter()
			.map(|text| match text.as_str() {
				"street" => vec![1.0, 0.0, 0.0],
				"office" => vec![0.0, 1.0, 0.0],
				_ => vec![0.0, 0.0, 1.0],
			})
			.collect();

		Box::pin(async move { Ok(vectors) })
	}
}

struct UnreachableStore;
impl AssetStore for UnreachableStore {
	fn query<'a>(
		&'a self,
		_query: &'a VectorQuery,
	) -> BoxFuture<'a, reel_storage::Result<Vec<ScoredAsset>>> {
		Box::pin(async { Err(unreachable_store()) })
	}

	fn upsert<'a>(&'a self, _records: &'a [AssetRecord]) -> BoxFuture<'a, reel_storage::Result<()>> {
		Box::pin(async { Err(unreachable_store()) })
	}
}

fn unreachable_store() -> reel_storage::Error {
	reel_storage::Error::InvalidArgument("store is unreachable".to_string())
}

fn state_with_store(store: Arc<dyn AssetStore>) -> AppState {
	let config = test_config("http://127.0.0.1:6334".to_string(), "unused".to_string());
	let service =
		ReelService::with_providers(config, store, Providers::new(Arc::new(AxisEncoder)));

	AppState::from_service(service)
}

fn memory_state() -> AppState {
	state_with_store(Arc::new(MemoryStore::new(DIM)))
}

async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(uri)
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.unwrap_or_else(|err| panic!("Failed to call {uri}: {err}."));
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&body).expect("Failed to parse response.");

	(status, json)
}

async fn seed(state: &AppState) {
	let payload = serde_json::json!({
		"assets": [
			{
				"file_path": "/clips/street.mp4",
				"vector": [1.0, 0.0, 0.0],
				"tags": ["street"],
				"description": "a rainy street",
				"duration": 4.0,
				"segment": { "start": 0.0, "end": 4.0, "index": 0 }
			},
			{
				"file_path": "/clips/office.mp4",
				"vector": [0.0, 1.0, 0.0],
				"tags": ["office"],
				"description": "an open office"
			}
		]
	});
	let (status, json) =
		post_json(routes::admin_router(state.clone()), "/v1/admin/assets/upsert", payload).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["upserted"], 2);
}

#[tokio::test]
async fn health_ok() {
	let app = routes::router(memory_state());
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn text_search_returns_ranked_items() {
	let state = memory_state();

	seed(&state).await;

	let (status, json) = post_json(
		routes::router(state),
		"/v1/assets/search",
		serde_json::json!({ "queries": ["street"], "top_k": 1 }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["total"], 1);
	assert_eq!(json["searched"], 2);
	assert_eq!(json["items"][0]["file_path"], "/clips/street.mp4");
	assert_eq!(json["items"][0]["id"], asset_id("/clips/street.mp4", 0).to_string());
	assert_eq!(json["items"][0]["similarity"], 100.0);
	assert!(json["items"][0].get("vector").is_none());
	assert!(json["items"][0].get("query_scores").is_none());
}

#[tokio::test]
async fn vector_search_reports_per_query_scores() {
	let state = memory_state();

	seed(&state).await;

	let (status, json) = post_json(
		routes::router(state),
		"/v1/assets/search_vectors",
		serde_json::json!({
			"query_vectors": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
			"top_k": 2,
			"enable_diversity": false
		}),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["total"], 2);
	assert_eq!(json["items"][0]["similarity"], 50.0);
	assert_eq!(json["items"][0]["query_scores"], serde_json::json!([100.0, 0.0]));
}

#[tokio::test]
async fn invalid_request_maps_to_bad_request() {
	let (status, json) = post_json(
		routes::router(memory_state()),
		"/v1/assets/search_vectors",
		serde_json::json!({
			"query_vectors": [[1.0, 0.0, 0.0]],
			"top_k": 1,
			"filter_tags": ["street", " "]
		}),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert_eq!(json["fields"][0], "$.filter_tags[1]");
}

#[tokio::test]
async fn admin_upsert_rejects_wrong_dimension() {
	let (status, json) = post_json(
		routes::admin_router(memory_state()),
		"/v1/admin/assets/upsert",
		serde_json::json!({ "assets": [{ "file_path": "/clips/a.mp4", "vector": [1.0] }] }),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert_eq!(json["fields"][0], "$.assets[0].vector");
}

#[tokio::test]
async fn store_failure_maps_to_bad_gateway() {
	let state = state_with_store(Arc::new(UnreachableStore));
	let (status, json) = post_json(
		routes::router(state.clone()),
		"/v1/assets/search_vectors",
		serde_json::json!({ "query_vectors": [[1.0, 0.0, 0.0]], "top_k": 1 }),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "STORE_ERROR");
	assert!(json["fields"].is_null());

	let (status, json) = post_json(
		routes::router(state),
		"/v1/assets/search",
		serde_json::json!({ "queries": ["street", "office"] }),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "STORE_ERROR");
}

#[test]
fn public_binds_follow_loopback_rules() {
	let mut config = test_config("http://127.0.0.1:6334".to_string(), "unused".to_string());

	config.service.http_bind = "0.0.0.0:8080".to_string();

	assert!(reel_api::resolve_binds(&config).is_err());

	config.security.bind_localhost_only = false;

	assert!(reel_api::resolve_binds(&config).is_ok());

	config.service.admin_bind = "0.0.0.0:8081".to_string();

	assert!(reel_api::resolve_binds(&config).is_err());
}

#[tokio::test]
#[ignore = "Requires external Qdrant. Set REEL_QDRANT_URL to run."]
async fn qdrant_backed_search_round_trips() {
	let Some(qdrant_url) = reel_testkit::env_qdrant_url() else {
		eprintln!("Skipping; set REEL_QDRANT_URL to run this test.");

		return;
	};
	let collection = TestCollection::new(&qdrant_url, "reel_api");
	let config = test_config(qdrant_url, collection.name().to_string());
	let state = AppState::new(config).await.expect("Failed to initialize app state.");

	seed(&state).await;

	let (status, json) = post_json(
		routes::router(state),
		"/v1/assets/search_vectors",
		serde_json::json!({
			"query_vectors": [[1.0, 0.0, 0.0]],
			"top_k": 1,
			"filter_scene": "rainy"
		}),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["items"][0]["file_path"], "/clips/street.mp4");

	collection.cleanup().await.expect("Failed to clean up collection.");
}
