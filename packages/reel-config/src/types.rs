use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub search: Search,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub default_top_k: u32,
	pub max_top_k: u32,
	/// Percent scale, 0-100. Zero disables the similarity floor.
	#[serde(default)]
	pub default_threshold: f32,
	pub diversity: SearchDiversity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDiversity {
	pub enabled: bool,
	/// Relevance weight used when a request carries a single query.
	#[serde(default = "default_mmr_lambda")]
	pub mmr_lambda: f32,
	/// Relevance weight used when a request is decomposed into several queries.
	#[serde(default = "default_multi_query_mmr_lambda")]
	pub multi_query_mmr_lambda: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}

fn default_mmr_lambda() -> f32 {
	0.7
}

fn default_multi_query_mmr_lambda() -> f32 {
	0.6
}
