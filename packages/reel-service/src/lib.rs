pub mod index;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use index::{IndexAssetsRequest, IndexAssetsResponse};
pub use search::{HybridSearchRequest, SearchItem, SearchResponse, SearchTextRequest};

use std::{future::Future, pin::Pin, sync::Arc};

use reel_config::{Config, EmbeddingProviderConfig};
use reel_domain::AssetRecord;
use reel_providers::embedding;
use reel_storage::{
	memory::MemoryStore,
	models::{ScoredAsset, VectorQuery},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Vector store seen by the retrieval core.
pub trait AssetStore
where
	Self: Send + Sync,
{
	/// Nearest neighbors in descending native similarity, each with its stored vector.
	fn query<'a>(
		&'a self,
		query: &'a VectorQuery,
	) -> BoxFuture<'a, reel_storage::Result<Vec<ScoredAsset>>>;

	fn upsert<'a>(&'a self, records: &'a [AssetRecord]) -> BoxFuture<'a, reel_storage::Result<()>>;
}

pub trait QueryEncoder
where
	Self: Send + Sync,
{
	fn encode<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, reel_providers::Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub encoder: Arc<dyn QueryEncoder>,
}
impl Providers {
	pub fn new(encoder: Arc<dyn QueryEncoder>) -> Self {
		Self { encoder }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { encoder: Arc::new(DefaultProviders) }
	}
}

pub struct ReelService {
	pub cfg: Config,
	pub store: Arc<dyn AssetStore>,
	pub providers: Providers,
}
impl ReelService {
	pub fn new(cfg: Config, store: Arc<dyn AssetStore>) -> Self {
		Self { cfg, store, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn AssetStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}
}

struct DefaultProviders;

impl QueryEncoder for DefaultProviders {
	fn encode<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, reel_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl AssetStore for QdrantStore {
	fn query<'a>(
		&'a self,
		query: &'a VectorQuery,
	) -> BoxFuture<'a, reel_storage::Result<Vec<ScoredAsset>>> {
		Box::pin(self.query_assets(query))
	}

	fn upsert<'a>(&'a self, records: &'a [AssetRecord]) -> BoxFuture<'a, reel_storage::Result<()>> {
		Box::pin(self.upsert_assets(records))
	}
}

impl AssetStore for MemoryStore {
	fn query<'a>(
		&'a self,
		query: &'a VectorQuery,
	) -> BoxFuture<'a, reel_storage::Result<Vec<ScoredAsset>>> {
		Box::pin(async move { MemoryStore::query(self, query) })
	}

	fn upsert<'a>(&'a self, records: &'a [AssetRecord]) -> BoxFuture<'a, reel_storage::Result<()>> {
		Box::pin(async move { MemoryStore::upsert(self, records) })
	}
}
