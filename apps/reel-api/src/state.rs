use std::sync::Arc;

use reel_service::ReelService;
use reel_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ReelService>,
}
impl AppState {
	/// Connects to Qdrant, creates the asset collection if missing, and wires the service.
	pub async fn new(config: reel_config::Config) -> color_eyre::Result<Self> {
		let store = QdrantStore::new(&config.storage.qdrant)?;

		store.ensure_collection().await?;

		let service = ReelService::new(config, Arc::new(store));

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: ReelService) -> Self {
		Self { service: Arc::new(service) }
	}
}
