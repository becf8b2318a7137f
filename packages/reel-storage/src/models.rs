use reel_domain::{AssetPayload, FilterExpr};
use uuid::Uuid;

/// One nearest-neighbor request against the asset collection.
#[derive(Debug, Clone)]
pub struct VectorQuery {
	pub vector: Vec<f32>,
	pub limit: u32,
	/// Native-scale floor. `None` returns every match.
	pub score_threshold: Option<f32>,
	pub filter: Option<FilterExpr>,
}

/// A stored asset returned by a query, in store order.
#[derive(Debug, Clone)]
pub struct ScoredAsset {
	pub id: Uuid,
	pub score: f32,
	pub vector: Vec<f32>,
	pub payload: AssetPayload,
}
