use std::collections::HashSet;

use reel_domain::FilterExpr;
use reel_storage::models::{ScoredAsset, VectorQuery};

use crate::{AssetStore, Result};

/// Candidates requested per result slot, leaving room for the re-ranker.
pub const OVERSAMPLE_FACTOR: u32 = 3;

/// Runs one over-sampled vector query and returns candidates in store order.
pub async fn retrieve_candidates(
	store: &dyn AssetStore,
	vector: &[f32],
	top_k: u32,
	floor: Option<f32>,
	filter: Option<&FilterExpr>,
) -> Result<Vec<ScoredAsset>> {
	let query = VectorQuery {
		vector: vector.to_vec(),
		limit: top_k.saturating_mul(OVERSAMPLE_FACTOR),
		score_threshold: floor,
		filter: filter.cloned(),
	};
	let hits = store.query(&query).await?;
	let returned = hits.len();
	let candidates = dedup_by_id(hits);

	tracing::debug!(
		limit = query.limit,
		returned,
		kept = candidates.len(),
		filtered = query.filter.is_some(),
		"Retrieved asset candidates."
	);

	Ok(candidates)
}

fn dedup_by_id(hits: Vec<ScoredAsset>) -> Vec<ScoredAsset> {
	let mut seen = HashSet::with_capacity(hits.len());

	hits.into_iter().filter(|hit| seen.insert(hit.id)).collect()
}
