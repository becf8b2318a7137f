mod diversity;
mod fusion;
mod retrieval;
mod scale;

pub(super) use diversity::select_diverse;
pub(super) use fusion::fuse_queries;
pub(super) use retrieval::retrieve_candidates;
pub(super) use scale::{native_to_percent, percent_to_native};

use std::cmp::Ordering;

use reel_storage::models::ScoredAsset;

/// A retrieval candidate carrying its relevance on the native scale.
#[derive(Debug, Clone)]
pub(super) struct Candidate {
	/// `asset.score` is the relevance used for ranking: the store score on the single-query
	/// path, the fused mean on the multi-query path.
	pub(super) asset: ScoredAsset,
	/// Per-query native scores in query order. Present only for fused candidates.
	pub(super) query_scores: Option<Vec<f32>>,
}
impl Candidate {
	pub(super) fn single(asset: ScoredAsset) -> Self {
		Self { asset, query_scores: None }
	}

	pub(super) fn relevance(&self) -> f32 {
		self.asset.score
	}
}

pub(super) fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
