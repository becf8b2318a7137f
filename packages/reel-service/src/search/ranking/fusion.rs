use std::collections::HashMap;

use reel_domain::FilterExpr;
use reel_storage::models::ScoredAsset;
use uuid::Uuid;

use crate::{
	AssetStore, Result,
	search::ranking::{Candidate, cmp_f32_desc, retrieval},
};

/// Retrieves candidates for every query vector and fuses them by mean similarity.
///
/// Each query runs with the same `top_k`, floor, and filter. Any failing retrieval fails the
/// whole fusion.
pub async fn fuse_queries(
	store: &dyn AssetStore,
	vectors: &[Vec<f32>],
	top_k: u32,
	floor: Option<f32>,
	filter: Option<&FilterExpr>,
) -> Result<Vec<Candidate>> {
	let mut result_sets = Vec::with_capacity(vectors.len());

	for vector in vectors {
		result_sets.push(retrieval::retrieve_candidates(store, vector, top_k, floor, filter).await?);
	}

	let fused = fuse_result_sets(result_sets);

	tracing::debug!(queries = vectors.len(), fused = fused.len(), "Fused query candidates.");

	Ok(fused)
}

/// Averages per-query scores over all result sets. A set that lacks an asset contributes 0.
///
/// Output is sorted by descending fused score. Ties keep first-appearance order: earlier query
/// first, then earlier rank within it. The vector kept for each asset comes from the first set
/// that contained it.
pub(super) fn fuse_result_sets(result_sets: Vec<Vec<ScoredAsset>>) -> Vec<Candidate> {
	let query_count = result_sets.len();

	if query_count == 0 {
		return Vec::new();
	}

	let mut positions: HashMap<Uuid, usize> = HashMap::new();
	let mut fused: Vec<Candidate> = Vec::new();

	for (query_idx, result_set) in result_sets.into_iter().enumerate() {
		for asset in result_set {
			let score = asset.score;
			let position = *positions.entry(asset.id).or_insert_with(|| {
				fused.push(Candidate { asset, query_scores: Some(vec![0.0; query_count]) });

				fused.len() - 1
			});

			if let Some(scores) = fused[position].query_scores.as_mut() {
				scores[query_idx] = score;
			}
		}
	}

	for candidate in &mut fused {
		let total: f32 = candidate.query_scores.iter().flatten().sum();

		candidate.asset.score = total / query_count as f32;
	}

	fused.sort_by(|a, b| cmp_f32_desc(a.relevance(), b.relevance()));

	fused
}

#[cfg(test)]
mod tests {
	use reel_domain::AssetPayload;

	use super::*;

	fn hit(id: Uuid, score: f32, vector: Vec<f32>) -> ScoredAsset {
		ScoredAsset { id, score, vector, payload: AssetPayload::default() }
	}

	#[test]
	fn missing_scores_count_as_zero() {
		let a = Uuid::new_v4();
		let b = Uuid::new_v4();
		let fused = fuse_result_sets(vec![
			vec![hit(a, 0.8, vec![1.0]), hit(b, 0.6, vec![1.0])],
			vec![hit(b, 0.6, vec![1.0])],
		]);

		assert_eq!(fused.len(), 2);
		assert_eq!(fused[0].asset.id, b);
		assert!((fused[0].relevance() - 0.6).abs() < 1e-6);
		assert_eq!(fused[1].asset.id, a);
		assert!((fused[1].relevance() - 0.4).abs() < 1e-6);
		assert_eq!(fused[1].query_scores, Some(vec![0.8, 0.0]));
	}

	#[test]
	fn ties_keep_first_appearance_order() {
		let a = Uuid::new_v4();
		let b = Uuid::new_v4();
		let c = Uuid::new_v4();
		let fused = fuse_result_sets(vec![
			vec![hit(a, 0.5, vec![1.0]), hit(b, 0.5, vec![1.0])],
			vec![hit(c, 1.0, vec![1.0])],
		]);
		let ids: Vec<_> = fused.iter().map(|candidate| candidate.asset.id).collect();

		assert_eq!(ids, vec![c, a, b]);
	}

	#[test]
	fn keeps_vector_from_first_result_set() {
		let a = Uuid::new_v4();
		let fused = fuse_result_sets(vec![
			vec![hit(a, 0.5, vec![1.0, 0.0])],
			vec![hit(a, 0.7, vec![0.0, 1.0])],
		]);

		assert_eq!(fused[0].asset.vector, vec![1.0, 0.0]);
		assert_eq!(fused[0].query_scores, Some(vec![0.5, 0.7]));
	}

	#[test]
	fn no_result_sets_fuse_to_nothing() {
		assert!(fuse_result_sets(Vec::new()).is_empty());
		assert!(fuse_result_sets(vec![Vec::new(), Vec::new()]).is_empty());
	}
}
