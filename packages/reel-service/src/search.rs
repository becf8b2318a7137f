mod ranking;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, ReelService, Result, search::ranking::Candidate};
use reel_config::{Config, SearchDiversity};
use reel_domain::{FilterExpr, Segment};

/// Search over pre-encoded query vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridSearchRequest {
	pub query_vectors: Vec<Vec<f32>>,
	pub top_k: u32,
	/// Percent scale. Zero or below disables the floor.
	#[serde(default)]
	pub threshold: f32,
	#[serde(default)]
	pub filter_tags: Option<Vec<String>>,
	#[serde(default)]
	pub filter_scene: Option<String>,
	/// Falls back to `search.diversity.enabled`.
	#[serde(default)]
	pub enable_diversity: Option<bool>,
	/// Falls back to the configured single or multi-query lambda.
	#[serde(default)]
	pub diversity_lambda: Option<f32>,
}

/// Search over free-text queries. Unset knobs fall back to the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchTextRequest {
	pub queries: Vec<String>,
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default)]
	pub threshold: Option<f32>,
	#[serde(default)]
	pub filter_tags: Option<Vec<String>>,
	#[serde(default)]
	pub filter_scene: Option<String>,
	#[serde(default)]
	pub enable_diversity: Option<bool>,
	#[serde(default)]
	pub diversity_lambda: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
	pub id: Uuid,
	pub file_path: String,
	pub canonical_path: Option<String>,
	pub shot_id: Option<String>,
	pub label: Option<String>,
	/// Percent scale, rounded to two decimals.
	pub similarity: f64,
	pub tags: Vec<String>,
	pub emotions: Vec<String>,
	pub description: String,
	pub duration: f64,
	pub segment: Option<Segment>,
	/// Per-query similarity in percent, in query order. Only set for multi-query searches.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query_scores: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub items: Vec<SearchItem>,
	/// Distinct candidates considered before truncation or re-ranking.
	pub searched: usize,
	pub total: usize,
}

impl ReelService {
	pub async fn hybrid_search(&self, req: HybridSearchRequest) -> Result<SearchResponse> {
		let filter = validate_hybrid_request(&self.cfg, &req)?;
		let floor = ranking::percent_to_native(req.threshold);
		let candidates = if req.query_vectors.len() > 1 {
			ranking::fuse_queries(
				self.store.as_ref(),
				&req.query_vectors,
				req.top_k,
				floor,
				filter.as_ref(),
			)
			.await?
		} else {
			ranking::retrieve_candidates(
				self.store.as_ref(),
				&req.query_vectors[0],
				req.top_k,
				floor,
				filter.as_ref(),
			)
			.await?
			.into_iter()
			.map(Candidate::single)
			.collect()
		};
		let searched = candidates.len();
		let diversity = diversity_lambda(&self.cfg.search.diversity, &req);
		let selected = if let Some(lambda) = diversity {
			ranking::select_diverse(candidates, req.top_k, lambda)
		} else {
			let mut candidates = candidates;

			candidates.truncate(req.top_k as usize);

			candidates
		};
		let items: Vec<SearchItem> = selected.into_iter().map(search_item).collect();

		tracing::info!(
			queries = req.query_vectors.len(),
			top_k = req.top_k,
			searched,
			returned = items.len(),
			diversity = ?diversity,
			"Asset search completed."
		);

		Ok(SearchResponse { total: items.len(), searched, items })
	}

	pub async fn search_text(&self, req: SearchTextRequest) -> Result<SearchResponse> {
		let queries = normalize_queries(&req.queries)?;
		let vectors =
			self.providers.encoder.encode(&self.cfg.providers.embedding, &queries).await?;
		let search = &self.cfg.search;

		self.hybrid_search(HybridSearchRequest {
			query_vectors: vectors,
			top_k: req.top_k.unwrap_or(search.default_top_k),
			threshold: req.threshold.unwrap_or(search.default_threshold),
			filter_tags: req.filter_tags,
			filter_scene: req.filter_scene,
			enable_diversity: req.enable_diversity,
			diversity_lambda: req.diversity_lambda,
		})
		.await
	}
}

/// Resolves the MMR lambda, or `None` when re-ranking is off for this request.
fn diversity_lambda(diversity: &SearchDiversity, req: &HybridSearchRequest) -> Option<f32> {
	if !req.enable_diversity.unwrap_or(diversity.enabled) {
		return None;
	}

	let fallback = if req.query_vectors.len() > 1 {
		diversity.multi_query_mmr_lambda
	} else {
		diversity.mmr_lambda
	};

	Some(req.diversity_lambda.unwrap_or(fallback))
}

fn search_item(candidate: Candidate) -> SearchItem {
	let Candidate { asset, query_scores } = candidate;
	let payload = asset.payload;

	SearchItem {
		id: asset.id,
		file_path: payload.file_path,
		canonical_path: payload.canonical_path,
		shot_id: payload.shot_id,
		label: payload.label,
		similarity: ranking::native_to_percent(asset.score),
		tags: payload.tags,
		emotions: payload.emotions,
		description: payload.description,
		duration: payload.duration,
		segment: payload.segment,
		query_scores: query_scores
			.map(|scores| scores.into_iter().map(ranking::native_to_percent).collect()),
	}
}

/// Checks request bounds and builds the metadata filter.
fn validate_hybrid_request(cfg: &Config, req: &HybridSearchRequest) -> Result<Option<FilterExpr>> {
	if req.top_k == 0 {
		return Err(Error::invalid("top_k must be greater than zero."));
	}
	if req.query_vectors.is_empty() {
		return Err(Error::invalid("query_vectors must contain at least one vector."));
	}

	let dim = cfg.storage.qdrant.vector_dim as usize;

	for (idx, vector) in req.query_vectors.iter().enumerate() {
		if vector.len() != dim {
			return Err(Error::invalid(format!(
				"query_vectors[{idx}] has {} dimensions; expected {dim}.",
				vector.len()
			)));
		}
		if vector.iter().any(|value| !value.is_finite()) {
			return Err(Error::invalid(format!(
				"query_vectors[{idx}] must contain only finite values."
			)));
		}
	}

	if req.top_k > cfg.search.max_top_k {
		return Err(Error::invalid(format!(
			"top_k must not exceed {}.",
			cfg.search.max_top_k
		)));
	}
	if !req.threshold.is_finite() || req.threshold > 100.0 {
		return Err(Error::invalid("threshold must be a finite percent no greater than 100."));
	}
	if req
		.diversity_lambda
		.is_some_and(|lambda| !lambda.is_finite() || !(0.0..=1.0).contains(&lambda))
	{
		return Err(Error::invalid("diversity_lambda must be in the range 0.0-1.0."));
	}

	let tags = match req.filter_tags.as_ref() {
		Some(tags) => {
			let mut normalized = Vec::with_capacity(tags.len());

			for (idx, tag) in tags.iter().enumerate() {
				let tag = tag.trim();

				if tag.is_empty() {
					return Err(Error::invalid(format!("filter_tags[{idx}] must be non-empty.")));
				}

				normalized.push(tag.to_string());
			}

			Some(normalized)
		},
		None => None,
	};
	let scene = req
		.filter_scene
		.as_deref()
		.map(str::trim)
		.filter(|scene| !scene.is_empty())
		.map(str::to_string);

	Ok(FilterExpr::from_parts(tags, scene))
}

/// Trims queries, rejects blanks, and collapses duplicates while keeping first-seen order.
fn normalize_queries(queries: &[String]) -> Result<Vec<String>> {
	if queries.is_empty() {
		return Err(Error::invalid("queries must contain at least one query."));
	}

	let mut seen = HashSet::new();
	let mut out = Vec::with_capacity(queries.len());

	for (idx, query) in queries.iter().enumerate() {
		let query = query.trim();

		if query.is_empty() {
			return Err(Error::invalid(format!("queries[{idx}] must be non-empty.")));
		}
		if seen.insert(query.to_string()) {
			out.push(query.to_string());
		}
	}

	Ok(out)
}
