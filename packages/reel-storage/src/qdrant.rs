use std::collections::{HashMap, HashSet};

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		Condition, CreateCollectionBuilder, Distance, Filter, PointId, PointStruct, Query,
		QueryPointsBuilder, ScoredPoint, UpsertPointsBuilder, Value, VectorParamsBuilder,
		VectorsOutput, point_id::PointIdOptions, value::Kind, vector_output,
		vectors_output::VectorsOptions,
	},
};
use reel_domain::{AssetPayload, AssetRecord, FilterExpr, Segment};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{ScoredAsset, VectorQuery},
};

pub const FILE_PATH_KEY: &str = "filePath";
pub const CANONICAL_PATH_KEY: &str = "canonicalPath";
pub const HASH_ID_KEY: &str = "hashId";
pub const SHOT_ID_KEY: &str = "shotId";
pub const LABEL_KEY: &str = "label";
pub const TAGS_KEY: &str = "tags";
pub const EMOTIONS_KEY: &str = "emotions";
pub const DESCRIPTION_KEY: &str = "description";
pub const DURATION_KEY: &str = "duration";
pub const SEGMENT_KEY: &str = "segment";

/// Duration reported for assets indexed without one.
pub const DEFAULT_DURATION_SECS: f64 = 5.0;

const UPSERT_BATCH_SIZE: usize = 64;

pub struct QdrantStore {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &reel_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the cosine-distance collection when it does not exist yet.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		self.client
			.create_collection(CreateCollectionBuilder::new(self.collection.clone()).vectors_config(
				VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
			))
			.await?;

		tracing::info!(collection = %self.collection, "Created asset collection.");

		Ok(())
	}

	pub async fn query_assets(&self, query: &VectorQuery) -> Result<Vec<ScoredAsset>> {
		if query.vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; collection expects {}.",
				query.vector.len(),
				self.vector_dim
			)));
		}

		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(query.vector.clone()))
			.limit(query.limit.into())
			.with_payload(true)
			.with_vectors(true);

		if let Some(floor) = query.score_threshold {
			search = search.score_threshold(floor);
		}
		if let Some(filter) = query.filter.as_ref() {
			search = search.filter(compile_filter(filter));
		}

		let response = self.client.query(search).await?;

		Ok(response.result.into_iter().filter_map(decode_point).collect())
	}

	pub async fn upsert_assets(&self, records: &[AssetRecord]) -> Result<()> {
		let mut seen = HashSet::new();
		let mut points = Vec::with_capacity(records.len());

		for record in records {
			if record.vector.len() != self.vector_dim as usize {
				return Err(Error::InvalidArgument(format!(
					"Asset {} has {} dimensions; collection expects {}.",
					record.payload.file_path,
					record.vector.len(),
					self.vector_dim
				)));
			}

			let id = record.resolved_id();

			if !seen.insert(id) {
				continue;
			}

			points.push(PointStruct::new(id.to_string(), record.vector.clone(), encode_payload(id, record)));
		}

		for batch in points.chunks(UPSERT_BATCH_SIZE) {
			self.client
				.upsert_points(
					UpsertPointsBuilder::new(self.collection.clone(), batch.to_vec()).wait(true),
				)
				.await?;
		}

		tracing::debug!(collection = %self.collection, count = points.len(), "Upserted assets.");

		Ok(())
	}
}

/// Compiles a filter expression into a Qdrant `should` filter.
pub fn compile_filter(expr: &FilterExpr) -> Filter {
	match expr {
		FilterExpr::Or(branches) => Filter::should(branches.iter().map(compile_condition)),
		other => Filter::should([compile_condition(other)]),
	}
}

fn compile_condition(expr: &FilterExpr) -> Condition {
	match expr {
		FilterExpr::AnyOfTags(tags) => Condition::matches(TAGS_KEY, tags.clone()),
		FilterExpr::TextContains(text) => Condition::matches_text(DESCRIPTION_KEY, text.clone()),
		FilterExpr::Or(branches) =>
			Condition::from(Filter::should(branches.iter().map(compile_condition))),
	}
}

fn encode_payload(id: Uuid, record: &AssetRecord) -> Payload {
	let asset = &record.payload;
	let mut payload = Payload::new();

	payload.insert(HASH_ID_KEY, id.to_string());
	payload.insert(FILE_PATH_KEY, asset.file_path.clone());
	payload.insert(CANONICAL_PATH_KEY, asset.identity_path().to_string());
	payload.insert(TAGS_KEY, serde_json::json!(asset.tags));
	payload.insert(EMOTIONS_KEY, serde_json::json!(asset.emotions));
	payload.insert(DESCRIPTION_KEY, asset.description.clone());
	payload.insert(DURATION_KEY, serde_json::json!(asset.duration));

	if let Some(shot_id) = asset.shot_id.as_ref() {
		payload.insert(SHOT_ID_KEY, shot_id.clone());
	}
	if let Some(label) = asset.label.as_ref() {
		payload.insert(LABEL_KEY, label.clone());
	}
	if let Some(segment) = asset.segment {
		payload.insert(
			SEGMENT_KEY,
			serde_json::json!({
				"start": segment.start,
				"end": segment.end,
				"index": segment.index,
			}),
		);
	}

	payload
}

fn decode_point(point: ScoredPoint) -> Option<ScoredAsset> {
	let Some(id) = point.id.as_ref().and_then(point_id_to_uuid) else {
		tracing::warn!(score = point.score, "Asset point missing UUID id.");

		return None;
	};
	let vector = point.vectors.and_then(dense_vector).unwrap_or_else(|| {
		tracing::warn!(asset_id = %id, "Asset point returned without a dense vector.");

		Vec::new()
	});
	let payload = decode_payload(&point.payload);

	Some(ScoredAsset { id, score: point.score, vector, payload })
}

#[allow(deprecated)]
fn dense_vector(vectors: VectorsOutput) -> Option<Vec<f32>> {
	let Some(VectorsOptions::Vector(output)) = vectors.vectors_options else { return None };

	match output.vector {
		Some(vector_output::Vector::Dense(dense)) => Some(dense.data),
		Some(_) => None,
		None if !output.data.is_empty() => Some(output.data),
		None => None,
	}
}

fn decode_payload(payload: &HashMap<String, Value>) -> AssetPayload {
	AssetPayload {
		file_path: payload_string(payload, FILE_PATH_KEY).unwrap_or_default(),
		canonical_path: payload_string(payload, CANONICAL_PATH_KEY),
		shot_id: payload_string(payload, SHOT_ID_KEY),
		label: payload_string(payload, LABEL_KEY),
		tags: payload_string_list(payload, TAGS_KEY),
		emotions: payload_string_list(payload, EMOTIONS_KEY),
		description: payload_string(payload, DESCRIPTION_KEY).unwrap_or_default(),
		duration: payload
			.get(DURATION_KEY)
			.and_then(value_f64)
			.unwrap_or(DEFAULT_DURATION_SECS),
		segment: payload_segment(payload),
	}
}

fn point_id_to_uuid(point_id: &PointId) -> Option<Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		Some(Kind::IntegerValue(number)) => Some(number.to_string()),
		_ => None,
	}
}

fn payload_string_list(payload: &HashMap<String, Value>, key: &str) -> Vec<String> {
	let Some(value) = payload.get(key) else { return Vec::new() };

	match &value.kind {
		Some(Kind::ListValue(list)) => list
			.values
			.iter()
			.filter_map(|item| match &item.kind {
				Some(Kind::StringValue(text)) => Some(text.to_string()),
				_ => None,
			})
			.collect(),
		Some(Kind::StringValue(text)) => vec![text.to_string()],
		_ => Vec::new(),
	}
}

fn payload_segment(payload: &HashMap<String, Value>) -> Option<Segment> {
	let value = payload.get(SEGMENT_KEY)?;
	let Some(Kind::StructValue(fields)) = &value.kind else { return None };
	let start = fields.fields.get("start").and_then(value_f64).unwrap_or(0.0);
	let end = fields.fields.get("end").and_then(value_f64)?;
	let index = fields
		.fields
		.get("index")
		.and_then(value_f64)
		.filter(|index| *index >= 0.0 && index.fract() == 0.0)
		.map(|index| index as u32)
		.unwrap_or(0);

	Some(Segment { start, end, index })
}

fn value_f64(value: &Value) -> Option<f64> {
	match &value.kind {
		Some(Kind::DoubleValue(number)) => Some(*number),
		Some(Kind::IntegerValue(number)) => Some(*number as f64),
		_ => None,
	}
}
