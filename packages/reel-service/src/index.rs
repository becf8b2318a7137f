use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, ReelService, Result};
use reel_domain::AssetRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexAssetsRequest {
	pub assets: Vec<AssetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexAssetsResponse {
	/// Ids of the stored assets, in request order.
	pub ids: Vec<Uuid>,
	pub upserted: usize,
}

impl ReelService {
	/// Validates asset records, derives missing ids, and upserts them into the store.
	pub async fn index_assets(&self, req: IndexAssetsRequest) -> Result<IndexAssetsResponse> {
		if req.assets.is_empty() {
			return Ok(IndexAssetsResponse { ids: Vec::new(), upserted: 0 });
		}

		let dim = self.cfg.storage.qdrant.vector_dim as usize;
		let mut records = Vec::with_capacity(req.assets.len());

		for (idx, mut record) in req.assets.into_iter().enumerate() {
			validate_record(idx, &record, dim)?;

			record.payload.file_path = record.payload.file_path.trim().to_string();
			record.id = Some(record.resolved_id());

			records.push(record);
		}

		self.store.upsert(&records).await?;

		let ids: Vec<Uuid> = records.iter().filter_map(|record| record.id).collect();

		tracing::info!(count = ids.len(), "Indexed assets.");

		Ok(IndexAssetsResponse { upserted: ids.len(), ids })
	}
}

fn validate_record(idx: usize, record: &AssetRecord, dim: usize) -> Result<()> {
	if record.vector.len() != dim {
		return Err(Error::invalid(format!(
			"assets[{idx}].vector has {} dimensions; expected {dim}.",
			record.vector.len()
		)));
	}
	if record.vector.iter().any(|value| !value.is_finite()) {
		return Err(Error::invalid(format!("assets[{idx}].vector must contain only finite values.")));
	}
	if record.payload.file_path.trim().is_empty() {
		return Err(Error::invalid(format!("assets[{idx}].file_path must be non-empty.")));
	}
	if let Some(segment) = record.payload.segment
		&& !(segment.start.is_finite() && segment.end.is_finite() && segment.start <= segment.end)
	{
		return Err(Error::invalid(format!(
			"assets[{idx}].segment must have finite bounds with start <= end."
		)));
	}

	Ok(())
}
