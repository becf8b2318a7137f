use std::{
	cmp::Ordering,
	collections::BTreeMap,
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use reel_domain::{AssetRecord, cosine_similarity};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{ScoredAsset, VectorQuery},
};

/// In-process asset collection scored by brute-force cosine similarity.
///
/// Mirrors the Qdrant adapter's query semantics so the service can be exercised without a
/// running store.
#[derive(Debug)]
pub struct MemoryStore {
	vector_dim: u32,
	records: RwLock<BTreeMap<Uuid, AssetRecord>>,
}
impl MemoryStore {
	pub fn new(vector_dim: u32) -> Self {
		Self { vector_dim, records: RwLock::new(BTreeMap::new()) }
	}

	pub fn vector_dim(&self) -> u32 {
		self.vector_dim
	}

	pub fn len(&self) -> usize {
		self.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.read().is_empty()
	}

	pub fn upsert(&self, records: &[AssetRecord]) -> Result<()> {
		for record in records {
			self.check_dim(record.vector.len())?;
		}

		let mut guard = self.write();

		for record in records {
			let id = record.resolved_id();
			let mut stored = record.clone();

			stored.id = Some(id);

			guard.insert(id, stored);
		}

		Ok(())
	}

	pub fn query(&self, query: &VectorQuery) -> Result<Vec<ScoredAsset>> {
		self.check_dim(query.vector.len())?;

		let guard = self.read();
		let mut scored: Vec<ScoredAsset> = guard
			.iter()
			.filter(|(_, record)| {
				query.filter.as_ref().is_none_or(|filter| filter.matches(&record.payload))
			})
			.map(|(id, record)| ScoredAsset {
				id: *id,
				score: cosine_similarity(&query.vector, &record.vector),
				vector: record.vector.clone(),
				payload: record.payload.clone(),
			})
			.filter(|asset| query.score_threshold.is_none_or(|floor| asset.score >= floor))
			.collect();

		scored.sort_by(|left, right| {
			right.score.partial_cmp(&left.score).unwrap_or(Ordering::Equal).then(left.id.cmp(&right.id))
		});
		scored.truncate(query.limit as usize);

		Ok(scored)
	}

	fn check_dim(&self, len: usize) -> Result<()> {
		if len != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Vector has {len} dimensions; collection expects {}.",
				self.vector_dim
			)));
		}

		Ok(())
	}

	fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Uuid, AssetRecord>> {
		self.records.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Uuid, AssetRecord>> {
		self.records.write().unwrap_or_else(|err| err.into_inner())
	}
}
