use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for content-addressed asset ids.
pub const ASSET_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1d_2b0a_83c4_5e79_a1d0_4c2e_97b3_58f6);

/// Position of an asset inside its source file, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
	pub start: f64,
	pub end: f64,
	pub index: u32,
}

/// Metadata stored next to an asset vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetPayload {
	pub file_path: String,
	#[serde(default)]
	pub canonical_path: Option<String>,
	#[serde(default)]
	pub shot_id: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub emotions: Vec<String>,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub duration: f64,
	#[serde(default)]
	pub segment: Option<Segment>,
}
impl AssetPayload {
	/// Path used for id derivation. Falls back to the raw file path.
	pub fn identity_path(&self) -> &str {
		self.canonical_path
			.as_deref()
			.filter(|path| !path.trim().is_empty())
			.unwrap_or(self.file_path.as_str())
	}

	pub fn segment_index(&self) -> u32 {
		self.segment.map(|segment| segment.index).unwrap_or(0)
	}

	pub fn has_tag(&self, tag: &str) -> bool {
		self.tags.iter().any(|candidate| candidate == tag)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
	#[serde(default)]
	pub id: Option<Uuid>,
	pub vector: Vec<f32>,
	#[serde(flatten)]
	pub payload: AssetPayload,
}
impl AssetRecord {
	/// Explicit id when present, otherwise the content-addressed one.
	pub fn resolved_id(&self) -> Uuid {
		self.id
			.unwrap_or_else(|| asset_id(self.payload.identity_path(), self.payload.segment_index()))
	}
}

/// Stable id for one sub-segment of a source file.
pub fn asset_id(canonical_path: &str, segment_index: u32) -> Uuid {
	let name = format!("{canonical_path}#{segment_index}");

	Uuid::new_v5(&ASSET_ID_NAMESPACE, name.as_bytes())
}
