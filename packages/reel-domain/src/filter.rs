use crate::asset::AssetPayload;

/// Metadata filter applied by the vector store.
///
/// Filters bias retrieval toward matching metadata. Tag and scene constraints are combined
/// with `Or`, so an asset passes when any branch matches.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
	/// The asset carries at least one of the tags.
	AnyOfTags(Vec<String>),
	/// The asset description contains the text.
	TextContains(String),
	/// At least one branch matches. An empty list matches everything.
	Or(Vec<FilterExpr>),
}
impl FilterExpr {
	/// Builds the OR filter for a tag set and a scene phrase. Returns `None` when neither is
	/// set. Inputs are expected to be trimmed and non-blank.
	pub fn from_parts(tags: Option<Vec<String>>, scene: Option<String>) -> Option<Self> {
		let mut branches = Vec::new();

		if let Some(tags) = tags.filter(|tags| !tags.is_empty()) {
			branches.push(Self::AnyOfTags(tags));
		}
		if let Some(scene) = scene {
			branches.push(Self::TextContains(scene));
		}

		match branches.len() {
			0 => None,
			1 => branches.pop(),
			_ => Some(Self::Or(branches)),
		}
	}

	pub fn matches(&self, payload: &AssetPayload) -> bool {
		match self {
			Self::AnyOfTags(tags) => tags.iter().any(|tag| payload.has_tag(tag)),
			Self::TextContains(text) => payload.description.contains(text.as_str()),
			Self::Or(branches) =>
				branches.is_empty() || branches.iter().any(|branch| branch.matches(payload)),
		}
	}
}
