use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use reel_config::EmbeddingProviderConfig;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	#[serde(default)]
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Encodes text queries through an OpenAI-compatible embeddings endpoint.
///
/// Returns exactly one vector per input text, in input order, each with `cfg.dimensions`
/// components.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let request = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let body = client
		.post(format!("{}{}", cfg.api_base, cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&request)
		.send()
		.await?
		.error_for_status()?
		.bytes()
		.await?;

	decode_embeddings(&body, texts.len(), cfg.dimensions as usize)
}

fn decode_embeddings(body: &[u8], expected: usize, dimensions: usize) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_slice(body)
		.map_err(|err| invalid_response(format!("Embedding response is malformed: {err}.")))?;

	if response.data.len() != expected {
		return Err(invalid_response(format!(
			"Encoder returned {} embeddings for {expected} inputs.",
			response.data.len()
		)));
	}

	let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];

	for (position, item) in response.data.into_iter().enumerate() {
		let index = item.index.unwrap_or(position);

		if index >= expected {
			return Err(invalid_response(format!(
				"Embedding index {index} is out of range for {expected} inputs."
			)));
		}
		if item.embedding.len() != dimensions {
			return Err(invalid_response(format!(
				"Embedding {index} has {} dimensions; expected {dimensions}.",
				item.embedding.len()
			)));
		}

		let slot = &mut slots[index];

		if slot.is_some() {
			return Err(invalid_response(format!("Embedding index {index} appears more than once.")));
		}

		*slot = Some(item.embedding);
	}

	// Count and uniqueness checks above leave every slot filled.
	Ok(slots.into_iter().flatten().collect())
}

fn invalid_response(message: String) -> Error {
	Error::InvalidResponse { message }
}
