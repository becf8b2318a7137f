use reel_domain::cosine_similarity;

use crate::search::ranking::Candidate;

#[derive(Clone, Copy)]
struct DiversityPick {
	position: usize,
	mmr_score: f32,
}
impl DiversityPick {
	fn better_than(self, other: &Self) -> bool {
		self.mmr_score > other.mmr_score
			|| (self.mmr_score == other.mmr_score && self.position < other.position)
	}
}

/// Greedy Maximal Marginal Relevance selection over relevance-sorted candidates.
///
/// Returns the input unchanged when it already fits in `top_k`. Otherwise the most relevant
/// candidate seeds the selection and each later pick maximizes
/// `lambda * relevance - (1 - lambda) * max_similarity_to_selected`, with ties going to the
/// earlier position. Redundancy is floored at zero, so opposing vectors earn no bonus.
pub fn select_diverse(candidates: Vec<Candidate>, top_k: u32, lambda: f32) -> Vec<Candidate> {
	let limit = top_k as usize;

	if candidates.len() <= limit {
		return candidates;
	}
	if limit == 0 {
		return Vec::new();
	}

	let mut selected = vec![0_usize];
	let mut is_selected = vec![false; candidates.len()];

	is_selected[0] = true;

	while selected.len() < limit {
		let mut best: Option<DiversityPick> = None;

		for (position, candidate) in candidates.iter().enumerate() {
			if is_selected[position] {
				continue;
			}

			let redundancy = selected
				.iter()
				.map(|idx| cosine_similarity(&candidate.asset.vector, &candidates[*idx].asset.vector))
				.fold(0.0, f32::max);
			let pick = DiversityPick {
				position,
				mmr_score: lambda * candidate.relevance() - (1.0 - lambda) * redundancy,
			};

			if best.is_none_or(|current| pick.better_than(&current)) {
				best = Some(pick);
			}
		}

		let Some(best) = best else { break };

		is_selected[best.position] = true;

		selected.push(best.position);
	}

	tracing::debug!(candidates = candidates.len(), selected = selected.len(), lambda, "Applied MMR.");

	let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();

	selected.into_iter().filter_map(|idx| slots[idx].take()).collect()
}
