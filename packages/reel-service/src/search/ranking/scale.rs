/// Converts a percent threshold to a native similarity floor. Non-positive thresholds mean
/// no floor.
pub fn percent_to_native(threshold: f32) -> Option<f32> {
	if threshold > 0.0 { Some(threshold / 100.0) } else { None }
}

/// Converts a native similarity to percent, rounded to two decimals. Out-of-range scores pass
/// through unclamped.
pub fn native_to_percent(score: f32) -> f64 {
	(f64::from(score) * 10_000.0).round() / 100.0
}
