use std::cmp::Ordering;

/// Factor of the standard deviation subtracted from the mean when deriving
/// the acceptance threshold. Empirically tuned, change only alongside a
/// re-validation of ranking behavior.
pub const SIGMA_FACTOR: f32 = 0.75;
/// Upper clamp for the dynamic threshold.
pub const THRESHOLD_CEILING: f32 = 0.8;
/// Below this many positive finite scores the statistics are meaningless
/// and the base threshold is used as-is.
pub const MIN_SCORES_FOR_STATS: usize = 5;

/// Cosine similarity that never fails: mismatched or empty vectors score 0,
/// non-finite components count as 0, and a zero norm yields 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.is_empty() || a.len() != b.len() {
		return 0.;
	}

	let mut dot = 0.;
	let mut norm_a = 0.;
	let mut norm_b = 0.;

	for (&x, &y) in a.iter().zip(b) {
		let x = if x.is_finite() { x } else { 0. };
		let y = if y.is_finite() { y } else { 0. };

		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0. || norm_b == 0. {
		return 0.;
	}

	let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());

	if similarity.is_finite() { similarity } else { 0. }
}

/// Acceptance cutoff adapted to the score distribution of the current
/// candidate set: `clamp(mean - 0.75 * stddev, base, 0.8)` over the strictly
/// positive finite scores.
pub fn dynamic_threshold(scores: &[f32], base_threshold: f32) -> f32 {
	let positive: Vec<f32> =
		scores.iter().copied().filter(|score| score.is_finite() && *score > 0.).collect();

	if positive.len() < MIN_SCORES_FOR_STATS {
		return base_threshold;
	}

	let count = positive.len() as f32;
	let mean = positive.iter().sum::<f32>() / count;
	let variance = positive.iter().map(|score| (score - mean).powi(2)).sum::<f32>() / count;
	let stddev = variance.sqrt();

	(mean - SIGMA_FACTOR * stddev).clamp(base_threshold, THRESHOLD_CEILING)
}

/// Descending float comparator that sinks NaN to the end, safe for a stable
/// sort.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
