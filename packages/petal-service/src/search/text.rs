/// Strong token-overlap hit between query and product name.
pub const OVERLAP_SCORE: f32 = 0.9;
/// Weaker hit: the whole query appears inside the product name.
pub const SUBSTRING_SCORE: f32 = 0.7;
/// Fraction of tokens that must match on either side for the overlap hit.
pub const OVERLAP_RATIO: f32 = 0.6;
/// Keyword-mode candidates at or below this score are discarded.
pub const KEYWORD_CUTOFF: f32 = 0.1;

const COMMAND_PREFIXES: &[&str] =
	&["find this product:", "search for:", "look up:", "find:", "get:", "show me:", "show:"];

/// Lowercases, trims, and drops one leading command-style prefix.
pub fn clean_query(query: &str) -> String {
	let mut cleaned = query.trim().to_lowercase();

	for prefix in COMMAND_PREFIXES {
		if let Some(stripped) = cleaned.strip_prefix(prefix) {
			cleaned = stripped.trim().to_string();

			break;
		}
	}

	cleaned
}

/// Lexical component of the semantic blend, scored against the product name
/// only. Returns 0.9 on a strong token overlap, 0.7 on a whole-query
/// substring hit, 0 otherwise.
pub fn blend_text_score(cleaned_query: &str, product_name: &str) -> f32 {
	if cleaned_query.is_empty() {
		return 0.;
	}

	let name_lower = product_name.to_lowercase();
	let query_tokens: Vec<&str> = cleaned_query.split_whitespace().collect();
	let name_tokens: Vec<&str> = name_lower.split_whitespace().collect();

	if !query_tokens.is_empty() && !name_tokens.is_empty() {
		let matched =
			query_tokens.iter().filter(|token| name_tokens.contains(token)).count() as f32;

		if matched / query_tokens.len() as f32 > OVERLAP_RATIO
			|| matched / name_tokens.len() as f32 > OVERLAP_RATIO
		{
			return OVERLAP_SCORE;
		}
	}
	if name_lower.contains(cleaned_query) {
		return SUBSTRING_SCORE;
	}

	0.
}

/// Keyword-fallback score over the product's combined text: half weight on
/// an exact-phrase hit, half on the fraction of query tokens present.
/// Single-character tokens are ignored.
pub fn keyword_score(cleaned_query: &str, combined_text: &str) -> f32 {
	let tokens: Vec<&str> =
		cleaned_query.split_whitespace().filter(|token| token.chars().count() > 1).collect();

	if tokens.is_empty() {
		return 0.;
	}

	let matched = tokens.iter().filter(|token| combined_text.contains(**token)).count() as f32;
	let mut score = 0.5 * (matched / tokens.len() as f32);

	if combined_text.contains(cleaned_query) {
		score += 0.5;
	}

	score
}
