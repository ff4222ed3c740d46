pub mod ranking;
pub mod text;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use petal_config::Ranking;
use petal_domain::{
	filter,
	intent::SearchCriteria,
	product::{Product, combined_text},
	reason,
};

use crate::{PetalService, Result};

/// Externally visible search hit. Internal scoring components never leave
/// the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedProduct {
	pub name: String,
	pub description: String,
	pub brand: Option<String>,
	pub category: Option<String>,
	pub price: Option<String>,
	pub image: Option<String>,
	pub url: Option<String>,
	pub score: f32,
	pub match_reason: Option<String>,
}

/// Search results plus the mode that produced them, so callers can flag
/// degraded keyword-only responses.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
	pub products: Vec<RankedProduct>,
	pub semantic: bool,
}

struct Candidate<'a> {
	product: &'a Product,
	score: f32,
}

impl PetalService {
	/// Ranked product search over the current catalog snapshot. A missing
	/// query embedding, whatever the cause, degrades to keyword scoring
	/// instead of failing.
	pub async fn search(
		&self,
		query: &str,
		max_results: u32,
		criteria: &SearchCriteria,
	) -> Result<SearchOutcome> {
		let snapshot = self.current_catalog().await?;
		let cleaned = text::clean_query(query);
		let query_embedding = self.resolve_embedding(&cleaned).await;
		let semantic = query_embedding.is_some();
		let top_k =
			if max_results == 0 { self.cfg.search.top_k } else { max_results } as usize;
		let products = rank(
			&snapshot.products,
			&cleaned,
			query_embedding.as_deref(),
			criteria,
			top_k,
			&self.cfg.ranking,
			self.cfg.search.base_threshold,
		);

		Ok(SearchOutcome { products, semantic })
	}
}

/// Pure ranking core: scores, gates on attributes, thresholds (semantic mode
/// only), sorts, and deduplicates. Catalog order breaks score ties.
pub fn rank(
	products: &[Product],
	cleaned_query: &str,
	query_embedding: Option<&[f32]>,
	criteria: &SearchCriteria,
	top_k: usize,
	weights: &Ranking,
	base_threshold: f32,
) -> Vec<RankedProduct> {
	if products.is_empty() || cleaned_query.is_empty() || top_k == 0 {
		return Vec::new();
	}

	let semantic = query_embedding.is_some();
	let mut candidates = match query_embedding {
		Some(query_vec) => score_semantic(products, cleaned_query, query_vec, weights),
		None => score_keyword(products, cleaned_query),
	};

	if candidates.is_empty() {
		return Vec::new();
	}

	let required: Vec<String> = criteria
		.attributes
		.iter()
		.map(|attribute| attribute.trim().to_string())
		.filter(|attribute| !attribute.is_empty())
		.collect();

	if !required.is_empty() {
		candidates.retain(|candidate| filter::matches_all_attributes(candidate.product, &required));

		// The attribute gate is a hard precision filter, an empty pass-set
		// is a real "no results", not a reason to loosen.
		if candidates.is_empty() {
			return Vec::new();
		}
	}

	candidates.sort_by(|a, b| ranking::cmp_f32_desc(a.score, b.score));

	if semantic {
		let scores: Vec<f32> = candidates.iter().map(|candidate| candidate.score).collect();
		let threshold = ranking::dynamic_threshold(&scores, base_threshold);
		// Never thin a non-empty attribute-matched set down to nothing.
		if candidates.iter().any(|candidate| candidate.score >= threshold) {
			candidates.retain(|candidate| candidate.score >= threshold);
		}
	}

	dedupe_and_finish(candidates, criteria, top_k)
}

fn score_semantic<'a>(
	products: &'a [Product],
	cleaned_query: &str,
	query_vec: &[f32],
	weights: &Ranking,
) -> Vec<Candidate<'a>> {
	let mut skipped = 0_usize;
	let candidates = products
		.iter()
		.filter_map(|product| {
			let Some(embedding) = product.embedding.as_deref() else {
				skipped += 1;

				return None;
			};

			if embedding.len() != query_vec.len() {
				skipped += 1;

				return None;
			}

			let similarity = ranking::cosine_similarity(query_vec, embedding);
			let text_score = text::blend_text_score(cleaned_query, &product.name);
			let score =
				weights.similarity_weight * similarity + weights.text_match_weight * text_score;

			Some(Candidate { product, score })
		})
		.collect();

	if skipped > 0 {
		debug!("Skipped {skipped} products without a usable embedding.");
	}

	candidates
}

fn score_keyword<'a>(products: &'a [Product], cleaned_query: &str) -> Vec<Candidate<'a>> {
	products
		.iter()
		.filter_map(|product| {
			let score = text::keyword_score(cleaned_query, &combined_text(product));

			(score > text::KEYWORD_CUTOFF).then_some(Candidate { product, score })
		})
		.collect()
}

/// Scans the ranked candidates until `top_k` unique `(name, brand)` keys are
/// collected. First occurrence wins.
fn dedupe_and_finish(
	candidates: Vec<Candidate<'_>>,
	criteria: &SearchCriteria,
	top_k: usize,
) -> Vec<RankedProduct> {
	let mut seen = HashSet::new();
	let mut results = Vec::new();

	for candidate in candidates {
		let product = candidate.product;
		let key = (
			product.name.to_lowercase(),
			product.brand.as_deref().unwrap_or("").to_lowercase(),
		);

		if !seen.insert(key) {
			continue;
		}

		results.push(RankedProduct {
			name: product.name.clone(),
			description: product.description.clone(),
			brand: product.brand.clone(),
			category: product.category.clone(),
			price: product.price.clone(),
			image: product.image.clone(),
			url: product.url.clone(),
			score: candidate.score,
			match_reason: reason::match_reason(product, criteria),
		});

		if results.len() >= top_k {
			break;
		}
	}

	results
}

#[cfg(test)]
mod tests {
	use petal_testkit::{product_with_embedding, product_without_embedding};

	use super::*;

	fn no_criteria() -> SearchCriteria {
		SearchCriteria::default()
	}

	#[test]
	fn empty_inputs_return_empty() {
		let products = vec![product_without_embedding("Serum", "plain")];

		assert!(rank(&[], "serum", None, &no_criteria(), 5, &Ranking::default(), 0.4).is_empty());
		assert!(rank(&products, "", None, &no_criteria(), 5, &Ranking::default(), 0.4).is_empty());
	}

	#[test]
	fn threshold_fallback_keeps_a_weak_but_nonempty_set() {
		// Similarities land well below the base threshold; the set must
		// survive anyway.
		let products = vec![
			product_with_embedding("Lip Balm", "tinted balm", vec![0.1, 0.99, 0.]),
			product_with_embedding("Hand Cream", "rich cream", vec![0., 0.99, 0.1]),
		];
		let query_vec = [1.0_f32, 0., 0.];
		let ranked = rank(
			&products,
			"gift",
			Some(&query_vec),
			&no_criteria(),
			5,
			&Ranking::default(),
			0.4,
		);

		assert_eq!(ranked.len(), 2);
		assert_eq!(ranked[0].name, "Lip Balm");
	}

	#[test]
	fn keyword_cutoff_drops_marginal_matches() {
		// One of six tokens hits: 0.5 * 1/6 < 0.1 cutoff.
		let products = vec![product_without_embedding("Serum", "plain basic")];
		let ranked = rank(
			&products,
			"totally unrelated wishlist gadget overhaul serum",
			None,
			&no_criteria(),
			5,
			&Ranking::default(),
			0.4,
		);

		assert!(ranked.is_empty());
	}

	#[test]
	fn products_without_embeddings_are_skipped_in_semantic_mode() {
		let products = vec![
			product_without_embedding("Plain Serum", "no vector"),
			product_with_embedding("Vector Serum", "has vector", vec![1., 0., 0.]),
		];
		let query_vec = [1.0_f32, 0., 0.];
		let ranked = rank(
			&products,
			"serum",
			Some(&query_vec),
			&no_criteria(),
			5,
			&Ranking::default(),
			0.4,
		);

		assert_eq!(ranked.len(), 1);
		assert_eq!(ranked[0].name, "Vector Serum");
	}

	#[test]
	fn pipe_characters_do_not_conflate_distinct_products() {
		let branded = |name: &str, brand: &str| Product {
			name: name.to_string(),
			description: "limited holiday set".to_string(),
			brand: Some(brand.to_string()),
			category: None,
			price: None,
			image: None,
			url: None,
			embedding: None,
		};
		// Same characters, different (name, brand) split.
		let products = vec![branded("Gel|Mask", "Duo"), branded("Gel", "Mask|Duo")];
		let ranked = rank(
			&products,
			"holiday set",
			None,
			&no_criteria(),
			5,
			&Ranking::default(),
			0.4,
		);

		assert_eq!(ranked.len(), 2);
	}

	#[test]
	fn ties_preserve_catalog_order() {
		let products = vec![
			product_with_embedding("First Serum", "same", vec![1., 0., 0.]),
			product_with_embedding("Second Serum", "same", vec![1., 0., 0.]),
		];
		let query_vec = [1.0_f32, 0., 0.];
		let ranked = rank(
			&products,
			"facial care",
			Some(&query_vec),
			&no_criteria(),
			5,
			&Ranking::default(),
			0.4,
		);

		assert_eq!(ranked[0].name, "First Serum");
		assert_eq!(ranked[1].name, "Second Serum");
	}
}
