use serde::{Deserialize, Serialize};

use petal_config::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectMissingName,
	RejectMissingDescription,
	RejectBadEmbedding,
}

/// Raw catalog record as delivered by a catalog source, before ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInput {
	pub name: String,
	pub description: String,
	#[serde(default)]
	pub brand: Option<String>,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub price: Option<String>,
	#[serde(default)]
	pub image: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
	pub name: String,
	pub description: String,
	pub brand: Option<String>,
	pub category: Option<String>,
	pub price: Option<String>,
	pub image: Option<String>,
	pub url: Option<String>,
	/// Fixed-dimensionality vector; absent products still participate in
	/// keyword fallback.
	pub embedding: Option<Vec<f32>>,
}

/// Validates and normalizes one raw record. A product with no embedding
/// passes through; a present embedding with the wrong dimensionality or a
/// non-finite component rejects the whole record.
pub fn ingest(input: ProductInput, catalog: &Catalog, dimensions: u32) -> Result<Product, RejectCode> {
	let name = input.name.trim();

	if name.is_empty() {
		return Err(RejectCode::RejectMissingName);
	}

	let description = input.description.trim();

	if description.is_empty() {
		return Err(RejectCode::RejectMissingDescription);
	}

	let embedding = match input.embedding {
		None => None,
		Some(vec) => {
			if vec.len() != dimensions as usize || !vec.iter().all(|value| value.is_finite()) {
				return Err(RejectCode::RejectBadEmbedding);
			}

			Some(vec)
		},
	};

	Ok(Product {
		name: truncate(name, catalog.max_name_chars as usize),
		description: truncate(description, catalog.max_description_chars as usize),
		brand: input
			.brand
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.map(|value| truncate(value, catalog.max_name_chars as usize)),
		category: input
			.category
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.map(|value| value.to_string()),
		price: input
			.price
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.map(|value| value.to_string()),
		image: input.image.as_deref().and_then(|raw| normalize_url(raw, catalog)),
		url: input.url.as_deref().and_then(|raw| normalize_url(raw, catalog)),
		embedding,
	})
}

/// Normalizes a product URL, handle, or slug to an absolute https URL.
/// Returns `None` for anything unrecognizable rather than storing bad data.
pub fn normalize_url(raw: &str, catalog: &Catalog) -> Option<String> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return None;
	}

	let max_chars = catalog.max_url_chars as usize;
	let trimmed = truncate(trimmed, max_chars * 2);
	let lower = trimmed.to_lowercase();

	if lower.starts_with("http://") || lower.starts_with("https://") {
		let upgraded = if lower.starts_with("http://") {
			format!("https://{}", &trimmed[7..])
		} else {
			trimmed
		};

		if upgraded.chars().any(|ch| matches!(ch, '<' | '>' | '"' | '\'') || ch.is_whitespace()) {
			return None;
		}

		return Some(truncate(&upgraded, max_chars));
	}
	if trimmed.starts_with('/') {
		return Some(truncate(&format!("{}{trimmed}", catalog.base_url), max_chars));
	}
	if trimmed.len() < 100
		&& !trimmed.chars().any(|ch| ch.is_whitespace() || matches!(ch, '/' | '.'))
	{
		// Bare product slug.
		return Some(truncate(&format!("{}/products/{trimmed}", catalog.base_url), max_chars));
	}

	None
}

/// All searchable text of a product, lower-cased, used by the attribute
/// filter, the keyword scorer, and the match-reason generator.
pub fn combined_text(product: &Product) -> String {
	format!(
		"{} {} {} {}",
		product.name,
		product.description,
		product.brand.as_deref().unwrap_or(""),
		product.category.as_deref().unwrap_or(""),
	)
	.to_lowercase()
}

fn truncate(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	text.chars().take(max_chars).collect()
}
