use crate::{
	intent::SearchCriteria,
	product::{Product, combined_text},
};

/// Canonical display labels for well-known product types and attributes.
const LABELS: &[(&str, &str)] = &[
	("vegan", "Vegan"),
	("hydrating", "Hydrating"),
	("moisturizer", "Moisturizer"),
	("serum", "Serum"),
	("cleanser", "Cleanser"),
	("shampoo", "Shampoo"),
	("conditioner", "Conditioner"),
	("retinol", "Contains Retinol"),
	("sensitive skin", "For Sensitive Skin"),
	("oil-free", "Oil-Free"),
];

/// Short human-readable explanation of why a product matched the criteria,
/// e.g. `Matches: Serum, Vegan`. At most two labels are shown; further hits
/// collapse into a trailing ellipsis. `None` when nothing in the criteria
/// actually appears in the product text.
pub fn match_reason(product: &Product, criteria: &SearchCriteria) -> Option<String> {
	let text = combined_text(product);
	let mut reasons: Vec<String> = Vec::new();

	if let Some(product_type) = criteria.product_type.as_deref() {
		let lower = product_type.trim().to_lowercase();

		if !lower.is_empty() && text.contains(&lower) {
			reasons.push(label_for(&lower).unwrap_or(product_type).to_string());
		}
	}

	for attribute in &criteria.attributes {
		let lower = attribute.trim().to_lowercase();

		if lower.is_empty() || !text.contains(&lower) {
			continue;
		}

		let reason = label_for(&lower).unwrap_or(attribute);

		if !reasons.iter().any(|seen| seen.eq_ignore_ascii_case(reason)) {
			reasons.push(reason.to_string());
		}
	}

	if reasons.is_empty() {
		return None;
	}

	let ellipsis = if reasons.len() > 2 { "..." } else { "" };
	let displayed = reasons
		.iter()
		.take(2)
		.map(|reason| capitalize(reason))
		.collect::<Vec<_>>()
		.join(", ");

	Some(format!("Matches: {displayed}{ellipsis}"))
}

fn label_for(key: &str) -> Option<&'static str> {
	LABELS.iter().find(|(candidate, _)| *candidate == key).map(|(_, label)| *label)
}

fn capitalize(text: &str) -> String {
	let mut chars = text.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn product(name: &str, description: &str) -> Product {
		Product {
			name: name.to_string(),
			description: description.to_string(),
			brand: None,
			category: None,
			price: None,
			image: None,
			url: None,
			embedding: None,
		}
	}

	fn criteria(product_type: Option<&str>, attributes: &[&str]) -> SearchCriteria {
		SearchCriteria {
			product_type: product_type.map(str::to_string),
			attributes: attributes.iter().map(|attribute| attribute.to_string()).collect(),
		}
	}

	#[test]
	fn labels_type_and_attribute() {
		let item = product("Vegan Night Serum", "gentle formula");
		let reason = match_reason(&item, &criteria(Some("serum"), &["vegan"]));

		assert_eq!(reason.as_deref(), Some("Matches: Serum, Vegan"));
	}

	#[test]
	fn caps_at_two_with_ellipsis() {
		let item = product("Vegan Hydrating Serum", "contains retinol");
		let reason = match_reason(&item, &criteria(Some("serum"), &["vegan", "hydrating", "retinol"]));

		assert_eq!(reason.as_deref(), Some("Matches: Serum, Vegan..."));
	}

	#[test]
	fn skips_duplicate_labels() {
		let item = product("Vegan Serum", "plain");
		let reason = match_reason(&item, &criteria(Some("vegan"), &["vegan"]));

		assert_eq!(reason.as_deref(), Some("Matches: Vegan"));
	}

	#[test]
	fn unknown_terms_fall_back_to_the_raw_text_capitalized() {
		let item = product("Bamboo Brush", "sustainably sourced bamboo");
		let reason = match_reason(&item, &criteria(None, &["bamboo"]));

		assert_eq!(reason.as_deref(), Some("Matches: Bamboo"));
	}

	#[test]
	fn none_when_nothing_matches() {
		let item = product("Plain Soap", "simple");

		assert_eq!(match_reason(&item, &criteria(Some("serum"), &["vegan"])), None);
	}
}
