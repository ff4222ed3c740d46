use crate::product::{Product, combined_text};

/// Static synonym table consulted when an attribute has no direct substring
/// hit. Keys and values are lower-case.
const SYNONYMS: &[(&str, &[&str])] = &[
	("hydrating", &["moisturizing", "hydration"]),
	("vegan", &["plant-based"]),
	("fragrance-free", &["unscented", "no fragrance"]),
	("oil-free", &["non-greasy"]),
];

/// AND-matching over required attributes. Vacuously true when the list is
/// empty; a single missed attribute rejects the product. Attributes gate,
/// scores rank.
pub fn matches_all_attributes(product: &Product, attributes: &[String]) -> bool {
	if attributes.is_empty() {
		return true;
	}

	let text = combined_text(product);

	attributes
		.iter()
		.map(|attribute| attribute.trim().to_lowercase())
		.filter(|attribute| !attribute.is_empty())
		.all(|attribute| {
			text.contains(&attribute)
				|| SYNONYMS
					.iter()
					.find(|(key, _)| *key == attribute)
					.is_some_and(|(_, alternates)| {
						alternates.iter().any(|alternate| text.contains(alternate))
					})
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn product(name: &str, description: &str) -> Product {
		Product {
			name: name.to_string(),
			description: description.to_string(),
			brand: Some("Glow Labs".to_string()),
			category: Some("Skincare".to_string()),
			price: None,
			image: None,
			url: None,
			embedding: None,
		}
	}

	#[test]
	fn empty_attribute_list_matches_everything() {
		assert!(matches_all_attributes(&product("Serum", "plain"), &[]));
	}

	#[test]
	fn all_attributes_must_hit() {
		let item = product("Vegan Night Serum", "hydrating formula for dry skin");

		assert!(matches_all_attributes(
			&item,
			&["vegan".to_string(), "hydrating".to_string()]
		));
		assert!(!matches_all_attributes(
			&item,
			&["vegan".to_string(), "oil-free".to_string()]
		));
	}

	#[test]
	fn matching_is_case_insensitive() {
		let item = product("Night Serum", "VEGAN formula");

		assert!(matches_all_attributes(&item, &["Vegan".to_string()]));
	}

	#[test]
	fn synonyms_rescue_a_miss() {
		let item = product("Night Cream", "deeply moisturizing formula");

		assert!(matches_all_attributes(&item, &["hydrating".to_string()]));
	}

	#[test]
	fn blank_attributes_are_skipped() {
		let item = product("Serum", "plain");

		assert!(matches_all_attributes(&item, &["  ".to_string()]));
	}
}
