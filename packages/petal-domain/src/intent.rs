use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntentError {
	#[error("Intent response is missing a usable \"text\" field.")]
	MissingText,
	#[error("Intent response carries an unknown query_type, {0:?}.")]
	UnknownQueryType(String),
	#[error("Intent response field {0} has the wrong shape.")]
	MalformedField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
	Product,
	List,
	Informational,
	ClarificationNeeded,
	Unknown,
}
impl QueryType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Product => "product",
			Self::List => "list",
			Self::Informational => "informational",
			Self::ClarificationNeeded => "clarification_needed",
			Self::Unknown => "unknown",
		}
	}

	pub fn parse(raw: &str) -> Result<Self, IntentError> {
		match raw {
			"product" => Ok(Self::Product),
			"list" => Ok(Self::List),
			"informational" => Ok(Self::Informational),
			"clarification_needed" => Ok(Self::ClarificationNeeded),
			"unknown" => Ok(Self::Unknown),
			other => Err(IntentError::UnknownQueryType(other.to_string())),
		}
	}

	/// Only these intents drive catalog retrieval.
	pub fn is_search(&self) -> bool {
		matches!(self, Self::Product | Self::List)
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
	#[serde(default)]
	pub product_type: Option<String>,
	#[serde(default)]
	pub attributes: Vec<String>,
}

/// Intent extracted from one user message, already validated for shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredIntent {
	/// Rewritten standalone search text.
	pub text: String,
	pub query_type: QueryType,
	pub search_criteria: SearchCriteria,
	pub max_results: u32,
}
impl StructuredIntent {
	/// Validates the raw JSON an intent model produced. Anything that does
	/// not carry a non-empty text and a recognized query type is rejected so
	/// the caller can fall back to treating the raw message as the query.
	pub fn from_value(value: &Value, default_top_k: u32) -> Result<Self, IntentError> {
		let text = value
			.get("text")
			.and_then(Value::as_str)
			.map(str::trim)
			.filter(|text| !text.is_empty())
			.ok_or(IntentError::MissingText)?;
		let query_type = value
			.get("query_type")
			.and_then(Value::as_str)
			.ok_or(IntentError::MalformedField("query_type"))
			.and_then(QueryType::parse)?;
		let search_criteria = match value.get("search_criteria") {
			None | Some(Value::Null) => SearchCriteria::default(),
			Some(raw) => {
				let object = raw.as_object().ok_or(IntentError::MalformedField("search_criteria"))?;
				let product_type = object
					.get("product_type")
					.and_then(Value::as_str)
					.map(str::trim)
					.filter(|value| !value.is_empty())
					.map(str::to_string);
				let attributes = match object.get("attributes") {
					None | Some(Value::Null) => Vec::new(),
					Some(Value::Array(items)) => items
						.iter()
						.filter_map(Value::as_str)
						.map(str::trim)
						.filter(|item| !item.is_empty())
						.map(str::to_string)
						.collect(),
					Some(_) => return Err(IntentError::MalformedField("attributes")),
				};

				SearchCriteria { product_type, attributes }
			},
		};
		let max_results = match value.get("max_results").and_then(Value::as_u64) {
			Some(limit) if limit > 0 => limit.min(u32::MAX as u64) as u32,
			_ if query_type.is_search() => default_top_k,
			_ => 0,
		};

		Ok(Self { text: text.to_string(), query_type, search_criteria, max_results })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	User,
	Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
	pub role: Role,
	pub text: String,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn accepts_complete_intent() {
		let raw = json!({
			"text": "vegan hydrating serum",
			"query_type": "product",
			"search_criteria": { "product_type": "serum", "attributes": ["vegan", "hydrating"] },
			"max_results": 5,
		});
		let intent = StructuredIntent::from_value(&raw, 10).expect("parse failed");

		assert_eq!(intent.text, "vegan hydrating serum");
		assert_eq!(intent.query_type, QueryType::Product);
		assert_eq!(intent.search_criteria.product_type.as_deref(), Some("serum"));
		assert_eq!(intent.search_criteria.attributes, ["vegan", "hydrating"]);
		assert_eq!(intent.max_results, 5);
	}

	#[test]
	fn missing_max_results_falls_back_to_top_k_for_searches() {
		let raw = json!({ "text": "serums", "query_type": "list" });
		let intent = StructuredIntent::from_value(&raw, 10).expect("parse failed");

		assert_eq!(intent.max_results, 10);

		let raw = json!({ "text": "what is retinol", "query_type": "informational" });
		let intent = StructuredIntent::from_value(&raw, 10).expect("parse failed");

		assert_eq!(intent.max_results, 0);
	}

	#[test]
	fn rejects_empty_text() {
		let raw = json!({ "text": "  ", "query_type": "product" });

		assert_eq!(StructuredIntent::from_value(&raw, 10).unwrap_err(), IntentError::MissingText);
	}

	#[test]
	fn rejects_unknown_query_type() {
		let raw = json!({ "text": "serum", "query_type": "purchase" });

		assert!(matches!(
			StructuredIntent::from_value(&raw, 10),
			Err(IntentError::UnknownQueryType(_))
		));
	}

	#[test]
	fn rejects_non_array_attributes() {
		let raw = json!({
			"text": "serum",
			"query_type": "product",
			"search_criteria": { "attributes": "vegan" },
		});

		assert_eq!(
			StructuredIntent::from_value(&raw, 10).unwrap_err(),
			IntentError::MalformedField("attributes")
		);
	}

	#[test]
	fn missing_criteria_defaults_to_empty() {
		let raw = json!({ "text": "serum", "query_type": "product" });
		let intent = StructuredIntent::from_value(&raw, 10).expect("parse failed");

		assert!(intent.search_criteria.product_type.is_none());
		assert!(intent.search_criteria.attributes.is_empty());
	}
}
