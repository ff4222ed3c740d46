use serde::{Deserialize, Serialize};
use tracing::warn;

use petal_domain::intent::{ChatTurn, QueryType, SearchCriteria};
use petal_storage::cache::cache_key;

use crate::{Error, PetalService, Result, search::RankedProduct};

const GENERIC_FAILURE: &str =
	"Sorry, I could not process that request right now. Please try again in a moment.";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
	pub query: String,
	/// Caller identity for rate limiting, typically a session id.
	pub identifier: String,
	#[serde(default)]
	pub history: Vec<ChatTurn>,
}

/// Final conversational payload. `error` is the explicit degraded-path flag
/// that distinguishes a failure from a genuinely empty result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
	pub text: String,
	pub query_type: QueryType,
	pub search_criteria_used: SearchCriteria,
	pub products: Vec<RankedProduct>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl PetalService {
	/// One conversation turn end to end: rate limit, response cache, intent
	/// classification, optional product search, reply assembly. Search-time
	/// failures degrade into the reply text; they never abort the turn.
	pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
		let query = request.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty".to_string() });
		}
		if self.rate_limiter.is_limited(&request.identifier).await {
			return Err(Error::RateLimited { identifier: request.identifier.clone() });
		}

		let response_key = cache_key("response", query);

		// History-bearing turns are conversational, only bare queries are
		// safe to replay from cache.
		if request.history.is_empty()
			&& let Some(cached) = self.response_cache.get(&response_key).await
		{
			return Ok(cached);
		}

		let intent = match self.classify_intent(query, &request.history).await {
			Ok(intent) => intent,
			Err(err) => {
				warn!("Intent classification failed: {err}.");

				return Ok(ChatResponse {
					text: GENERIC_FAILURE.to_string(),
					query_type: QueryType::Unknown,
					search_criteria_used: SearchCriteria::default(),
					products: Vec::new(),
					error: Some("intent_unavailable".to_string()),
				});
			},
		};
		let mut response = ChatResponse {
			text: intent.text.clone(),
			query_type: intent.query_type,
			search_criteria_used: intent.search_criteria.clone(),
			products: Vec::new(),
			error: None,
		};

		if intent.query_type.is_search() {
			match self.search(query, intent.max_results, &intent.search_criteria).await {
				Ok(outcome) => {
					response.products = outcome.products;
					response.text.push_str(&results_note(&response, &intent.search_criteria));

					if !response.products.is_empty() && !outcome.semantic {
						response.text.push_str(
							"\n\nUsing keyword search due to high demand. Results may be less precise.",
						);
					}
				},
				Err(err) => {
					warn!("Product search failed: {err}.");

					response.text.push_str(" (Issue during product search.)");
					response.error = Some("search_unavailable".to_string());
				},
			}
		}

		if request.history.is_empty() && response.error.is_none() {
			self.response_cache
				.put(&response_key, response.clone(), self.cfg.cache.response_ttl_seconds)
				.await;
		}

		Ok(response)
	}
}

fn results_note(response: &ChatResponse, criteria: &SearchCriteria) -> String {
	let count = response.products.len();

	if count == 0 {
		return "\n\nNo products found matching your request. Try broadening your search!"
			.to_string();
	}

	let plural = if count > 1 { "s" } else { "" };
	let subject = criteria.product_type.as_deref().unwrap_or("products");
	let qualifier = if criteria.attributes.is_empty() {
		String::new()
	} else {
		format!(" with {}", criteria.attributes.join(", "))
	};

	format!("\n\nFound {count} product{plural} based on your request for {subject}{qualifier}.")
}
