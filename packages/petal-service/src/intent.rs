use serde_json::{Value, json};

use petal_domain::intent::{ChatTurn, Role, StructuredIntent};

use crate::{Error, PetalService, Result};

const SYSTEM_PROMPT: &str = "\
You are the intent classifier for a beauty retail shopping assistant. \
Classify the user's latest message and respond with a single JSON object, no \
prose and no markdown, with exactly these fields:
- \"text\": a short conversational reply, or the standalone search phrase.
- \"query_type\": one of \"product\" (a specific item), \"list\" (a set of \
recommendations), \"informational\" (advice, how-to, policy questions), \
\"clarification_needed\" (too vague to search), \"unknown\".
- \"search_criteria\": {\"product_type\": string or null, \"attributes\": \
array of lowercase strings such as \"vegan\" or \"oil-free\"}.
- \"max_results\": how many products to return, 0 when not a search.";

impl PetalService {
	/// Classifies one user message against the short conversation history.
	/// The call draws on the same daily budget as embedding calls. A
	/// structurally invalid classification is an error; retrieval must never
	/// run against garbage criteria.
	pub async fn classify_intent(
		&self,
		query: &str,
		history: &[ChatTurn],
	) -> Result<StructuredIntent> {
		if self.quota.is_exhausted().await {
			return Err(Error::Intent {
				message: "Daily provider call budget is exhausted.".to_string(),
			});
		}

		// Counted before the call goes out so a failure cannot undercount.
		self.quota.record_call().await;

		let cfg = &self.cfg.providers.intent;
		let messages = build_messages(query, history, cfg.max_history_turns as usize);
		let raw = self
			.providers
			.intent
			.classify(cfg, &messages)
			.await
			.map_err(|err| Error::Intent { message: err.to_string() })?;

		StructuredIntent::from_value(&raw, self.cfg.search.top_k)
			.map_err(|err| Error::Intent { message: err.to_string() })
	}
}

/// Chat-completion message list: system prompt, the last N history turns,
/// then the current query.
pub fn build_messages(query: &str, history: &[ChatTurn], max_history_turns: usize) -> Vec<Value> {
	let mut messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];
	let keep_from = history.len().saturating_sub(max_history_turns * 2);

	for turn in &history[keep_from..] {
		let role = match turn.role {
			Role::User => "user",
			Role::Model => "assistant",
		};

		messages.push(json!({ "role": role, "content": turn.text }));
	}

	messages.push(json!({ "role": "user", "content": query }));

	messages
}

#[cfg(test)]
mod tests {
	use super::*;

	fn turn(role: Role, text: &str) -> ChatTurn {
		ChatTurn { role, text: text.to_string() }
	}

	#[test]
	fn history_is_trimmed_to_the_most_recent_turns() {
		let history = vec![
			turn(Role::User, "one"),
			turn(Role::Model, "two"),
			turn(Role::User, "three"),
			turn(Role::Model, "four"),
		];
		let messages = build_messages("latest", &history, 1);

		assert_eq!(messages.len(), 4);
		assert_eq!(messages[1]["content"], "three");
		assert_eq!(messages[2]["role"], "assistant");
		assert_eq!(messages[3]["content"], "latest");
	}

	#[test]
	fn empty_history_yields_prompt_and_query() {
		let messages = build_messages("hello", &[], 3);

		assert_eq!(messages.len(), 2);
		assert_eq!(messages[0]["role"], "system");
		assert_eq!(messages[1]["role"], "user");
	}
}
