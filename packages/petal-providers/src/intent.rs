use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Sends the classification conversation and returns the structured intent
/// JSON the model produced. Single attempt: a mangled payload is an error,
/// and the caller degrades instead of retrying.
pub async fn classify(cfg: &petal_config::IntentProviderConfig, messages: &[Value]) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_intent_json(json)
}

fn parse_intent_json(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(strip_code_fences(content))
			.map_err(|_| eyre::eyre!("Intent content is not valid JSON."))?;

		return Ok(parsed);
	}

	if json.is_object() {
		return Ok(json);
	}

	Err(eyre::eyre!("Intent response is missing JSON content."))
}

/// Models occasionally wrap the JSON payload in a markdown code fence.
fn strip_code_fences(content: &str) -> &str {
	let trimmed = content.trim();
	let trimmed = trimmed
		.strip_prefix("```json")
		.or_else(|| trimmed.strip_prefix("```"))
		.unwrap_or(trimmed);
	let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);

	trimmed.trim()
}
