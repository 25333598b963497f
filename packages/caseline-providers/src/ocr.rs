use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Sends a stored document to the external recognition service and returns the extracted
/// text. The service reads the document bytes itself; only the object path travels.
pub async fn recognize(cfg: &caseline_config::ProviderConfig, document_path: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"document": document_path,
	});
	let res = client
		.post(url)
		.headers(crate::request_headers(cfg)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_recognize_response(json)
}

fn parse_recognize_response(json: Value) -> Result<String> {
	if let Some(text) = json.get("text").and_then(|v| v.as_str()) {
		return Ok(text.to_string());
	}

	// Page-wise responses carry an array; pages are concatenated in order.
	let pages = json
		.get("pages")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Recognition response is missing text and pages."))?;
	let mut out = String::new();

	for page in pages {
		let text = page
			.get("text")
			.and_then(|v| v.as_str())
			.ok_or_else(|| eyre::eyre!("Recognition page is missing text."))?;

		if !out.is_empty() {
			out.push('\n');
		}

		out.push_str(text);
	}

	Ok(out)
}
