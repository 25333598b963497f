use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
	pub path: String,
	pub thumbnail_path: Option<String>,
}

/// Asks the external rendering service to turn message HTML into a stored PDF plus
/// thumbnail and returns where it put them.
pub async fn render(cfg: &caseline_config::ProviderConfig, html: &str) -> Result<RenderedDocument> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"html": html,
	});
	let res = client
		.post(url)
		.headers(crate::request_headers(cfg)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_render_response(json)
}

fn parse_render_response(json: Value) -> Result<RenderedDocument> {
	let path = json
		.get("path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| eyre::eyre!("Render response is missing the document path."))?;
	let thumbnail_path =
		json.get("thumbnail_path").and_then(|v| v.as_str()).map(str::to_string);

	Ok(RenderedDocument { path: path.to_string(), thumbnail_path })
}
