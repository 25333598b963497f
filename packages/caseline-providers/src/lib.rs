pub mod ocr;
pub mod render;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};

fn request_headers(cfg: &caseline_config::ProviderConfig) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {}", cfg.api_key).parse()?);

	for (key, value) in &cfg.default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header {key} must be a string."));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
