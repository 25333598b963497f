use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub sync: Sync,
	pub management_no: ManagementNo,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Sync {
	/// Lock window for the message lease. A row whose `processing_at` is older than this is
	/// eligible for re-claim.
	pub lease_seconds: i64,
	pub batch_size: i64,
	pub poll_interval_ms: i64,
	/// Length of the high-signal prefix used by the first customer-matching pass.
	pub match_prefix_chars: usize,
	pub ocr_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ManagementNo {
	/// Digit width the counter is seeded with. The width only ever grows.
	pub initial_width: u32,
	/// Label preceding an explicit code token in message text.
	pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub ocr: ProviderConfig,
	pub render: ProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
