use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use time::OffsetDateTime;
use tokio::time as tokio_time;

use caseline_config::{Config, ManagementNo, Postgres, ProviderConfig, Service, Storage, Sync};
use caseline_domain::message::{IncomingMessage, MessageContent};
use caseline_providers::render::RenderedDocument;
use caseline_service::{BoxFuture, CaseService, OcrProvider, Providers, RenderProvider};
use caseline_storage::db::Db;
use caseline_testkit::TestDatabase;

pub struct StubOcr {
	pub text: String,
}
impl OcrProvider for StubOcr {
	fn recognize<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_document_path: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		let text = self.text.clone();

		Box::pin(async move { Ok(text) })
	}
}

pub struct SpyOcr {
	pub text: String,
	pub calls: Arc<AtomicUsize>,
}
impl OcrProvider for SpyOcr {
	fn recognize<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_document_path: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let text = self.text.clone();

		Box::pin(async move { Ok(text) })
	}
}

pub struct SlowOcr {
	pub delay_ms: u64,
}
impl OcrProvider for SlowOcr {
	fn recognize<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_document_path: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		let delay = Duration::from_millis(self.delay_ms);

		Box::pin(async move {
			tokio_time::sleep(delay).await;

			Ok("too late".to_string())
		})
	}
}

pub struct StubRender;
impl RenderProvider for StubRender {
	fn render<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_html: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<RenderedDocument>> {
		Box::pin(async move {
			Ok(RenderedDocument {
				path: "rendered/mail.pdf".to_string(),
				thumbnail_path: Some("rendered/mail-thumb.png".to_string()),
			})
		})
	}
}

pub fn test_config(dsn: String) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn, pool_max_conns: 2 } },
		sync: Sync {
			lease_seconds: 300,
			batch_size: 20,
			poll_interval_ms: 100,
			match_prefix_chars: 100,
			ocr_timeout_ms: 5_000,
		},
		management_no: ManagementNo { initial_width: 5, label: "Case No.".to_string() },
		providers: caseline_config::Providers {
			ocr: dummy_provider(),
			render: dummy_provider(),
		},
	}
}

pub fn dummy_provider() -> ProviderConfig {
	ProviderConfig {
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/".to_string(),
		timeout_ms: 1_000,
		default_headers: serde_json::Map::new(),
	}
}

pub async fn build_service(cfg: Config, providers: Providers) -> CaseService {
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(cfg.management_no.initial_width).await.expect("Failed to ensure schema.");

	CaseService::with_providers(cfg, db, providers)
}

pub async fn test_db() -> Option<TestDatabase> {
	let base_dsn = caseline_testkit::env_dsn()?;

	Some(TestDatabase::new(&base_dsn).await.expect("Failed to create test database."))
}

pub async fn seed_customer(
	service: &CaseService,
	id: &str,
	name: &str,
	mail_aliases: &[&str],
	fax_aliases: &[&str],
	name_aliases: &[&str],
) {
	sqlx::query(
		"\
INSERT INTO customers (customer_id, name, mail_aliases, fax_aliases, name_aliases, sort_order)
VALUES ($1, $2, $3, $4, $5, 0)",
	)
	.bind(id)
	.bind(name)
	.bind(mail_aliases.iter().map(|s| s.to_string()).collect::<Vec<_>>())
	.bind(fax_aliases.iter().map(|s| s.to_string()).collect::<Vec<_>>())
	.bind(name_aliases.iter().map(|s| s.to_string()).collect::<Vec<_>>())
	.execute(&service.db.pool)
	.await
	.expect("Failed to seed customer.");
}

pub fn fax_message(id: &str, subject: &str) -> IncomingMessage {
	IncomingMessage {
		id: id.to_string(),
		subject: subject.to_string(),
		sender: "03-1234-5678".to_string(),
		recipient: "office".to_string(),
		received_at: OffsetDateTime::UNIX_EPOCH,
		snippet: "incoming fax".to_string(),
		content: MessageContent::Fax { ocr: None },
		attachment_paths: vec![format!("cases/{id}/page-1.tiff")],
		primary_document_path: Some(format!("cases/{id}/original.pdf")),
		primary_document_thumbnail_path: Some(format!("cases/{id}/original-thumb.png")),
	}
}

pub fn mail_message(id: &str, subject: &str, plain: &str) -> IncomingMessage {
	IncomingMessage {
		id: id.to_string(),
		subject: subject.to_string(),
		sender: "customer@example.com".to_string(),
		recipient: "office@example.com".to_string(),
		received_at: OffsetDateTime::UNIX_EPOCH,
		snippet: plain.chars().take(40).collect(),
		content: MessageContent::Mail { plain: plain.to_string(), html: String::new() },
		attachment_paths: Vec::new(),
		primary_document_path: None,
		primary_document_thumbnail_path: None,
	}
}
