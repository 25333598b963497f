pub mod basic_sync;
pub mod full_sync;

use std::{future::Future, pin::Pin, sync::Arc};

use caseline_config::{Config, ProviderConfig};
use caseline_providers::render::RenderedDocument;
use caseline_storage::db::Db;

pub use basic_sync::BasicSyncResponse;
pub use full_sync::FullSyncResponse;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait OcrProvider
where
	Self: Send + Sync,
{
	fn recognize<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		document_path: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub trait RenderProvider
where
	Self: Send + Sync,
{
	fn render<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		html: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<RenderedDocument>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Provider { message: String },
	Storage { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub ocr: Arc<dyn OcrProvider>,
	pub render: Arc<dyn RenderProvider>,
}

pub struct CaseService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}

struct DefaultProviders;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<caseline_storage::Error> for ServiceError {
	fn from(err: caseline_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl OcrProvider for DefaultProviders {
	fn recognize<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		document_path: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(caseline_providers::ocr::recognize(cfg, document_path))
	}
}

impl RenderProvider for DefaultProviders {
	fn render<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		html: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<RenderedDocument>> {
		Box::pin(caseline_providers::render::render(cfg, html))
	}
}

impl Providers {
	pub fn new(ocr: Arc<dyn OcrProvider>, render: Arc<dyn RenderProvider>) -> Self {
		Self { ocr, render }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { ocr: provider.clone(), render: provider }
	}
}

impl CaseService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}
}

/// Case titles come from the subject, falling back to the capture snippet for faxes that
/// arrive without one.
pub(crate) fn case_title<'a>(subject: &'a str, snippet: &'a str) -> &'a str {
	if subject.trim().is_empty() { snippet } else { subject }
}

pub(crate) fn first_chars(text: &str, limit: usize) -> String {
	text.chars().take(limit).collect()
}
