mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, ManagementNo, Postgres, ProviderConfig, Providers, Service, Storage, Sync};

use std::{fs, path::Path};

pub const MAX_COUNTER_WIDTH: u32 = 12;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.lease_seconds <= 0 {
		return Err(Error::Validation {
			message: "sync.lease_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.batch_size <= 0 {
		return Err(Error::Validation {
			message: "sync.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.poll_interval_ms <= 0 {
		return Err(Error::Validation {
			message: "sync.poll_interval_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.match_prefix_chars == 0 {
		return Err(Error::Validation {
			message: "sync.match_prefix_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.ocr_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "sync.ocr_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.management_no.initial_width == 0 {
		return Err(Error::Validation {
			message: "management_no.initial_width must be greater than zero.".to_string(),
		});
	}
	if cfg.management_no.initial_width > MAX_COUNTER_WIDTH {
		return Err(Error::Validation {
			message: format!("management_no.initial_width must be {MAX_COUNTER_WIDTH} or less."),
		});
	}
	if cfg.management_no.label.is_empty() {
		return Err(Error::Validation {
			message: "management_no.label must be non-empty.".to_string(),
		});
	}

	for (label, provider) in [("ocr", &cfg.providers.ocr), ("render", &cfg.providers.render)] {
		if provider.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if provider.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_key must be non-empty."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.management_no.label = cfg.management_no.label.trim().to_string();

	for provider in [&mut cfg.providers.ocr, &mut cfg.providers.render] {
		if provider.api_base.ends_with('/') {
			provider.api_base.truncate(provider.api_base.trim_end_matches('/').len());
		}
	}
}
