mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chunking, Config, DEFAULT_LOG_LEVEL, DEFAULT_MARKER_CLOSING, DEFAULT_RESERVED_SEQUENCES,
	Markers, Service, Tokenizer,
};

use std::{fs, path::Path};

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
	if cfg.chunking.tokens_per_page == 0 {
		return Err(Error::Validation {
			message: "chunking.tokens_per_page must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.marker_prefixes.is_empty() {
		return Err(Error::Validation {
			message: "chunking.marker_prefixes must be non-empty.".to_string(),
		});
	}
	if cfg.chunking.marker_prefixes.iter().any(|prefix| prefix.trim().is_empty()) {
		return Err(Error::Validation {
			message: "chunking.marker_prefixes must not contain blank entries.".to_string(),
		});
	}
	if cfg.tokenizer.reserved_sequences.is_empty() {
		return Err(Error::Validation {
			message: "tokenizer.reserved_sequences must be non-empty.".to_string(),
		});
	}
	if cfg.tokenizer.reserved_sequences.iter().any(|sequence| sequence.is_empty()) {
		return Err(Error::Validation {
			message: "tokenizer.reserved_sequences must not contain empty entries.".to_string(),
		});
	}
	if cfg.markers.closing.trim().is_empty() {
		return Err(Error::Validation {
			message: "markers.closing must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("markers.viewport", cfg.markers.viewport.as_ref()),
		("markers.anchor_prefix", cfg.markers.anchor_prefix.as_ref()),
	] {
		let Some(value) = value else {
			continue;
		};

		if cfg.chunking.marker_prefixes.iter().any(|prefix| prefix == value) {
			return Err(Error::Validation {
				message: format!("{label} must differ from every chunking.marker_prefixes entry."),
			});
		}
	}

	if let (Some(viewport), Some(anchor_prefix)) =
		(cfg.markers.viewport.as_ref(), cfg.markers.anchor_prefix.as_ref())
		&& viewport == anchor_prefix
	{
		return Err(Error::Validation {
			message: "markers.viewport must differ from markers.anchor_prefix.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.tokenizer.source.as_deref().map(|source| source.trim().is_empty()).unwrap_or(false) {
		cfg.tokenizer.source = None;
	}
	if cfg.markers.viewport.as_deref().map(|viewport| viewport.trim().is_empty()).unwrap_or(false)
	{
		cfg.markers.viewport = None;
	}
	if cfg
		.markers
		.anchor_prefix
		.as_deref()
		.map(|prefix| prefix.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.markers.anchor_prefix = None;
	}
}
