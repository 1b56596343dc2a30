use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use folio_config::{Config, DEFAULT_RESERVED_SEQUENCES, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("folio_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

fn assert_validation_error(cfg: &Config, expected: &str) {
	let err = folio_config::validate(cfg).expect_err("Expected validation error.");

	assert!(err.to_string().starts_with("Invalid folio config: "), "Unexpected error: {err}");
	assert!(err.to_string().contains(expected), "Unexpected error: {err}");
}

#[test]
fn sample_config_is_valid() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let result = folio_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert_eq!(cfg.chunking.tokens_per_page, 2_000);
	assert_eq!(cfg.markers.viewport.as_deref(), Some("<<viewport>>"));
	assert_eq!(cfg.markers.anchor_prefix.as_deref(), Some("<<anchor|"));
	assert!(cfg.tokenizer.source.is_none());
}

#[test]
fn omitted_sections_fall_back_to_defaults() {
	let payload = "[chunking]\ntokens_per_page = 16\nmarker_prefixes = [\"<<m|\"]\n";
	let path = write_temp_config(payload);
	let result = folio_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected minimal config to load.");

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.markers.closing, ">>");
	assert_eq!(cfg.tokenizer.reserved_sequences, DEFAULT_RESERVED_SEQUENCES.to_vec());
	assert!(cfg.markers.viewport.is_none());
}

#[test]
fn blank_optional_strings_are_normalized_to_none() {
	let payload = SAMPLE_CONFIG_TOML
		.replace("viewport      = \"<<viewport>>\"", "viewport = \"  \"")
		.replace("[tokenizer]\n", "[tokenizer]\nsource = \" \"\n");
	let path = write_temp_config(&payload);
	let result = folio_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected config with blank optionals to load.");

	assert!(cfg.markers.viewport.is_none());
	assert!(cfg.tokenizer.source.is_none());
}

#[test]
fn missing_file_reports_read_error() {
	let mut path = env::temp_dir();

	path.push("folio_config_test_missing_file.toml");

	let err = folio_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
	assert!(err.to_string().contains("folio_config_test_missing_file.toml"));
}

#[test]
fn malformed_toml_reports_parse_error() {
	let path = write_temp_config("[chunking\ntokens_per_page = 1");
	let result = folio_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
	assert!(
		err.to_string().contains("service/tokenizer/chunking/markers"),
		"Unexpected error: {err}"
	);
}

#[test]
fn tokens_per_page_must_be_positive() {
	let mut cfg = base_config();

	cfg.chunking.tokens_per_page = 0;

	assert_validation_error(&cfg, "chunking.tokens_per_page must be greater than zero.");
}

#[test]
fn marker_prefixes_must_be_present_and_non_blank() {
	let mut cfg = base_config();

	cfg.chunking.marker_prefixes.clear();

	assert_validation_error(&cfg, "chunking.marker_prefixes must be non-empty.");

	cfg = base_config();
	cfg.chunking.marker_prefixes.push("   ".to_string());

	assert_validation_error(&cfg, "chunking.marker_prefixes must not contain blank entries.");
}

#[test]
fn reserved_sequences_must_be_present_and_non_empty() {
	let mut cfg = base_config();

	cfg.tokenizer.reserved_sequences.clear();

	assert_validation_error(&cfg, "tokenizer.reserved_sequences must be non-empty.");

	cfg = base_config();
	cfg.tokenizer.reserved_sequences.push(String::new());

	assert_validation_error(&cfg, "tokenizer.reserved_sequences must not contain empty entries.");
}

#[test]
fn marker_closing_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.markers.closing = " ".to_string();

	assert_validation_error(&cfg, "markers.closing must be non-empty.");
}

#[test]
fn viewport_and_anchor_markers_must_not_shadow_atomic_prefixes() {
	let mut cfg = base_config();

	cfg.markers.viewport = Some("<<button|".to_string());

	assert_validation_error(
		&cfg,
		"markers.viewport must differ from every chunking.marker_prefixes entry.",
	);

	cfg = base_config();
	cfg.markers.anchor_prefix = Some("<<viewport>>".to_string());

	assert_validation_error(&cfg, "markers.viewport must differ from markers.anchor_prefix.");
}

#[test]
fn log_level_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.service.log_level = String::new();

	assert_validation_error(&cfg, "service.log_level must be non-empty.");
}
