use serde::Deserialize;

/// Reserved control sequences of the o200k vocabulary.
pub const DEFAULT_RESERVED_SEQUENCES: [&str; 2] = ["<|endoftext|>", "<|endofprompt|>"];
pub const DEFAULT_MARKER_CLOSING: &str = ">>";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub tokenizer: Tokenizer,
	pub chunking: Chunking,
	#[serde(default)]
	pub markers: Markers,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: default_log_level() }
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Tokenizer {
	/// Optional. Either a path to a `tokenizer.json` file or a pretrained repo id. When unset the
	/// embedded o200k vocabulary is used.
	pub source: Option<String>,
	#[serde(default = "default_reserved_sequences")]
	pub reserved_sequences: Vec<String>,
}
impl Default for Tokenizer {
	fn default() -> Self {
		Self { source: None, reserved_sequences: default_reserved_sequences() }
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chunking {
	pub tokens_per_page: u32,
	/// Prefixes of inline markers that must never be split across pages.
	pub marker_prefixes: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Markers {
	#[serde(default = "default_marker_closing")]
	pub closing: String,
	/// Optional. Sentinel substring marking the reader's scroll position.
	pub viewport: Option<String>,
	/// Optional. Prefix of chunk anchor markers, e.g. `<<anchor|` for `<<anchor|x1>>`.
	pub anchor_prefix: Option<String>,
}
impl Default for Markers {
	fn default() -> Self {
		Self { closing: default_marker_closing(), viewport: None, anchor_prefix: None }
	}
}

fn default_log_level() -> String {
	DEFAULT_LOG_LEVEL.to_string()
}

fn default_reserved_sequences() -> Vec<String> {
	DEFAULT_RESERVED_SEQUENCES.iter().map(|sequence| sequence.to_string()).collect()
}

fn default_marker_closing() -> String {
	DEFAULT_MARKER_CLOSING.to_string()
}
