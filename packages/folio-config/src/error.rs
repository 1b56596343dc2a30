pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read the folio config at {path:?}: {source}.")]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error(
		"The folio config at {path:?} does not match the service/tokenizer/chunking/markers schema: {source}"
	)]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Invalid folio config: {message}")]
	Validation { message: String },
}
