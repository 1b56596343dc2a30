pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of a single chunking request. No variant is ever returned next to a partial result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Unusable settings, such as an empty marker prefix set or a zero page budget.
	#[error("{message}")]
	Config { message: String },
	/// The document or request does not satisfy the input contract.
	#[error("{message}")]
	MalformedInput { message: String },
	/// An internal accounting check failed. Always a bug in this crate.
	#[error("Internal invariant violated: {message}")]
	Invariant { message: String },
	/// No tokenizer backend could be initialized or a backend rejected its input.
	#[error("{message}")]
	Backend { message: String },
}
impl Error {
	pub(crate) fn config(message: impl Into<String>) -> Self {
		Self::Config { message: message.into() }
	}

	pub(crate) fn malformed(message: impl Into<String>) -> Self {
		Self::MalformedInput { message: message.into() }
	}

	pub(crate) fn invariant(message: impl Into<String>) -> Self {
		Self::Invariant { message: message.into() }
	}

	pub(crate) fn backend(message: impl Into<String>) -> Self {
		Self::Backend { message: message.into() }
	}
}
