//! Tokenizer adapter with a primary backend and a one-shot fallback.
//!
//! The adapter is built once at startup, shared by reference (usually behind an `Arc`) and never
//! mutated afterwards. Both backends are expected to implement the same vocabulary; that is a
//! deployment property and is not re-checked here.

use std::path::Path;

use tiktoken_rs::CoreBPE;
use tokenizers::decoders::DecoderWrapper;

use crate::{Error, Result};

pub use tokenizers::Tokenizer as HfTokenizer;

pub trait TokenBackend
where
	Self: Send + Sync,
{
	fn name(&self) -> &'static str;

	fn encode(&self, text: &str) -> Result<Vec<u32>>;

	fn token_bytes(&self, id: u32) -> Result<Vec<u8>>;

	/// End byte offset of every token of `text`, non-decreasing and never past `text.len()`.
	fn token_ends(&self, text: &str) -> Result<Vec<usize>> {
		let ids = self.encode(text)?;
		let mut ends = Vec::with_capacity(ids.len());
		let mut cursor = 0_usize;

		for id in ids {
			cursor += self.token_bytes(id)?.len();

			ends.push(cursor);
		}

		if cursor != text.len() {
			return Err(Error::invariant(format!(
				"{} token bytes cover {cursor} of {} input bytes",
				self.name(),
				text.len()
			)));
		}

		Ok(ends)
	}
}

/// Hugging Face `tokenizers` backend, loaded from a `tokenizer.json` file or a pretrained repo.
pub struct HuggingFaceBackend {
	tokenizer: HfTokenizer,
}
impl HuggingFaceBackend {
	pub fn new(tokenizer: HfTokenizer) -> Self {
		Self { tokenizer }
	}

	pub fn load(source: &str) -> Result<Self> {
		let path = Path::new(source);
		let tokenizer = if path.is_file() {
			HfTokenizer::from_file(path)
		} else {
			HfTokenizer::from_pretrained(source, None)
		}
		.map_err(|err| Error::backend(format!("Failed to load tokenizer from {source}: {err}")))?;

		Ok(Self::new(tokenizer))
	}

	fn encoding(&self, text: &str) -> Result<tokenizers::Encoding> {
		self.tokenizer
			.encode(text, false)
			.map_err(|err| Error::backend(format!("Failed to tokenize content: {err}")))
	}
}
impl TokenBackend for HuggingFaceBackend {
	fn name(&self) -> &'static str {
		"huggingface"
	}

	fn encode(&self, text: &str) -> Result<Vec<u32>> {
		Ok(self.encoding(text)?.get_ids().to_vec())
	}

	/// Byte-level vocabularies map each token char back to one raw byte, which keeps partial UTF-8
	/// sequences intact. Other vocabularies decode the id on its own.
	fn token_bytes(&self, id: u32) -> Result<Vec<u8>> {
		if matches!(self.tokenizer.get_decoder(), Some(DecoderWrapper::ByteLevel(_))) {
			let token = self
				.tokenizer
				.id_to_token(id)
				.ok_or_else(|| Error::backend(format!("Token {id} is not in the vocabulary.")))?;

			return token.chars().map(byte_level_byte).collect::<Option<Vec<u8>>>().ok_or_else(|| {
				Error::backend(format!("Token {id} ({token:?}) is outside the byte-level alphabet."))
			});
		}

		self.tokenizer
			.decode(&[id], false)
			.map(String::into_bytes)
			.map_err(|err| Error::backend(format!("Failed to decode token {id}: {err}")))
	}

	// Normalizers can rewrite the input before the model sees it, so the encoder's own offsets are
	// authoritative here.
	fn token_ends(&self, text: &str) -> Result<Vec<usize>> {
		let encoding = self.encoding(text)?;
		let mut ends = Vec::with_capacity(encoding.len());
		let mut high_water = 0_usize;

		for &(_, end) in encoding.get_offsets() {
			high_water = high_water.max(end.min(text.len()));

			ends.push(high_water);
		}

		Ok(ends)
	}
}

/// Inverse of the GPT-2 byte-level alphabet: printable Latin-1 bytes stand for themselves, the
/// remaining bytes are shifted to `U+0100` onwards in ascending order.
fn byte_level_byte(ch: char) -> Option<u8> {
	fn is_printable(byte: u8) -> bool {
		matches!(byte, b'!'..=b'~' | 0xA1..=0xAC | 0xAE..=0xFF)
	}

	let code = u32::from(ch);

	if let Ok(byte) = u8::try_from(code) {
		return is_printable(byte).then_some(byte);
	}

	let shifted = usize::try_from(code.checked_sub(0x100)?).ok()?;

	(0..=u8::MAX).filter(|&byte| !is_printable(byte)).nth(shifted)
}

/// Mergeable ranks of o200k_base occupy ids `0..O200K_ORDINARY_RANKS`; special tokens sit above.
const O200K_ORDINARY_RANKS: u32 = 199_998;

/// `tiktoken-rs` backend over the embedded o200k_base vocabulary. Needs no file or network access.
pub struct TiktokenBackend {
	bpe: CoreBPE,
}
impl TiktokenBackend {
	pub fn o200k() -> Result<Self> {
		let bpe = tiktoken_rs::o200k_base()
			.map_err(|err| Error::backend(format!("Failed to load o200k_base: {err}")))?;

		Ok(Self { bpe })
	}
}
impl TokenBackend for TiktokenBackend {
	fn name(&self) -> &'static str {
		"tiktoken-o200k"
	}

	fn encode(&self, text: &str) -> Result<Vec<u32>> {
		Ok(self.bpe.encode_ordinary(text))
	}

	/// Raw bytes of an ordinary token. Special tokens are never produced by `encode` and are
	/// rejected like unknown ids.
	fn token_bytes(&self, id: u32) -> Result<Vec<u8>> {
		if id >= O200K_ORDINARY_RANKS {
			return Err(Error::backend(format!("Token {id} is not an ordinary o200k token.")));
		}

		self.bpe
			._decode_native_and_split(vec![id])
			.next()
			.ok_or_else(|| Error::backend(format!("Token {id} decoded to nothing.")))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendRole {
	Primary,
	Fallback,
}

pub struct TokenizerAdapter {
	backend: Box<dyn TokenBackend>,
	role: BackendRole,
}
impl TokenizerAdapter {
	/// Initializes `primary`, falling back to `fallback` exactly once if it fails.
	pub fn init<P, F>(primary: P, fallback: F) -> Result<Self>
	where
		P: FnOnce() -> Result<Box<dyn TokenBackend>>,
		F: FnOnce() -> Result<Box<dyn TokenBackend>>,
	{
		let primary_err = match primary() {
			Ok(backend) => {
				tracing::info!(backend = backend.name(), "Tokenizer backend ready.");

				return Ok(Self { backend, role: BackendRole::Primary });
			},
			Err(err) => err,
		};

		tracing::warn!(error = %primary_err, "Primary tokenizer backend failed to initialize.");

		match fallback() {
			Ok(backend) => {
				tracing::info!(backend = backend.name(), "Fallback tokenizer backend ready.");

				Ok(Self { backend, role: BackendRole::Fallback })
			},
			Err(fallback_err) => Err(Error::backend(format!(
				"No tokenizer backend is usable. Primary: {primary_err} Fallback: {fallback_err}"
			))),
		}
	}

	/// Hugging Face tokenizer from `source` when configured, otherwise the embedded o200k table.
	pub fn from_source(source: Option<&str>) -> Result<Self> {
		Self::init(
			|| match source {
				Some(source) => Ok(Box::new(HuggingFaceBackend::load(source)?) as Box<dyn TokenBackend>),
				None => Err(Error::backend("No tokenizer source is configured.")),
			},
			|| Ok(Box::new(TiktokenBackend::o200k()?) as Box<dyn TokenBackend>),
		)
	}

	pub fn with_backend<B>(backend: B) -> Self
	where
		B: 'static + TokenBackend,
	{
		Self { backend: Box::new(backend), role: BackendRole::Primary }
	}

	pub fn backend_name(&self) -> &'static str {
		self.backend.name()
	}

	pub fn role(&self) -> BackendRole {
		self.role
	}

	pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
		self.backend.encode(text)
	}

	pub fn token_bytes(&self, id: u32) -> Result<Vec<u8>> {
		self.backend.token_bytes(id)
	}

	pub fn token_ends(&self, text: &str) -> Result<Vec<usize>> {
		self.backend.token_ends(text)
	}
}
