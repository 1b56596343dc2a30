use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use crate::{
	Result, TokenLengthResolver,
	sanitize::Sanitizer,
	tokenizer::{TokenBackend, TokenizerAdapter},
};

/// One token per `char`; token ids are code points.
pub(crate) struct CharBackend;
impl TokenBackend for CharBackend {
	fn name(&self) -> &'static str {
		"char"
	}

	fn encode(&self, text: &str) -> Result<Vec<u32>> {
		Ok(text.chars().map(u32::from).collect())
	}

	fn token_bytes(&self, id: u32) -> Result<Vec<u8>> {
		let ch = char::from_u32(id)
			.ok_or_else(|| crate::Error::backend(format!("Token {id} is not a code point.")))?;

		Ok(ch.to_string().into_bytes())
	}
}

/// [`CharBackend`] that also tallies every byte it is asked to encode.
pub(crate) struct CountingBackend {
	pub(crate) encoded_bytes: Arc<AtomicUsize>,
}
impl TokenBackend for CountingBackend {
	fn name(&self) -> &'static str {
		"counting"
	}

	fn encode(&self, text: &str) -> Result<Vec<u32>> {
		self.encoded_bytes.fetch_add(text.len(), Ordering::Relaxed);

		CharBackend.encode(text)
	}

	fn token_bytes(&self, id: u32) -> Result<Vec<u8>> {
		CharBackend.token_bytes(id)
	}
}

pub(crate) fn char_resolver() -> TokenLengthResolver {
	let sanitizer = Sanitizer::new(["<|endoftext|>"]).expect("Failed to build sanitizer.");

	TokenLengthResolver::new(Arc::new(TokenizerAdapter::with_backend(CharBackend)), sanitizer)
}

pub(crate) fn counting_resolver() -> (TokenLengthResolver, Arc<AtomicUsize>) {
	let encoded_bytes = Arc::new(AtomicUsize::new(0));
	let backend = CountingBackend { encoded_bytes: Arc::clone(&encoded_bytes) };
	let sanitizer = Sanitizer::new(["<|endoftext|>"]).expect("Failed to build sanitizer.");
	let resolver =
		TokenLengthResolver::new(Arc::new(TokenizerAdapter::with_backend(backend)), sanitizer);

	(resolver, encoded_bytes)
}
