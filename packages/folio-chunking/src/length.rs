use std::sync::Arc;

use crate::{Result, sanitize::Sanitizer, tokenizer::TokenizerAdapter};

/// Token count of arbitrary text spans: sanitize, then encode.
///
/// This is the only span-level counting primitive in the crate. Token boundaries are sub-word and
/// vocabulary specific, so no character or byte heuristic stands in for it.
#[derive(Clone)]
pub struct TokenLengthResolver {
	tokenizer: Arc<TokenizerAdapter>,
	sanitizer: Sanitizer,
}
impl TokenLengthResolver {
	pub fn new(tokenizer: Arc<TokenizerAdapter>, sanitizer: Sanitizer) -> Self {
		Self { tokenizer, sanitizer }
	}

	pub fn token_len(&self, text: &str) -> Result<usize> {
		if text.is_empty() {
			return Ok(0);
		}

		let sanitized = self.sanitizer.strip(text);

		Ok(self.tokenizer.encode(&sanitized)?.len())
	}

	pub fn tokenizer(&self) -> &TokenizerAdapter {
		&self.tokenizer
	}

	pub fn sanitizer(&self) -> &Sanitizer {
		&self.sanitizer
	}
}
