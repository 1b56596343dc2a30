use crate::{Error, Result, TokenLengthResolver};

/// Cumulative token counts over one document.
///
/// The document is sanitized and tokenized once. A query maps an original byte offset to its
/// sanitized offset through the sanitizer's byte map and then counts the tokens that end at or
/// before it, so each query costs two binary searches.
#[derive(Clone, Debug)]
pub struct PrefixTokenCounter {
	sanitized_to_original: Vec<usize>,
	token_ends: Vec<usize>,
	text_len: usize,
}
impl PrefixTokenCounter {
	pub fn build(text: &str, resolver: &TokenLengthResolver) -> Result<Self> {
		let sanitized = resolver.sanitizer().sanitize(text)?;
		let token_ends = resolver.tokenizer().token_ends(&sanitized.text)?;

		if token_ends.windows(2).any(|pair| pair[0] > pair[1]) {
			return Err(Error::invariant("token end offsets are not monotonic"));
		}
		if token_ends.last().is_some_and(|&end| end > sanitized.total_sanitized_bytes) {
			return Err(Error::invariant("token end offset exceeds the sanitized text"));
		}

		Ok(Self {
			sanitized_to_original: sanitized.sanitized_to_original,
			token_ends,
			text_len: sanitized.total_original_bytes,
		})
	}

	/// Token count of `text[..offset]`.
	pub fn count(&self, offset: usize) -> Result<usize> {
		if offset > self.text_len {
			return Err(Error::malformed(format!(
				"Offset {offset} is outside the document of {} bytes.",
				self.text_len
			)));
		}
		if offset == 0 {
			return Ok(0);
		}

		let sanitized_len = self.sanitized_to_original.len() - 1;
		let sanitized_offset = self.sanitized_to_original[..sanitized_len]
			.partition_point(|&original| original < offset);

		Ok(self.token_ends.partition_point(|&end| end <= sanitized_offset))
	}

	pub fn total_tokens(&self) -> usize {
		self.token_ends.len()
	}

	pub fn text_len(&self) -> usize {
		self.text_len
	}
}
