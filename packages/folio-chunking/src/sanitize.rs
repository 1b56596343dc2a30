//! Removal of tokenizer-reserved control sequences ahead of tokenization.
//!
//! A reserved sequence such as `<|endoftext|>` is encoded as a single control token by most
//! tokenizers, so a literal occurrence inside page text would be counted (and billed) wrongly.
//! [`Sanitizer::sanitize`] strips every occurrence and keeps a byte map from the sanitized text
//! back to the original so token positions can be reported in original offsets.

use std::borrow::Cow;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::{Error, Result};

/// Output of [`Sanitizer::sanitize`].
#[derive(Clone, Debug)]
pub struct Sanitized<'a> {
	pub text: Cow<'a, str>,
	/// `sanitized_to_original[i]` is the original byte offset of sanitized byte `i`. Holds
	/// `total_sanitized_bytes + 1` entries and ends with `total_original_bytes`.
	pub sanitized_to_original: Vec<usize>,
	pub total_original_bytes: usize,
	pub total_sanitized_bytes: usize,
}
impl Sanitized<'_> {
	/// Number of sanitized bytes that precede `original_offset`.
	pub fn to_sanitized_offset(&self, original_offset: usize) -> usize {
		self.sanitized_to_original[..self.total_sanitized_bytes]
			.partition_point(|&original| original < original_offset)
	}
}

#[derive(Clone, Debug)]
pub struct Sanitizer {
	matcher: AhoCorasick,
	sequences: Vec<String>,
}
impl Sanitizer {
	pub fn new<I, S>(sequences: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let sequences: Vec<String> = sequences.into_iter().map(Into::into).collect();

		if sequences.is_empty() {
			return Err(Error::config("At least one reserved sequence is required."));
		}
		if sequences.iter().any(|sequence| sequence.is_empty()) {
			return Err(Error::config("Reserved sequences must be non-empty."));
		}

		let matcher = AhoCorasick::builder()
			.match_kind(MatchKind::LeftmostLongest)
			.build(&sequences)
			.map_err(|err| Error::config(format!("Failed to build reserved sequence matcher: {err}")))?;

		Ok(Self { matcher, sequences })
	}

	pub fn sequences(&self) -> &[String] {
		&self.sequences
	}

	/// Sanitized text only, for callers that never translate offsets.
	pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
		let mut current = Cow::Borrowed(text);

		while let Some(pass) = self.remove_once(current.as_ref(), false) {
			current = Cow::Owned(pass.text);
		}

		current
	}

	pub fn sanitize<'a>(&self, text: &'a str) -> Result<Sanitized<'a>> {
		let total_original_bytes = text.len();
		let mut current = Cow::Borrowed(text);
		let mut sanitized_to_original: Vec<usize> = (0..=total_original_bytes).collect();
		let mut removed_bytes = 0_usize;
		let mut passes = 0_usize;

		// Removing one sequence can splice the halves of another together, so repeat until clean.
		while let Some(pass) = self.remove_once(current.as_ref(), true) {
			sanitized_to_original =
				pass.to_previous.iter().map(|&previous| sanitized_to_original[previous]).collect();
			removed_bytes += pass.removed_bytes;
			passes += 1;
			current = Cow::Owned(pass.text);
		}

		let total_sanitized_bytes = current.len();

		if sanitized_to_original.len() != total_sanitized_bytes + 1 {
			return Err(Error::invariant(format!(
				"sanitizer byte map has {} entries for {total_sanitized_bytes} sanitized bytes",
				sanitized_to_original.len()
			)));
		}
		if sanitized_to_original.last() != Some(&total_original_bytes)
			|| total_sanitized_bytes + removed_bytes != total_original_bytes
		{
			return Err(Error::invariant(format!(
				"sanitizer kept {total_sanitized_bytes} and removed {removed_bytes} of {total_original_bytes} bytes"
			)));
		}
		if sanitized_to_original.windows(2).any(|pair| pair[0] >= pair[1]) {
			return Err(Error::invariant("sanitizer byte map is not strictly increasing"));
		}
		if removed_bytes > 0 {
			tracing::debug!(removed_bytes, passes, "Reserved sequences stripped.");
		}

		Ok(Sanitized { text: current, sanitized_to_original, total_original_bytes, total_sanitized_bytes })
	}

	fn remove_once(&self, text: &str, with_map: bool) -> Option<RemovalPass> {
		let mut matches = self.matcher.find_iter(text).peekable();

		matches.peek()?;

		let mut out = String::with_capacity(text.len());
		let mut to_previous = Vec::new();
		let mut removed_bytes = 0_usize;
		let mut cursor = 0_usize;

		for found in matches {
			out.push_str(&text[cursor..found.start()]);

			if with_map {
				to_previous.extend(cursor..found.start());
			}

			removed_bytes += found.end() - found.start();
			cursor = found.end();
		}

		out.push_str(&text[cursor..]);

		if with_map {
			to_previous.extend(cursor..=text.len());
		}

		Some(RemovalPass { text: out, to_previous, removed_bytes })
	}
}

struct RemovalPass {
	text: String,
	/// Byte offsets into the previous pass's text, one per output byte plus the end.
	to_previous: Vec<usize>,
	removed_bytes: usize,
}
