use std::ops::Range;

use serde::Serialize;

use crate::{
	Error, Result, TokenLengthResolver,
	boundary::BoundarySearch,
	markers::{MarkerScan, MarkerSyntax},
};

#[derive(Clone, Debug)]
pub struct ChunkOptions {
	tokens_per_page: usize,
	markers: MarkerSyntax,
}
impl ChunkOptions {
	pub fn new(tokens_per_page: usize, markers: MarkerSyntax) -> Result<Self> {
		if tokens_per_page == 0 {
			return Err(Error::config("tokens_per_page must be greater than zero."));
		}

		Ok(Self { tokens_per_page, markers })
	}

	pub fn tokens_per_page(&self) -> usize {
		self.tokens_per_page
	}

	pub fn markers(&self) -> &MarkerSyntax {
		&self.markers
	}
}

/// Pages of one document.
///
/// `boundaries` has `total_pages + 1` entries, starts at 0, ends at the document length and is
/// strictly increasing, except for the empty document which is the single page `[0, 0]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChunkResult {
	pub chunks: Vec<String>,
	pub boundaries: Vec<usize>,
	pub total_pages: usize,
	pub total_tokens: usize,
}
impl ChunkResult {
	/// Byte range of the 1-based `page_number`.
	pub fn page_range(&self, page_number: usize) -> Result<Range<usize>> {
		if page_number == 0 || page_number > self.total_pages {
			return Err(Error::malformed(format!(
				"Page {page_number} is outside 1..={}.",
				self.total_pages
			)));
		}

		Ok(self.boundaries[page_number - 1]..self.boundaries[page_number])
	}

	pub fn page(&self, page_number: usize) -> Result<&str> {
		self.page_range(page_number)?;

		Ok(&self.chunks[page_number - 1])
	}
}

pub fn split(text: &str, resolver: &TokenLengthResolver, options: &ChunkOptions) -> Result<ChunkResult> {
	let markers = options.markers().scan(text);

	split_scanned(text, resolver, options.tokens_per_page(), &markers)
}

pub(crate) fn split_scanned(
	text: &str,
	resolver: &TokenLengthResolver,
	tokens_per_page: usize,
	markers: &MarkerScan,
) -> Result<ChunkResult> {
	if tokens_per_page == 0 {
		return Err(Error::config("tokens_per_page must be greater than zero."));
	}

	let total_tokens = resolver.token_len(text)?;

	if text.is_empty() {
		return Ok(ChunkResult {
			chunks: vec![String::new()],
			boundaries: vec![0, 0],
			total_pages: 1,
			total_tokens,
		});
	}

	let search = BoundarySearch::new(text, resolver, markers);
	let mut boundaries = vec![0_usize];
	let mut start = 0_usize;

	while start < text.len() {
		let end = search.find(start, tokens_per_page)?;

		if end <= start || end > text.len() {
			return Err(Error::invariant(format!(
				"page boundary {end} does not advance past offset {start}"
			)));
		}

		boundaries.push(end);

		start = end;
	}

	let chunks: Vec<String> =
		boundaries.windows(2).map(|pair| text[pair[0]..pair[1]].to_string()).collect();
	let total_pages = chunks.len();

	tracing::debug!(total_pages, total_tokens, tokens_per_page, "Document chunked.");

	Ok(ChunkResult { chunks, boundaries, total_pages, total_tokens })
}
