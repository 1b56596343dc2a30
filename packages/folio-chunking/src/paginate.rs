use serde::Serialize;

use crate::{
	ChunkAnchorWeight, ChunkOptions, ChunkResult, Error, PrefixTokenCounter, Result,
	TokenLengthResolver, anchors, chunker, markers::MarkerScan, viewport,
};

/// Chunks documents with one shared resolver and option set.
#[derive(Clone)]
pub struct Paginator {
	resolver: TokenLengthResolver,
	options: ChunkOptions,
}
impl Paginator {
	pub fn new(resolver: TokenLengthResolver, options: ChunkOptions) -> Self {
		Self { resolver, options }
	}

	pub fn resolver(&self) -> &TokenLengthResolver {
		&self.resolver
	}

	pub fn options(&self) -> &ChunkOptions {
		&self.options
	}

	pub fn paginate<'a>(&self, text: &'a str) -> Result<Pagination<'a>> {
		let markers = self.options.markers().scan(text);
		let result =
			chunker::split_scanned(text, &self.resolver, self.options.tokens_per_page(), &markers)?;
		let counter = PrefixTokenCounter::build(text, &self.resolver)?;

		if counter.total_tokens() != result.total_tokens {
			return Err(Error::invariant(format!(
				"prefix counter saw {} tokens but the chunker saw {}",
				counter.total_tokens(),
				result.total_tokens
			)));
		}

		Ok(Pagination { text, result, counter, markers })
	}
}

/// Where a document offset falls, in pages and tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
	pub page: usize,
	pub document_token_offset: usize,
	pub page_token_offset: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
	/// 1-based page. `None` means the viewport page when centering, otherwise page 1.
	pub page: Option<usize>,
	pub center_on_viewport: bool,
	pub with_anchor_weights: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageView {
	pub page: usize,
	pub total_pages: usize,
	pub total_tokens: usize,
	pub viewport_page: Option<f64>,
	pub text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub anchor_weights: Option<Vec<ChunkAnchorWeight>>,
}

/// One chunked document with everything needed to answer page, viewport and anchor queries.
#[derive(Clone, Debug)]
pub struct Pagination<'a> {
	text: &'a str,
	result: ChunkResult,
	counter: PrefixTokenCounter,
	markers: MarkerScan,
}
impl Pagination<'_> {
	pub fn text(&self) -> &str {
		self.text
	}

	pub fn result(&self) -> &ChunkResult {
		&self.result
	}

	pub fn into_result(self) -> ChunkResult {
		self.result
	}

	pub fn counter(&self) -> &PrefixTokenCounter {
		&self.counter
	}

	pub fn markers(&self) -> &MarkerScan {
		&self.markers
	}

	pub fn page(&self, page_number: usize) -> Result<&str> {
		self.result.page(page_number)
	}

	/// Continuous page number of the document's single viewport marker.
	pub fn viewport_page(&self) -> Result<f64> {
		let offset = self.markers.viewport_offset()?;

		viewport::resolve_viewport_page(offset, &self.result, &self.counter)
	}

	pub fn anchor_weights(&self, page_number: usize) -> Result<Vec<ChunkAnchorWeight>> {
		anchors::resolve_anchor_weights(
			&self.markers.anchors(),
			&self.result.boundaries,
			page_number,
			&self.counter,
		)
	}

	pub fn locate(&self, offset: usize) -> Result<Location> {
		let document_token_offset = self.counter.count(offset)?;
		let page = self
			.result
			.boundaries
			.partition_point(|&boundary| boundary <= offset)
			.clamp(1, self.result.total_pages);
		let page_start = self.result.boundaries[page - 1];
		let page_token_offset = document_token_offset - self.counter.count(page_start)?;

		Ok(Location { page, document_token_offset, page_token_offset })
	}

	pub fn render(&self, request: &PageRequest) -> Result<PageView> {
		let viewport_page = if request.center_on_viewport {
			Some(self.viewport_page()?)
		} else {
			self.viewport_page().ok()
		};
		let page = match (request.page, viewport_page) {
			(Some(page), _) => page,
			(None, Some(viewport_page)) if request.center_on_viewport =>
				(viewport_page.ceil() as usize).clamp(1, self.result.total_pages),
			(None, _) => 1,
		};
		let text = self.page(page)?.to_string();
		let anchor_weights =
			if request.with_anchor_weights { Some(self.anchor_weights(page)?) } else { None };

		Ok(PageView {
			page,
			total_pages: self.result.total_pages,
			total_tokens: self.result.total_tokens,
			viewport_page,
			text,
			anchor_weights,
		})
	}
}
