use unicode_segmentation::UnicodeSegmentation;

use crate::{
	Error, Result, TokenLengthResolver,
	markers::{MarkerScan, MarkerSyntax},
};

/// Page-end search over one document.
///
/// Candidate ends are extended grapheme cluster boundaries. A page is measured on its own span,
/// so the budget is page-local and never cumulative across pages.
pub struct BoundarySearch<'a> {
	text: &'a str,
	resolver: &'a TokenLengthResolver,
	markers: &'a MarkerScan,
	cuts: Vec<usize>,
}
impl<'a> BoundarySearch<'a> {
	pub fn new(text: &'a str, resolver: &'a TokenLengthResolver, markers: &'a MarkerScan) -> Self {
		let mut cuts: Vec<usize> = text.grapheme_indices(true).map(|(idx, _)| idx).collect();

		cuts.push(text.len());

		Self { text, resolver, markers, cuts }
	}

	/// Furthest end offset whose span from `start` fits `token_budget`, moved past any marker it
	/// would split.
	///
	/// Assumes token length never decreases as a span grows. The page may overflow the budget by
	/// one marker, or by one grapheme when a single grapheme alone exceeds the budget.
	pub fn find(&self, start: usize, token_budget: usize) -> Result<usize> {
		if token_budget == 0 {
			return Err(Error::config("The page token budget must be greater than zero."));
		}
		if start > self.text.len() || !self.text.is_char_boundary(start) {
			return Err(Error::malformed(format!(
				"Start offset {start} is not a character boundary of the document."
			)));
		}
		if start == self.text.len() {
			return Ok(start);
		}

		let first = self.cuts.partition_point(|&cut| cut <= start);
		let candidates = &self.cuts[first..];
		let fits = |end: usize| -> Result<bool> {
			Ok(self.resolver.token_len(&self.text[start..end])? <= token_budget)
		};
		let last = candidates.len() - 1;
		let mut best: Option<usize> = None;
		// First index known not to fit, or `candidates.len()` while none is known.
		let mut hi = candidates.len();
		let mut probe = token_budget.saturating_sub(1).min(last);

		// Gallop so each page only tokenizes spans on the order of its own size. The remainder of
		// the document is measured only once the probe reaches its end.
		loop {
			if fits(candidates[probe])? {
				best = Some(probe);

				if probe == last {
					break;
				}

				probe = probe.saturating_mul(2).saturating_add(1).min(last);
			} else {
				hi = probe;

				break;
			}
		}

		let mut lo = best.map_or(0, |idx| idx + 1);

		while lo < hi {
			let mid = lo + (hi - lo) / 2;

			if fits(candidates[mid])? {
				best = Some(mid);
				lo = mid + 1;
			} else {
				hi = mid;
			}
		}

		let mut end = match best {
			Some(idx) => candidates[idx],
			None => {
				tracing::debug!(start, token_budget, "Single grapheme exceeds the page budget.");

				candidates[0]
			},
		};

		if let Some(span) = self.markers.enclosing(end) {
			tracing::debug!(
				start,
				cut = end,
				marker_end = span.end,
				"Page end moved past a marker."
			);

			end = span.end;
		}

		Ok(end)
	}
}

/// One-off boundary search that scans `text` for markers itself.
pub fn find_boundary(
	text: &str,
	start: usize,
	token_budget: usize,
	resolver: &TokenLengthResolver,
	syntax: &MarkerSyntax,
) -> Result<usize> {
	let markers = syntax.scan(text);

	BoundarySearch::new(text, resolver, &markers).find(start, token_budget)
}
