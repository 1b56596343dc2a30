use crate::{ChunkResult, Error, PrefixTokenCounter, Result};

/// Continuous page number of `viewport_offset`, proportional to the tokens before it.
///
/// The result lies in `[1, total_pages]`. A document without tokens is always on page 1.
pub fn resolve_viewport_page(
	viewport_offset: usize,
	result: &ChunkResult,
	counter: &PrefixTokenCounter,
) -> Result<f64> {
	if viewport_offset > counter.text_len() {
		return Err(Error::malformed(format!(
			"Viewport offset {viewport_offset} is outside the document of {} bytes.",
			counter.text_len()
		)));
	}
	if result.total_tokens == 0 {
		return Ok(1.0);
	}

	let tokens_before = counter.count(viewport_offset)? as f64;
	let total_pages = result.total_pages as f64;

	Ok((tokens_before / result.total_tokens as f64 * total_pages).clamp(1.0, total_pages))
}
