use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Error, PrefixTokenCounter, Result, markers::ChunkAnchor};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChunkAnchorWeight {
	pub id: String,
	pub weight: u32,
}

/// Ranks the anchors of one page by token distance from the page's token center.
///
/// An anchor at the center scores `radius + 1`, anchors at the page edges score about 1, and no
/// anchor scores below 1. Output is ordered by descending weight, then ascending id, with one
/// entry per id (the highest weight wins).
pub fn resolve_anchor_weights(
	anchors: &[ChunkAnchor],
	boundaries: &[usize],
	page_number: usize,
	counter: &PrefixTokenCounter,
) -> Result<Vec<ChunkAnchorWeight>> {
	let total_pages = boundaries.len().saturating_sub(1);

	if page_number == 0 || page_number > total_pages {
		return Err(Error::malformed(format!("Page {page_number} is outside 1..={total_pages}.")));
	}

	let page_start = boundaries[page_number - 1];
	let page_end = boundaries[page_number];
	let start_tokens = counter.count(page_start)?;
	let end_tokens = counter.count(page_end)?;

	if end_tokens < start_tokens {
		return Err(Error::invariant(format!(
			"page {page_number} ends at token {end_tokens} before it starts at {start_tokens}"
		)));
	}

	let center = (start_tokens + end_tokens) as f64 / 2.0;
	let radius = (end_tokens - start_tokens).div_ceil(2).max(1) as f64;
	let mut by_id: BTreeMap<&str, u32> = BTreeMap::new();

	for anchor in anchors.iter().filter(|anchor| (page_start..=page_end).contains(&anchor.offset)) {
		let position = counter.count(anchor.offset)? as f64;
		let raw = (radius - (position - center).abs() + 1.0).round().max(1.0);

		if !raw.is_finite() || raw < 1.0 || raw > f64::from(u32::MAX) {
			return Err(Error::invariant(format!(
				"anchor {} received non-positive weight {raw}",
				anchor.id
			)));
		}

		let weight = raw as u32;
		let entry = by_id.entry(anchor.id.as_str()).or_insert(weight);

		*entry = (*entry).max(weight);
	}

	let mut weights: Vec<ChunkAnchorWeight> = by_id
		.into_iter()
		.map(|(id, weight)| ChunkAnchorWeight { id: id.to_string(), weight })
		.collect();

	weights.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.id.cmp(&b.id)));

	Ok(weights)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::char_resolver;

	fn anchor(id: &str, offset: usize) -> ChunkAnchor {
		ChunkAnchor { id: id.to_string(), offset }
	}

	fn weight(id: &str, weight: u32) -> ChunkAnchorWeight {
		ChunkAnchorWeight { id: id.to_string(), weight }
	}

	fn counter(text: &str) -> PrefixTokenCounter {
		PrefixTokenCounter::build(text, &char_resolver()).expect("Expected counter.")
	}

	#[test]
	fn equidistant_anchors_tie_in_id_order() {
		let text = "x".repeat(20);
		let anchors = [anchor("zeta", 5), anchor("alpha", 15), anchor("mid", 10)];
		let weights = resolve_anchor_weights(&anchors, &[0, 20], 1, &counter(&text))
			.expect("Expected weights.");

		assert_eq!(weights, vec![weight("mid", 11), weight("alpha", 6), weight("zeta", 6)]);
	}

	#[test]
	fn edges_score_one_and_other_pages_are_ignored() {
		let text = "x".repeat(30);
		let anchors = [anchor("a0", 0), anchor("b1", 10), anchor("c2", 25)];
		let weights = resolve_anchor_weights(&anchors, &[0, 10, 30], 1, &counter(&text))
			.expect("Expected weights.");

		assert_eq!(weights, vec![weight("a0", 1), weight("b1", 1)]);

		let weights = resolve_anchor_weights(&anchors, &[0, 10, 30], 2, &counter(&text))
			.expect("Expected weights.");

		assert_eq!(weights, vec![weight("c2", 6), weight("b1", 1)]);
	}

	#[test]
	fn duplicate_ids_keep_their_best_weight() {
		let text = "x".repeat(10);
		let anchors = [anchor("dup", 0), anchor("dup", 5)];
		let weights = resolve_anchor_weights(&anchors, &[0, 10], 1, &counter(&text))
			.expect("Expected weights.");

		assert_eq!(weights, vec![weight("dup", 6)]);
	}

	#[test]
	fn no_anchors_in_range_is_empty() {
		let text = "x".repeat(10);
		let weights = resolve_anchor_weights(&[anchor("far", 9)], &[0, 4, 10], 1, &counter(&text))
			.expect("Expected weights.");

		assert!(weights.is_empty());
	}

	#[test]
	fn rejects_pages_out_of_range() {
		let text = "x".repeat(10);
		let err = resolve_anchor_weights(&[], &[0, 10], 2, &counter(&text))
			.expect_err("Expected malformed input.");

		assert!(matches!(err, Error::MalformedInput { .. }), "Unexpected error: {err}");
		assert!(resolve_anchor_weights(&[], &[0, 10], 0, &counter(&text)).is_err());
	}

	#[test]
	fn identical_input_yields_identical_order() {
		let text = "x".repeat(40);
		let anchors: Vec<ChunkAnchor> =
			(0..=40).step_by(4).map(|offset| anchor(&format!("a{offset}"), offset)).collect();
		let counter = counter(&text);
		let first = resolve_anchor_weights(&anchors, &[0, 40], 1, &counter).expect("Expected weights.");
		let second =
			resolve_anchor_weights(&anchors, &[0, 40], 1, &counter).expect("Expected weights.");

		assert_eq!(first, second);
		assert!(first.windows(2).all(|pair| {
			pair[0].weight > pair[1].weight
				|| (pair[0].weight == pair[1].weight && pair[0].id < pair[1].id)
		}));
	}
}
