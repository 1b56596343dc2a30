//! Inline marker recognition.
//!
//! Three marker kinds share one leftmost-longest multi-pattern pass:
//! - atomic markers, `<prefix>body<closing>`, standing for page controls that must never be cut;
//! - the viewport sentinel, a bare literal marking the reader's scroll position;
//! - chunk anchors, `<anchor prefix>id<closing>`, whose id is lowercase ASCII alphanumeric.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::Serialize;

use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerKind {
	Atomic,
	Viewport,
	Anchor { id: String },
}

/// A recognized marker occupying `start..end` of the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerSpan {
	pub kind: MarkerKind,
	pub start: usize,
	pub end: usize,
}
impl MarkerSpan {
	/// Whether cutting the text at `offset` would split this marker.
	pub fn splits_at(&self, offset: usize) -> bool {
		self.start < offset && offset < self.end
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChunkAnchor {
	pub id: String,
	pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PatternRole {
	Atomic,
	Viewport,
	Anchor,
}

#[derive(Clone, Debug)]
pub struct MarkerSyntax {
	atomic_prefixes: Vec<String>,
	closing: String,
	viewport: Option<String>,
	anchor_prefix: Option<String>,
	matcher: AhoCorasick,
	roles: Vec<PatternRole>,
}
impl MarkerSyntax {
	pub fn new<I, S>(atomic_prefixes: I, closing: impl Into<String>) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut prefixes: Vec<String> = Vec::new();

		for prefix in atomic_prefixes {
			let prefix = prefix.into();

			if !prefixes.contains(&prefix) {
				prefixes.push(prefix);
			}
		}

		Self::build(prefixes, closing.into(), None, None)
	}

	pub fn with_viewport(self, sentinel: impl Into<String>) -> Result<Self> {
		Self::build(self.atomic_prefixes, self.closing, Some(sentinel.into()), self.anchor_prefix)
	}

	pub fn with_anchor_prefix(self, prefix: impl Into<String>) -> Result<Self> {
		Self::build(self.atomic_prefixes, self.closing, self.viewport, Some(prefix.into()))
	}

	pub fn atomic_prefixes(&self) -> &[String] {
		&self.atomic_prefixes
	}

	pub fn closing(&self) -> &str {
		&self.closing
	}

	pub fn viewport(&self) -> Option<&str> {
		self.viewport.as_deref()
	}

	pub fn anchor_prefix(&self) -> Option<&str> {
		self.anchor_prefix.as_deref()
	}

	pub fn scan(&self, text: &str) -> MarkerScan {
		let mut spans = Vec::new();
		let mut pos = 0_usize;
		// Once no closing delimiter follows some offset, none follows any later offset either.
		let mut unclosed_from: Option<usize> = None;

		while pos < text.len() {
			let Some(found) = self.matcher.find(&text[pos..]) else {
				break;
			};
			let start = pos + found.start();
			let prefix_end = pos + found.end();
			let role = self.roles[found.pattern().as_usize()];

			if role == PatternRole::Viewport {
				spans.push(MarkerSpan { kind: MarkerKind::Viewport, start, end: prefix_end });

				pos = prefix_end;

				continue;
			}

			let close_at = if unclosed_from.is_some_and(|from| from <= prefix_end) {
				None
			} else {
				text[prefix_end..].find(&self.closing)
			};
			let Some(close_at) = close_at else {
				tracing::debug!(offset = start, "Unterminated marker ignored.");

				unclosed_from.get_or_insert(prefix_end);

				pos = prefix_end;

				continue;
			};
			let body_end = prefix_end + close_at;
			let end = body_end + self.closing.len();
			let kind = match role {
				PatternRole::Anchor => {
					let id = &text[prefix_end..body_end];

					if !is_anchor_id(id) {
						tracing::warn!(offset = start, id, "Chunk anchor with malformed id ignored.");

						pos = prefix_end;

						continue;
					}

					MarkerKind::Anchor { id: id.to_string() }
				},
				_ => MarkerKind::Atomic,
			};

			spans.push(MarkerSpan { kind, start, end });

			pos = end;
		}

		MarkerScan { spans }
	}

	fn build(
		atomic_prefixes: Vec<String>,
		closing: String,
		viewport: Option<String>,
		anchor_prefix: Option<String>,
	) -> Result<Self> {
		if atomic_prefixes.is_empty() {
			return Err(Error::config("At least one atomic marker prefix is required."));
		}
		if atomic_prefixes.iter().any(|prefix| prefix.is_empty()) {
			return Err(Error::config("Atomic marker prefixes must be non-empty."));
		}
		if closing.is_empty() {
			return Err(Error::config("The marker closing delimiter must be non-empty."));
		}

		let mut patterns = atomic_prefixes.clone();
		let mut roles = vec![PatternRole::Atomic; atomic_prefixes.len()];

		for (label, pattern, role) in [
			("viewport sentinel", viewport.as_ref(), PatternRole::Viewport),
			("anchor prefix", anchor_prefix.as_ref(), PatternRole::Anchor),
		] {
			let Some(pattern) = pattern else {
				continue;
			};

			if pattern.is_empty() {
				return Err(Error::config(format!("The {label} must be non-empty.")));
			}
			if patterns.contains(pattern) {
				return Err(Error::config(format!(
					"The {label} must differ from every other marker pattern."
				)));
			}

			patterns.push(pattern.clone());
			roles.push(role);
		}

		let matcher = AhoCorasick::builder()
			.match_kind(MatchKind::LeftmostLongest)
			.build(&patterns)
			.map_err(|err| Error::config(format!("Failed to build marker matcher: {err}")))?;

		Ok(Self { atomic_prefixes, closing, viewport, anchor_prefix, matcher, roles })
	}
}

/// Markers of one document in text order. Spans never overlap.
#[derive(Clone, Debug, Default)]
pub struct MarkerScan {
	spans: Vec<MarkerSpan>,
}
impl MarkerScan {
	pub fn spans(&self) -> &[MarkerSpan] {
		&self.spans
	}

	pub fn anchors(&self) -> Vec<ChunkAnchor> {
		self.spans
			.iter()
			.filter_map(|span| match &span.kind {
				MarkerKind::Anchor { id } => Some(ChunkAnchor { id: id.clone(), offset: span.start }),
				_ => None,
			})
			.collect()
	}

	/// Offset of the single viewport sentinel.
	pub fn viewport_offset(&self) -> Result<usize> {
		let mut offsets =
			self.spans.iter().filter(|span| span.kind == MarkerKind::Viewport).map(|span| span.start);
		let Some(offset) = offsets.next() else {
			return Err(Error::malformed("The document has no viewport marker."));
		};

		if offsets.next().is_some() {
			return Err(Error::malformed("The document has more than one viewport marker."));
		}

		Ok(offset)
	}

	/// The marker that a cut at `offset` would split, if any.
	pub fn enclosing(&self, offset: usize) -> Option<&MarkerSpan> {
		let idx = self.spans.partition_point(|span| span.end <= offset);

		self.spans.get(idx).filter(|span| span.splits_at(offset))
	}
}

fn is_anchor_id(id: &str) -> bool {
	!id.is_empty() && id.bytes().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit())
}
