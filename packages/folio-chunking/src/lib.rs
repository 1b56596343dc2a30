//! Token-bounded pagination of annotated documents.
//!
//! A document is split into pages that each fit a token budget, without ever cutting an inline
//! marker in half. Around the split the crate answers where an offset falls (page and token
//! position), which continuous page the reader's viewport marker is on, and which chunk anchors
//! sit closest to a page's token center.
//!
//! The tokenizer is initialized once as a [`TokenizerAdapter`] and injected by `Arc`; every other
//! value is built per request and dropped with it.

pub mod anchors;
pub mod boundary;
pub mod chunker;
pub mod error;
pub mod length;
pub mod markers;
pub mod paginate;
pub mod prefix;
pub mod sanitize;
pub mod tokenizer;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_support;

pub use anchors::{ChunkAnchorWeight, resolve_anchor_weights};
pub use boundary::{BoundarySearch, find_boundary};
pub use chunker::{ChunkOptions, ChunkResult, split};
pub use error::{Error, Result};
pub use length::TokenLengthResolver;
pub use markers::{ChunkAnchor, MarkerKind, MarkerScan, MarkerSpan, MarkerSyntax};
pub use paginate::{Location, PageRequest, PageView, Pagination, Paginator};
pub use prefix::PrefixTokenCounter;
pub use sanitize::{Sanitized, Sanitizer};
pub use tokenizer::{
	BackendRole, HfTokenizer, HuggingFaceBackend, TiktokenBackend, TokenBackend, TokenizerAdapter,
};
pub use viewport::resolve_viewport_page;
