use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub const ABOUT: &str = "Split annotated web documents into token-bounded pages.";
/// Help text shared by folio binaries: input conventions and the shape of the output record.
pub const LONG_ABOUT: &str = "\
Split annotated web documents into token-bounded pages.

The document is read from --input (`-` for standard input) and paged with the tokenizer, marker
syntax and page budget from --config. Inline markers are never cut across pages. One page is printed
as a JSON object with `page`, `total_pages`, `total_tokens`, `viewport_page`, `text` and, with
--anchors, `anchor_weights`.";

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}
