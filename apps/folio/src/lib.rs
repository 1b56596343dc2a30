use std::{
	fs,
	io::{self, Read},
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use folio_chunking::{
	ChunkOptions, MarkerSyntax, PageRequest, PageView, Paginator, Sanitizer, TokenLengthResolver,
	TokenizerAdapter,
};
use folio_config::{Config, DEFAULT_LOG_LEVEL};

#[derive(Debug, Parser)]
#[command(
	version = folio_cli::VERSION,
	about = folio_cli::ABOUT,
	long_about = folio_cli::LONG_ABOUT,
	rename_all = "kebab",
	styles = folio_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Document to paginate. `-` reads standard input.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	/// 1-based page to print. Defaults to the viewport page with `--viewport`, otherwise page 1.
	#[arg(long, short = 'p', value_name = "N")]
	pub page: Option<usize>,
	/// Center on the document's viewport marker.
	#[arg(long)]
	pub viewport: bool,
	/// Include chunk anchor weights for the printed page.
	#[arg(long)]
	pub anchors: bool,
}
impl Args {
	pub fn request(&self) -> PageRequest {
		PageRequest {
			page: self.page,
			center_on_viewport: self.viewport,
			with_anchor_weights: self.anchors,
		}
	}
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = folio_config::load(&args.config)?;
	let filter = EnvFilter::try_new(&config.service.log_level)
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	let paginator = build_paginator(&config)?;
	let text = read_input(&args.input)?;
	let view = render_document(&paginator, &text, &args.request())?;

	println!("{}", serde_json::to_string_pretty(&view)?);

	Ok(())
}

/// Initializes the tokenizer once and wires it into a paginator for `config`.
pub fn build_paginator(config: &Config) -> folio_chunking::Result<Paginator> {
	let tokenizer = Arc::new(TokenizerAdapter::from_source(config.tokenizer.source.as_deref())?);
	let sanitizer = Sanitizer::new(&config.tokenizer.reserved_sequences)?;
	let mut markers =
		MarkerSyntax::new(&config.chunking.marker_prefixes, config.markers.closing.as_str())?;

	if let Some(viewport) = &config.markers.viewport {
		markers = markers.with_viewport(viewport.as_str())?;
	}
	if let Some(anchor_prefix) = &config.markers.anchor_prefix {
		markers = markers.with_anchor_prefix(anchor_prefix.as_str())?;
	}

	let options = ChunkOptions::new(config.chunking.tokens_per_page as usize, markers)?;

	Ok(Paginator::new(TokenLengthResolver::new(tokenizer, sanitizer), options))
}

pub fn render_document(
	paginator: &Paginator,
	text: &str,
	request: &PageRequest,
) -> folio_chunking::Result<PageView> {
	let pagination = paginator.paginate(text)?;
	let view = pagination.render(request)?;

	tracing::info!(
		page = view.page,
		total_pages = view.total_pages,
		total_tokens = view.total_tokens,
		"Page rendered."
	);

	Ok(view)
}

fn read_input(path: &Path) -> io::Result<String> {
	if path.as_os_str() == "-" {
		let mut text = String::new();

		io::stdin().read_to_string(&mut text)?;

		return Ok(text);
	}

	fs::read_to_string(path)
}
