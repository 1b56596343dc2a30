use clap::Parser;

use folio::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	folio::run(Args::parse())
}
