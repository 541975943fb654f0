use std::fs;
use std::path::PathBuf;

use b3doc::b3d::{Document, EncodeOptions, Result, save};
use log::info;

#[derive(clap::Args)]
pub struct Args {
	/// JSON document as printed by `dump`.
	pub input: PathBuf,
	/// Destination `.b3d` file.
	pub output: PathBuf,
	/// Refuse triangles that reference missing vertices.
	#[arg(long)]
	pub reject_invalid_indices: bool,
}

/// Encode a JSON document into a `.b3d` file.
pub fn run(args: Args) -> Result<()> {
	let Args {
		input,
		output,
		reject_invalid_indices,
	} = args;

	let text = fs::read_to_string(&input)?;
	let doc: Document = serde_json::from_str(&text)?;
	save(&output, &doc, &EncodeOptions { reject_invalid_indices })?;
	info!("packed {} node(s) into {}", doc.node_count(), output.display());

	println!("wrote: {}", output.display());
	Ok(())
}
