use std::fs;
use std::path::PathBuf;

use b3doc::b3d::{B3dFile, Result, decode_with, encode};

use crate::cmd::util::DecodeArgs;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Also write the re-encoded bytes here.
	#[arg(long)]
	pub out: Option<PathBuf>,
	#[command(flatten)]
	pub decode: DecodeArgs,
}

/// Decode, re-encode, and decode again; report whether the documents match.
///
/// Documents are compared by encoding the second decode and checking it against
/// the first encoding. Floats are compared bit for bit, so NaN values match.
/// Returns `Ok(false)` on a mismatch so the caller can set the exit status.
pub fn run(args: Args) -> Result<bool> {
	let Args { path, out, decode } = args;
	let opt = decode.options()?;

	let file = B3dFile::open(&path)?;
	let first = file.decode(&opt)?;
	let bytes = encode(&first.document)?;
	let second = decode_with(&bytes, &opt)?;

	if let Some(out) = &out {
		fs::write(out, &bytes)?;
	}

	let same = encode(&second.document)? == bytes;
	println!("path: {}", path.display());
	println!("input_size: {}", file.bytes().len());
	println!("output_size: {}", bytes.len());
	println!("byte_identical: {}", file.bytes() == bytes.as_slice());
	println!("issues: {} -> {}", first.issues.len(), second.issues.len());
	println!("documents_equal: {same}");
	Ok(same)
}
