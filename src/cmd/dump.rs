use std::path::PathBuf;

use b3doc::b3d::{B3dError, B3dFile, Document, Result};
use log::warn;

use crate::cmd::util::{DecodeArgs, emit_json};

/// Deepest node level `dump` writes.
///
/// serde_json reads at most 128 nested containers back, and each node level
/// costs two (the node object and its `children` array) plus up to eight more
/// below the deepest node.
pub(crate) const MAX_JSON_DEPTH: usize = 48;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[command(flatten)]
	pub decode: DecodeArgs,
}

/// Print the decoded document as JSON.
pub fn run(args: Args) -> Result<()> {
	let Args { path, decode } = args;

	let decoded = B3dFile::open(&path)?.decode(&decode.options()?)?;
	if !decoded.issues.is_empty() {
		warn!("{} decode issue(s) in {}; document is partial", decoded.issues.len(), path.display());
	}
	check_json_depth(&decoded.document)?;

	let non_finite = decoded.document.non_finite_floats();
	if non_finite > 0 {
		warn!("{non_finite} NaN or infinite float(s) in {} are written as null; pack cannot read them back", path.display());
	}
	emit_json(&decoded.document)
}

/// Refuse documents whose JSON form would be too deeply nested to read back.
pub(crate) fn check_json_depth(doc: &Document) -> Result<()> {
	let depth = doc.depth();
	if depth > MAX_JSON_DEPTH {
		return Err(B3dError::JsonTooDeep { depth, max: MAX_JSON_DEPTH });
	}
	Ok(())
}
