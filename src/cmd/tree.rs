use std::path::PathBuf;

use b3doc::b3d::{B3dFile, Result};

use crate::cmd::util::{DecodeArgs, fixed2};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[command(flatten)]
	pub decode: DecodeArgs,
}

/// Print the node hierarchy, one line per node.
pub fn run(args: Args) -> Result<()> {
	let Args { path, decode } = args;

	let decoded = B3dFile::open(&path)?.decode(&decode.options()?)?;
	for (depth, node) in decoded.document.walk() {
		let (vertices, groups) = node
			.mesh
			.as_ref()
			.map_or((0, 0), |mesh| (mesh.vertices.len(), mesh.triangle_groups.len()));
		println!(
			"{}{}  rot: {}  pos: {}  keys: {}  vertices: {}  groups: {}",
			" ".repeat(depth),
			node.name,
			fixed2(&node.rotation),
			fixed2(&node.position),
			node.keyframes.len(),
			vertices,
			groups
		);
	}

	Ok(())
}
