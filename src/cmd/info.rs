use std::path::PathBuf;

use b3doc::b3d::{B3dFile, Document, Result};

use crate::cmd::util::{DecodeArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[command(flatten)]
	pub decode: DecodeArgs,
}

/// Print document counts and chunk statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json, decode } = args;

	let file = B3dFile::open(&path)?;
	let stats = file.scan_chunk_stats()?;
	let decoded = file.decode(&decode.options()?)?;
	let counts = Counts::of(&decoded.document);

	let mut entries: Vec<_> = stats.tags.into_iter().collect();
	entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			format_version: decoded.document.format_version,
			file_size: file.bytes().len(),
			chunk_count: stats.chunk_count,
			max_depth: stats.max_depth,
			has_root: stats.has_root,
			counts,
			issue_count: decoded.issues.len(),
			top_tags: entries
				.iter()
				.take(12)
				.map(|(tag, count)| TagCountJson {
					tag: tag.label(),
					count: *count,
				})
				.collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("format_version: {}", decoded.document.format_version);
	println!("file_size: {}", file.bytes().len());
	println!("chunk_count: {}", stats.chunk_count);
	println!("max_depth: {}", stats.max_depth);
	println!("has_root: {}", stats.has_root);
	println!("textures: {}", counts.textures);
	println!("brushes: {}", counts.brushes);
	println!("nodes: {}", counts.nodes);
	println!("meshes: {}", counts.meshes);
	println!("vertices: {}", counts.vertices);
	println!("triangles: {}", counts.triangles);
	println!("keyframes: {}", counts.keyframes);
	println!("issues: {}", decoded.issues.len());
	for issue in &decoded.issues {
		println!("  {} at {}: {}", issue.chunk, issue.offset, issue.error);
	}

	println!("top_tags:");
	for (tag, count) in entries.into_iter().take(12) {
		println!("  {}: {}", tag.label(), count);
	}

	Ok(())
}

#[derive(Debug, Default, serde::Serialize)]
struct Counts {
	textures: usize,
	brushes: usize,
	nodes: usize,
	meshes: usize,
	vertices: usize,
	triangles: usize,
	keyframes: usize,
}

impl Counts {
	fn of(doc: &Document) -> Self {
		let mut counts = Counts {
			textures: doc.textures.len(),
			brushes: doc.brushes.len(),
			..Counts::default()
		};
		for (_, node) in doc.walk() {
			counts.nodes += 1;
			counts.keyframes += node.keyframes.len();
			if let Some(mesh) = &node.mesh {
				counts.meshes += 1;
				counts.vertices += mesh.vertices.len();
				counts.triangles += mesh.triangle_count();
			}
		}
		counts
	}
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	format_version: i32,
	file_size: usize,
	chunk_count: u32,
	max_depth: usize,
	has_root: bool,
	counts: Counts,
	issue_count: usize,
	top_tags: Vec<TagCountJson>,
}

#[derive(serde::Serialize)]
struct TagCountJson {
	tag: String,
	count: u32,
}
