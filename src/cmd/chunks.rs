use std::path::PathBuf;

use b3doc::b3d::{B3dFile, ChunkRecord, Result, Tag};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	/// Hide chunks nested deeper than this.
	#[arg(long)]
	pub max_depth: Option<usize>,
	/// Only list chunks with this tag.
	#[arg(long)]
	pub tag: Option<String>,
}

/// List the raw chunk tree with offsets and sizes.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json, max_depth, tag } = args;

	let filter = tag.as_deref().map(Tag::parse).transpose()?.map(Tag::stripped);
	let file = B3dFile::open(&path)?;
	let records: Vec<ChunkRecord> = file
		.chunks()?
		.into_iter()
		.filter(|record| max_depth.is_none_or(|max| record.depth <= max))
		.filter(|record| filter.is_none_or(|tag| record.header.kind() == tag))
		.collect();

	if json {
		let payload = ChunksJson {
			path: path.display().to_string(),
			chunks: records.iter().map(ChunkJson::from).collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("chunks: {}", records.len());
	for record in &records {
		let header = &record.header;
		println!(
			"{}{} offset={} size={} end={}",
			"  ".repeat(record.depth),
			header.tag,
			header.offset,
			header.size,
			header.end
		);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct ChunksJson {
	path: String,
	chunks: Vec<ChunkJson>,
}

#[derive(serde::Serialize)]
struct ChunkJson {
	depth: usize,
	tag: String,
	offset: usize,
	size: i32,
	end: usize,
}

impl From<&ChunkRecord> for ChunkJson {
	fn from(record: &ChunkRecord) -> Self {
		Self {
			depth: record.depth,
			tag: record.header.tag.label(),
			offset: record.header.offset,
			size: record.header.size,
			end: record.header.end,
		}
	}
}
