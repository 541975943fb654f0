use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::b3d::{ChunkRecord, DecodeOptions, Decoded, Document, EncodeOptions, Result, Tag, decode_with, encode_with, scan_chunks};

/// `.b3d` file contents loaded into memory.
pub struct B3dFile {
	bytes: Vec<u8>,
}

impl B3dFile {
	/// Read a whole file from disk. The handle is closed before this returns.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let bytes = fs::read(path)?;
		Ok(Self { bytes })
	}

	/// Wrap an in-memory buffer.
	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		Self { bytes }
	}

	/// Return raw file bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Walk the raw chunk tree.
	pub fn chunks(&self) -> Result<Vec<ChunkRecord>> {
		scan_chunks(&self.bytes)
	}

	/// Decode the document and its issue report.
	pub fn decode(&self, opt: &DecodeOptions) -> Result<Decoded> {
		decode_with(&self.bytes, opt)
	}

	/// Scan basic chunk distribution statistics.
	pub fn scan_chunk_stats(&self) -> Result<ChunkStats> {
		let mut stats = ChunkStats {
			chunk_count: 0,
			max_depth: 0,
			has_root: false,
			tags: HashMap::new(),
		};

		for record in self.chunks()? {
			stats.chunk_count += 1;
			stats.max_depth = stats.max_depth.max(record.depth);
			*stats.tags.entry(record.header.kind()).or_insert(0) += 1;
			if record.depth == 0 && record.header.kind() == Tag::BB3D {
				stats.has_root = true;
			}
		}

		Ok(stats)
	}
}

/// Encode `doc` and write it to `path`.
pub fn save(path: impl AsRef<Path>, doc: &Document, opt: &EncodeOptions) -> Result<()> {
	let bytes = encode_with(doc, opt)?;
	fs::write(path, bytes)?;
	Ok(())
}

/// Aggregate chunk-level counts from a tree scan.
pub struct ChunkStats {
	/// Number of chunks at any depth.
	pub chunk_count: u32,
	/// Deepest nesting level seen.
	pub max_depth: usize,
	/// Whether a top-level `BB3D` chunk was seen.
	pub has_root: bool,
	/// Frequency table by stripped tag.
	pub tags: HashMap<Tag, u32>,
}
