use thiserror::Error;

use crate::b3d::Tag;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, B3dError>;

/// Errors produced while reading, decoding, and encoding `.b3d` data.
#[derive(Debug, Error)]
pub enum B3dError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// JSON document could not be read or written.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available before the active bound.
		rem: usize,
	},
	/// Chunk size was negative or the chunk would end past its enclosing bound.
	#[error("malformed chunk header {tag} at offset {at}: size={size}, end={end}, limit={limit}")]
	MalformedHeader {
		/// Chunk header file offset.
		at: usize,
		/// Tag read from the header.
		tag: Tag,
		/// Declared payload size.
		size: i32,
		/// Computed end offset of the chunk.
		end: i64,
		/// End offset of the enclosing chunk or buffer.
		limit: usize,
	},
	/// A nested chunk appeared where a different tag was required.
	#[error("unexpected chunk order at offset {at}: {parent} expects {expected}, got {got}")]
	UnexpectedChunkOrder {
		/// Offset of the offending child header.
		at: usize,
		/// Enclosing chunk tag.
		parent: Tag,
		/// Required child tag.
		expected: Tag,
		/// Actual child tag.
		got: Tag,
	},
	/// Triangle index does not address a vertex of the enclosing mesh.
	#[error("triangle {triangle} at offset {at} references vertex {index}, mesh has {vertex_count}")]
	IndexOutOfRange {
		/// Offset of the triangle record.
		at: usize,
		/// Triangle position within its group.
		triangle: usize,
		/// Offending vertex index.
		index: i32,
		/// Number of vertices in the mesh.
		vertex_count: usize,
	},
	/// CLI tag argument was invalid.
	#[error("invalid chunk tag: {tag}")]
	InvalidTag {
		/// User-provided tag string.
		tag: String,
	},
	/// CLI index policy argument was invalid.
	#[error("invalid index policy: {value} (expected flag, clamp, or error)")]
	InvalidIndexPolicy {
		/// User-provided policy string.
		value: String,
	},
	/// Chunk payload does not fit the signed 32-bit size field.
	#[error("chunk {tag} too large to encode: {len} bytes")]
	ChunkTooLarge {
		/// Tag of the oversized chunk.
		tag: Tag,
		/// Payload length in bytes.
		len: usize,
	},
	/// Vertex shape disagrees with the mesh vertex format.
	#[error("vertex {vertex} does not match mesh vertex format: {detail}")]
	VertexShapeMismatch {
		/// Vertex position within the mesh.
		vertex: usize,
		/// Which part of the shape differs.
		detail: &'static str,
	},
	/// Vertex format counts are negative or overflow.
	#[error("invalid vertex format: tex_coord_sets={sets}, tex_coord_size={size}")]
	InvalidVertexFormat {
		/// Declared texture coordinate sets.
		sets: i32,
		/// Declared floats per texture coordinate set.
		size: i32,
	},
	/// String field contains an interior zero byte and cannot be written null-terminated.
	#[error("{field} contains an interior nul byte: {value:?}")]
	InteriorNul {
		/// Logical field name.
		field: &'static str,
		/// Offending string.
		value: String,
	},
	/// Node tree nests deeper than a JSON document can carry.
	#[error("node tree is {depth} levels deep, JSON output allows at most {max}")]
	JsonTooDeep {
		/// Deepest node level in the document.
		depth: usize,
		/// Largest supported level.
		max: usize,
	},
	/// Encoder was asked to reject triangles that reference missing vertices.
	#[error("triangle {triangle} references vertex {index}, mesh has {vertex_count}")]
	InvalidIndexOnEncode {
		/// Triangle position within its group.
		triangle: usize,
		/// Offending vertex index.
		index: i32,
		/// Number of vertices in the mesh.
		vertex_count: usize,
	},
}

impl B3dError {
	/// Return `true` for content errors that only abort the enclosing chunk.
	///
	/// Structural errors (IO, malformed headers) abort the whole decode.
	pub fn is_recoverable(&self) -> bool {
		matches!(
			self,
			Self::UnexpectedEof { .. } | Self::UnexpectedChunkOrder { .. } | Self::IndexOutOfRange { .. } | Self::InvalidVertexFormat { .. }
		)
	}
}
