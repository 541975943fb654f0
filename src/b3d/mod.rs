mod bytes;
mod chunk;
mod decode;
mod encode;
mod error;
mod file;
mod model;

#[cfg(test)]
mod test_support;

/// Bounded byte cursor and little-endian writer.
pub use bytes::{ByteWriter, Cursor};
/// Chunk header framing and raw chunk-tree scan.
pub use chunk::{ChunkHeader, ChunkRecord, Tag, scan_chunks};
/// Decoder entry points, options, and issue report.
pub use decode::{DecodeIssue, DecodeOptions, Decoded, IndexPolicy, decode, decode_with};
/// Encoder entry points and options.
pub use encode::{EncodeOptions, encode, encode_with};
/// Error and result aliases.
pub use error::{B3dError, Result};
/// File abstraction and chunk statistics.
pub use file::{B3dFile, ChunkStats, save};
/// Document model.
pub use model::{
	AnimationMeta, BoneWeight, Brush, Document, KEY_POSITION, KEY_ROTATION, KEY_SCALE, Keyframe, Mesh, Node, Quat, Texture, TriangleGroup, VERTEX_COLOR,
	VERTEX_NORMAL, Vec3, Vertex, VertexFormat,
};
