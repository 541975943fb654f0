use std::fmt;

use crate::b3d::bytes::Cursor;
use crate::b3d::{B3dError, Result};

/// Raw four-byte chunk tag as stored on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
	/// Root chunk carrying the format version.
	pub const BB3D: Tag = Tag(*b"BB3D");
	/// Texture table.
	pub const TEXS: Tag = Tag(*b"TEXS");
	/// Brush (material) table.
	pub const BRUS: Tag = Tag(*b"BRUS");
	/// Transform node.
	pub const NODE: Tag = Tag(*b"NODE");
	/// Node animation header.
	pub const ANIM: Tag = Tag(*b"ANIM");
	/// Node keyframe track.
	pub const KEYS: Tag = Tag(*b"KEYS");
	/// Bone vertex weights.
	pub const BONE: Tag = Tag(*b"BONE");
	/// Mesh container.
	pub const MESH: Tag = Tag(*b"MESH");
	/// Vertex block inside a mesh.
	pub const VRTS: Tag = Tag(*b"VRTS");
	/// Triangle group inside a mesh.
	pub const TRIS: Tag = Tag(*b"TRIS");

	/// Return the tag with embedded zero bytes removed and the rest left-packed.
	///
	/// Known tags are matched against this form, so `b"KEY\0"` and `b"\0KEY"` compare equal.
	pub fn stripped(self) -> Tag {
		let mut out = [0_u8; 4];
		let mut len = 0;
		for byte in self.0 {
			if byte != 0 {
				out[len] = byte;
				len += 1;
			}
		}
		Tag(out)
	}

	/// Parse an up-to-4 byte ASCII tag, zero-padding short input.
	pub fn parse(text: &str) -> Result<Tag> {
		if text.is_empty() || text.len() > 4 || !text.is_ascii() {
			return Err(B3dError::InvalidTag { tag: text.to_owned() });
		}

		let mut out = [0_u8; 4];
		out[..text.len()].copy_from_slice(text.as_bytes());
		Ok(Tag(out))
	}

	/// Render the tag as a printable label.
	pub fn label(self) -> String {
		let mut out = String::new();
		for byte in self.0 {
			if byte == 0 {
				continue;
			}
			if byte.is_ascii_graphic() || byte == b' ' {
				out.push(char::from(byte));
			} else {
				out.push('.');
			}
		}
		if out.is_empty() { "....".to_owned() } else { out }
	}
}

impl fmt::Display for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label())
	}
}

impl fmt::Debug for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Tag({:?})", self.label())
	}
}

/// Parsed 8-byte chunk header with its absolute extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
	/// Tag as read from the wire, zero bytes included.
	pub tag: Tag,
	/// Offset of the header itself.
	pub offset: usize,
	/// Declared payload size, excluding the header.
	pub size: i32,
	/// Offset one past the payload, where the next sibling starts.
	pub end: usize,
}

impl ChunkHeader {
	/// Encoded header width in bytes.
	pub const SIZE: usize = 8;

	/// Read a header at the cursor position, validating it against `limit`.
	///
	/// `limit` is the end of the enclosing chunk (or the buffer). A negative size
	/// or an end past `limit` is a [`B3dError::MalformedHeader`].
	pub fn read(cursor: &mut Cursor<'_>, limit: usize) -> Result<Self> {
		let offset = cursor.pos();
		let mut head = cursor.bounded(limit);
		let tag = head.read_tag()?;
		let size = head.read_i32_le()?;
		cursor.seek(head.pos());

		let end = offset as i64 + Self::SIZE as i64 + i64::from(size);
		if size < 0 || end > limit as i64 {
			return Err(B3dError::MalformedHeader {
				at: offset,
				tag,
				size,
				end,
				limit,
			});
		}

		Ok(Self {
			tag,
			offset,
			size,
			end: end as usize,
		})
	}

	/// Tag with embedded zero bytes stripped, for dispatch.
	pub fn kind(&self) -> Tag {
		self.tag.stripped()
	}

	/// Offset of the first payload byte.
	pub fn payload_start(&self) -> usize {
		self.offset + Self::SIZE
	}

	/// Payload length in bytes.
	pub fn payload_len(&self) -> usize {
		self.end - self.payload_start()
	}

	/// Cursor over this chunk's payload, positioned at its start.
	pub fn body<'a>(&self, cursor: &Cursor<'a>) -> Cursor<'a> {
		let mut body = cursor.bounded(self.end);
		body.seek(self.payload_start());
		body
	}

	/// Move `cursor` to the end of this chunk regardless of how much was read.
	pub fn skip(&self, cursor: &mut Cursor<'_>) {
		cursor.seek(self.end);
	}
}

/// One chunk found by [`scan_chunks`].
#[derive(Debug, Clone, Copy)]
pub struct ChunkRecord {
	/// Nesting depth, 0 for top-level chunks.
	pub depth: usize,
	/// Parsed header.
	pub header: ChunkHeader,
}

/// Walk the raw chunk tree without decoding record payloads.
///
/// `BB3D`, `NODE`, and `MESH` are descended into after their fixed prefix;
/// every other chunk is treated as a leaf. Records come out in file order.
pub fn scan_chunks(bytes: &[u8]) -> Result<Vec<ChunkRecord>> {
	let mut cursor = Cursor::new(bytes);
	let mut open: Vec<usize> = Vec::new();
	let mut out = Vec::new();

	loop {
		while let Some(&end) = open.last() {
			if cursor.pos() < end {
				break;
			}
			cursor.seek(end);
			open.pop();
		}

		let limit = open.last().copied().unwrap_or(cursor.limit());
		if cursor.pos() >= limit {
			break;
		}

		let header = ChunkHeader::read(&mut cursor, limit)?;
		out.push(ChunkRecord { depth: open.len(), header });

		match container_prefix(&cursor, &header) {
			Some(prefix) => {
				cursor.seek(header.payload_start() + prefix);
				open.push(header.end);
			}
			None => header.skip(&mut cursor),
		}
	}

	Ok(out)
}

fn container_prefix(cursor: &Cursor<'_>, header: &ChunkHeader) -> Option<usize> {
	let prefix = match header.kind() {
		Tag::BB3D | Tag::MESH => 4,
		Tag::NODE => {
			let mut body = header.body(cursor);
			body.read_cstring().ok()?;
			body.pos() - header.payload_start() + 40
		}
		_ => return None,
	};

	(prefix <= header.payload_len()).then_some(prefix)
}
