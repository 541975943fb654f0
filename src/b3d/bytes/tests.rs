use crate::b3d::bytes::{ByteWriter, Cursor};
use crate::b3d::{B3dError, Tag};

#[test]
fn reads_little_endian_primitives() {
	let mut bytes = Vec::new();
	bytes.push(0xFF);
	bytes.push(0x7F);
	bytes.extend_from_slice(&(-2_i16).to_le_bytes());
	bytes.extend_from_slice(&0xBEEF_u16.to_le_bytes());
	bytes.extend_from_slice(&(-7_i32).to_le_bytes());
	bytes.extend_from_slice(&0x1122_3344_u32.to_le_bytes());
	bytes.extend_from_slice(&1.5_f32.to_le_bytes());

	let mut cursor = Cursor::new(&bytes);
	assert_eq!(cursor.read_i8().expect("i8"), -1);
	assert_eq!(cursor.read_u8().expect("u8"), 0x7F);
	assert_eq!(cursor.read_i16_le().expect("i16"), -2);
	assert_eq!(cursor.read_u16_le().expect("u16"), 0xBEEF);
	assert_eq!(cursor.read_i32_le().expect("i32"), -7);
	assert_eq!(cursor.read_u32_le().expect("u32"), 0x1122_3344);
	assert_eq!(cursor.read_f32_le().expect("f32"), 1.5);
	assert_eq!(cursor.pos(), bytes.len());
	assert_eq!(cursor.remaining(), 0);
}

#[test]
fn short_read_fails_without_advancing() {
	let bytes = [1_u8, 2, 3];
	let mut cursor = Cursor::new(&bytes);
	let err = cursor.read_i32_le().expect_err("three bytes cannot hold an i32");
	assert!(matches!(err, B3dError::UnexpectedEof { at: 0, need: 4, rem: 3 }));
	assert_eq!(cursor.pos(), 0);
}

#[test]
fn counted_reads_check_bounds_before_allocating() {
	let bytes = 5_i32.to_le_bytes();
	let mut cursor = Cursor::new(&bytes);
	let err = cursor.read_i32s(usize::MAX / 2).expect_err("huge count must fail");
	assert!(matches!(err, B3dError::UnexpectedEof { .. }));
	assert_eq!(cursor.read_i32s(1).expect("one value fits"), vec![5]);
	assert_eq!(cursor.read_f32s(0).expect("empty read"), Vec::<f32>::new());
}

#[test]
fn cstring_stops_at_nul_or_bound() {
	let bytes = b"root\0tail";
	let mut cursor = Cursor::new(bytes);
	assert_eq!(cursor.read_cstring().expect("terminated"), "root");
	assert_eq!(cursor.pos(), 5);
	assert_eq!(cursor.read_cstring().expect("unterminated"), "tail");
	assert_eq!(cursor.pos(), bytes.len());
	assert!(matches!(cursor.read_cstring(), Err(B3dError::UnexpectedEof { .. })));
}

#[test]
fn cstring_replaces_invalid_utf8() {
	let bytes = [b'a', 0xFF, b'b', 0];
	let mut cursor = Cursor::new(&bytes);
	assert_eq!(cursor.read_cstring().expect("lossy decode"), "a\u{FFFD}b");
}

#[test]
fn bounded_cursor_keeps_absolute_offsets() {
	let bytes = [0_u8; 16];
	let mut cursor = Cursor::new(&bytes);
	cursor.seek(4);
	let mut inner = cursor.bounded(8);
	assert_eq!(inner.pos(), 4);
	assert_eq!(inner.remaining(), 4);
	inner.read_i32_le().expect("fits in bound");
	let err = inner.read_u8().expect_err("bound reached");
	assert!(matches!(err, B3dError::UnexpectedEof { at: 8, need: 1, rem: 0 }));

	let widened = inner.bounded(64);
	assert_eq!(widened.limit(), 8);
}

#[test]
fn seek_past_end_is_allowed_but_next_read_fails() {
	let bytes = [0_u8; 4];
	let mut cursor = Cursor::new(&bytes);
	cursor.seek(100);
	assert_eq!(cursor.remaining(), 0);
	assert!(cursor.read_exact(0).expect("empty read").is_empty());
	assert!(matches!(cursor.read_u8(), Err(B3dError::UnexpectedEof { at: 100, .. })));
}

#[test]
fn tag_read_keeps_raw_bytes() {
	let mut cursor = Cursor::new(b"NO\0D");
	let tag = cursor.read_tag().expect("tag");
	assert_eq!(tag, Tag(*b"NO\0D"));
}

#[test]
fn writer_backpatches_sizes() {
	let mut out = ByteWriter::new();
	out.write_tag(Tag::NODE);
	out.write_i32_le(0);
	out.write_cstring("name", "hi").expect("plain string");
	out.write_f32s(&[1.0]);
	out.patch_i32_le(4, 7);

	let bytes = out.into_inner();
	assert_eq!(&bytes[0..4], b"NODE");
	assert_eq!(i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 7);
	assert_eq!(&bytes[8..11], b"hi\0");
	assert_eq!(bytes.len(), 15);
}

#[test]
fn writer_rejects_interior_nul() {
	let mut out = ByteWriter::new();
	let err = out.write_cstring("node name", "a\0b").expect_err("nul cannot be written");
	assert!(matches!(err, B3dError::InteriorNul { field: "node name", .. }));
	assert_eq!(out.pos(), 0);
}
