use crate::b3d::{B3dError, Result, Tag};

/// Bounded little-endian cursor over an immutable byte slice.
///
/// Offsets are always absolute within the original buffer, including for
/// cursors narrowed with [`Cursor::bounded`].
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	limit: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0 bounded by the whole buffer.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes,
			pos: 0,
			limit: bytes.len(),
		}
	}

	/// Return a copy of this cursor whose reads stop at `end`.
	///
	/// The bound never widens past the current limit.
	pub fn bounded(&self, end: usize) -> Self {
		Self {
			bytes: self.bytes,
			pos: self.pos,
			limit: end.min(self.limit),
		}
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return the offset reads are bounded by.
	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Reposition the cursor. Seeking past the bound is allowed; the next read fails.
	pub fn seek(&mut self, pos: usize) {
		self.pos = pos;
	}

	/// Return remaining unread bytes before the bound.
	pub fn remaining(&self) -> usize {
		self.limit.saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(eof(self, n));
		}
		if n == 0 {
			return Ok(&[]);
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read an `i8`.
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(i8::from_le_bytes(self.read_array()?))
	}

	/// Read a `u8`.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(u8::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i16`.
	pub fn read_i16_le(&mut self) -> Result<i16> {
		Ok(i16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian IEEE-754 `f32`.
	pub fn read_f32_le(&mut self) -> Result<f32> {
		Ok(f32::from_le_bytes(self.read_array()?))
	}

	/// Read `N` consecutive little-endian `f32` values.
	pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
		let mut out = [0_f32; N];
		for item in &mut out {
			*item = self.read_f32_le()?;
		}
		Ok(out)
	}

	/// Read `count` fixed-width values with `read`.
	///
	/// The whole run is bounds-checked before anything is allocated, so an
	/// untrusted `count` cannot trigger a large allocation.
	pub fn read_vec<T>(&mut self, count: usize, width: usize, mut read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
		let need = count.checked_mul(width).unwrap_or(usize::MAX);
		if need > self.remaining() {
			return Err(eof(self, need));
		}

		let mut out = Vec::with_capacity(count);
		for _ in 0..count {
			out.push(read(self)?);
		}
		Ok(out)
	}

	/// Read `count` little-endian `i32` values.
	pub fn read_i32s(&mut self, count: usize) -> Result<Vec<i32>> {
		self.read_vec(count, 4, Self::read_i32_le)
	}

	/// Read `count` little-endian `f32` values.
	pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>> {
		self.read_vec(count, 4, Self::read_f32_le)
	}

	/// Read a raw four-byte chunk tag.
	pub fn read_tag(&mut self) -> Result<Tag> {
		Ok(Tag(self.read_array()?))
	}

	/// Read bytes up to a zero terminator or the bound, decoding lossily.
	///
	/// The terminator is consumed when present.
	pub fn read_cstring(&mut self) -> Result<String> {
		if self.remaining() == 0 {
			return Err(eof(self, 1));
		}

		let rem = &self.bytes[self.pos..self.limit];
		let (text, consumed) = match rem.iter().position(|byte| *byte == 0) {
			Some(end) => (&rem[..end], end + 1),
			None => (rem, rem.len()),
		};
		self.pos += consumed;
		Ok(String::from_utf8_lossy(text).into_owned())
	}
}

fn eof(cursor: &Cursor<'_>, need: usize) -> B3dError {
	B3dError::UnexpectedEof {
		at: cursor.pos,
		need,
		rem: cursor.remaining(),
	}
}

/// Growable little-endian byte sink with size backpatching.
#[derive(Debug, Default)]
pub struct ByteWriter {
	buf: Vec<u8>,
}

impl ByteWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return current write offset.
	pub fn pos(&self) -> usize {
		self.buf.len()
	}

	/// Return bytes written so far.
	pub fn as_slice(&self) -> &[u8] {
		&self.buf
	}

	/// Consume the writer and return its bytes.
	pub fn into_inner(self) -> Vec<u8> {
		self.buf
	}

	/// Append raw bytes.
	pub fn write_bytes(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
	}

	/// Append a little-endian `i32`.
	pub fn write_i32_le(&mut self, value: i32) {
		self.write_bytes(&value.to_le_bytes());
	}

	/// Append a little-endian `f32`.
	pub fn write_f32_le(&mut self, value: f32) {
		self.write_bytes(&value.to_le_bytes());
	}

	/// Append a run of little-endian `i32` values.
	pub fn write_i32s(&mut self, values: &[i32]) {
		for value in values {
			self.write_i32_le(*value);
		}
	}

	/// Append a run of little-endian `f32` values.
	pub fn write_f32s(&mut self, values: &[f32]) {
		for value in values {
			self.write_f32_le(*value);
		}
	}

	/// Append a raw four-byte chunk tag.
	pub fn write_tag(&mut self, tag: Tag) {
		self.write_bytes(&tag.0);
	}

	/// Append a zero-terminated string.
	pub fn write_cstring(&mut self, field: &'static str, value: &str) -> Result<()> {
		if value.as_bytes().contains(&0) {
			return Err(B3dError::InteriorNul {
				field,
				value: value.to_owned(),
			});
		}
		self.write_bytes(value.as_bytes());
		self.buf.push(0);
		Ok(())
	}

	/// Overwrite a previously written little-endian `i32` at `at`.
	pub fn patch_i32_le(&mut self, at: usize, value: i32) {
		if let Some(slot) = self.buf.get_mut(at..at + 4) {
			slot.copy_from_slice(&value.to_le_bytes());
		}
	}
}

#[cfg(test)]
mod tests;
