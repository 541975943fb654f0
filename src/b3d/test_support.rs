/// Little-endian payload builder for hand-made chunk streams.
#[derive(Default)]
pub(crate) struct ChunkBuf(Vec<u8>);

impl ChunkBuf {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn i32(mut self, value: i32) -> Self {
		self.0.extend_from_slice(&value.to_le_bytes());
		self
	}

	pub(crate) fn i32s(self, values: &[i32]) -> Self {
		values.iter().fold(self, |buf, value| buf.i32(*value))
	}

	pub(crate) fn f32s(mut self, values: &[f32]) -> Self {
		for value in values {
			self.0.extend_from_slice(&value.to_le_bytes());
		}
		self
	}

	pub(crate) fn cstr(mut self, text: &str) -> Self {
		self.0.extend_from_slice(text.as_bytes());
		self.0.push(0);
		self
	}

	pub(crate) fn raw(mut self, bytes: &[u8]) -> Self {
		self.0.extend_from_slice(bytes);
		self
	}

	/// Append a nested chunk with a correct size field.
	pub(crate) fn chunk(self, tag: &[u8; 4], payload: ChunkBuf) -> Self {
		let bytes = chunk(tag, payload);
		self.raw(&bytes)
	}

	pub(crate) fn build(self) -> Vec<u8> {
		self.0
	}
}

/// Frame `payload` as one chunk.
pub(crate) fn chunk(tag: &[u8; 4], payload: ChunkBuf) -> Vec<u8> {
	let payload = payload.build();
	let mut out = Vec::with_capacity(payload.len() + 8);
	out.extend_from_slice(tag);
	out.extend_from_slice(&(payload.len() as i32).to_le_bytes());
	out.extend_from_slice(&payload);
	out
}

/// `NODE` payload prefix with identity scale and rotation.
pub(crate) fn node_prefix(name: &str, position: [f32; 3]) -> ChunkBuf {
	ChunkBuf::new().cstr(name).f32s(&position).f32s(&[1.0, 1.0, 1.0]).f32s(&[0.0, 0.0, 0.0, 1.0])
}
