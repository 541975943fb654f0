use log::trace;

use crate::b3d::bytes::ByteWriter;
use crate::b3d::{B3dError, Brush, ChunkHeader, Document, Keyframe, Mesh, Node, Result, Tag, Texture};

/// Behavior switches for encoding.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
	/// Refuse triangles whose indices do not address a vertex of their mesh.
	pub reject_invalid_indices: bool,
}

/// Encode a document with default options.
pub fn encode(doc: &Document) -> Result<Vec<u8>> {
	encode_with(doc, &EncodeOptions::default())
}

/// Encode a document into a `BB3D` chunk stream.
///
/// Brushes sharing a texture slot count share one `BRUS` chunk, and
/// consecutive keyframes with the same channels share one `KEYS` chunk.
pub fn encode_with(doc: &Document, opt: &EncodeOptions) -> Result<Vec<u8>> {
	let mut encoder = Encoder { out: ByteWriter::new(), opt };

	let root = encoder.begin(Tag::BB3D);
	encoder.out.write_i32_le(doc.format_version);
	if !doc.textures.is_empty() {
		encoder.write_textures(&doc.textures)?;
	}
	for run in doc.brushes.chunk_by(|left, right| left.texture_ids.len() == right.texture_ids.len()) {
		encoder.write_brushes(run)?;
	}
	for node in &doc.root_nodes {
		encoder.write_node_tree(node)?;
	}
	encoder.finish(Tag::BB3D, root)?;

	Ok(encoder.out.into_inner())
}

struct Encoder<'o> {
	out: ByteWriter,
	opt: &'o EncodeOptions,
}

enum Step<'d> {
	Enter(&'d Node),
	Exit(usize),
}

impl Encoder<'_> {
	/// Write a header with a placeholder size and return its offset.
	fn begin(&mut self, tag: Tag) -> usize {
		let at = self.out.pos();
		self.out.write_tag(tag);
		self.out.write_i32_le(0);
		at
	}

	/// Backpatch the size of the chunk started at `at`.
	fn finish(&mut self, tag: Tag, at: usize) -> Result<()> {
		let len = self.out.pos() - at - ChunkHeader::SIZE;
		let size = i32::try_from(len).map_err(|_| B3dError::ChunkTooLarge { tag, len })?;
		self.out.patch_i32_le(at + 4, size);
		trace!("wrote {tag} at {at} size {size}");
		Ok(())
	}

	fn write_textures(&mut self, textures: &[Texture]) -> Result<()> {
		let at = self.begin(Tag::TEXS);
		for texture in textures {
			self.out.write_cstring("texture name", &texture.name)?;
			self.out.write_i32_le(texture.flags);
			self.out.write_i32_le(texture.blend_mode);
			self.out.write_f32s(&texture.uv_offset);
			self.out.write_f32s(&texture.uv_scale);
			self.out.write_f32_le(texture.uv_rotation);
		}
		self.finish(Tag::TEXS, at)
	}

	/// Write one `BRUS` chunk; every brush in `brushes` has the same slot count.
	fn write_brushes(&mut self, brushes: &[Brush]) -> Result<()> {
		let slots = brushes.first().map_or(0, |brush| brush.texture_ids.len());
		let at = self.begin(Tag::BRUS);
		self.out.write_i32_le(i32::try_from(slots).map_err(|_| B3dError::ChunkTooLarge { tag: Tag::BRUS, len: slots })?);
		for brush in brushes {
			self.out.write_cstring("brush name", &brush.name)?;
			self.out.write_f32s(&brush.color);
			self.out.write_f32_le(brush.shininess);
			self.out.write_i32_le(brush.blend_mode);
			self.out.write_i32_le(brush.fx_flags);
			self.out.write_i32s(&brush.texture_ids);
		}
		self.finish(Tag::BRUS, at)
	}

	/// Write a node and its descendants depth-first without recursion.
	fn write_node_tree(&mut self, root: &Node) -> Result<()> {
		let mut steps = vec![Step::Enter(root)];
		while let Some(step) = steps.pop() {
			match step {
				Step::Enter(node) => {
					let at = self.begin(Tag::NODE);
					self.write_node_body(node)?;
					steps.push(Step::Exit(at));
					steps.extend(node.children.iter().rev().map(Step::Enter));
				}
				Step::Exit(at) => self.finish(Tag::NODE, at)?,
			}
		}
		Ok(())
	}

	/// Node prefix followed by `ANIM`, `KEYS`, `BONE`, and `MESH` children.
	fn write_node_body(&mut self, node: &Node) -> Result<()> {
		self.out.write_cstring("node name", &node.name)?;
		self.out.write_f32s(&node.position);
		self.out.write_f32s(&node.scale);
		self.out.write_f32s(&node.rotation);

		if let Some(meta) = node.animation_meta {
			let at = self.begin(Tag::ANIM);
			self.out.write_i32_le(meta.flags);
			self.out.write_i32_le(meta.frame_count);
			self.out.write_f32_le(meta.fps);
			self.finish(Tag::ANIM, at)?;
		}

		for run in node.keyframes.chunk_by(|left, right| left.flags() == right.flags()) {
			self.write_keys(run)?;
		}

		if !node.bone_weights.is_empty() {
			let at = self.begin(Tag::BONE);
			for item in &node.bone_weights {
				self.out.write_i32_le(item.vertex_id);
				self.out.write_f32_le(item.weight);
			}
			self.finish(Tag::BONE, at)?;
		}

		if let Some(mesh) = &node.mesh {
			self.write_mesh(mesh)?;
		}
		Ok(())
	}

	fn write_keys(&mut self, keys: &[Keyframe]) -> Result<()> {
		let at = self.begin(Tag::KEYS);
		self.out.write_i32_le(keys.first().map_or(0, Keyframe::flags));
		for key in keys {
			self.out.write_i32_le(key.frame);
			if let Some(position) = &key.position {
				self.out.write_f32s(position);
			}
			if let Some(scale) = &key.scale {
				self.out.write_f32s(scale);
			}
			if let Some(rotation) = &key.rotation {
				self.out.write_f32s(rotation);
			}
		}
		self.finish(Tag::KEYS, at)
	}

	fn write_mesh(&mut self, mesh: &Mesh) -> Result<()> {
		let format = mesh.vertex_format;
		let tex_len = format.tex_coord_len().ok_or(B3dError::InvalidVertexFormat {
			sets: format.tex_coord_sets,
			size: format.tex_coord_size,
		})?;

		let at = self.begin(Tag::MESH);
		self.out.write_i32_le(mesh.brush_id);

		let vrts = self.begin(Tag::VRTS);
		self.out.write_i32_le(format.flags);
		self.out.write_i32_le(format.tex_coord_sets);
		self.out.write_i32_le(format.tex_coord_size);
		for (vertex_idx, vertex) in mesh.vertices.iter().enumerate() {
			let mismatch = |detail| B3dError::VertexShapeMismatch { vertex: vertex_idx, detail };
			if vertex.normal.is_some() != format.has_normal() {
				return Err(mismatch("normal presence"));
			}
			if vertex.color.is_some() != format.has_color() {
				return Err(mismatch("color presence"));
			}
			if vertex.tex_coords.len() != tex_len {
				return Err(mismatch("tex coord length"));
			}

			self.out.write_f32s(&vertex.position);
			if let Some(normal) = &vertex.normal {
				self.out.write_f32s(normal);
			}
			if let Some(color) = &vertex.color {
				self.out.write_f32s(color);
			}
			self.out.write_f32s(&vertex.tex_coords);
		}
		self.finish(Tag::VRTS, vrts)?;

		let vertex_count = mesh.vertices.len();
		for group in &mesh.triangle_groups {
			let tris = self.begin(Tag::TRIS);
			self.out.write_i32_le(group.brush_id);
			for (triangle, indices) in group.indices.iter().enumerate() {
				if self.opt.reject_invalid_indices
					&& let Some(&index) = indices.iter().find(|index| !usize::try_from(**index).is_ok_and(|index| index < vertex_count))
				{
					return Err(B3dError::InvalidIndexOnEncode {
						triangle,
						index,
						vertex_count,
					});
				}
				self.out.write_i32s(indices);
			}
			self.finish(Tag::TRIS, tris)?;
		}

		self.finish(Tag::MESH, at)
	}
}
