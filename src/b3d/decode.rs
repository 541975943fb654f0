use log::{debug, trace, warn};

use crate::b3d::bytes::Cursor;
use crate::b3d::model::{KEY_POSITION, KEY_ROTATION, KEY_SCALE};
use crate::b3d::{
	AnimationMeta, B3dError, BoneWeight, Brush, ChunkHeader, Document, Keyframe, Mesh, Node, Result, Tag, Texture, TriangleGroup, Vertex, VertexFormat,
};

/// How triangle indices that do not address a vertex are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexPolicy {
	/// Keep the triangle, list it in [`TriangleGroup::invalid`], and report an issue.
	#[default]
	Flag,
	/// Clamp each bad index into range and report an issue; drop the triangle if the mesh has no vertices.
	Clamp,
	/// Abort the whole decode with [`B3dError::IndexOutOfRange`].
	Error,
}

/// Behavior switches for decoding.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
	/// Handling of out-of-range triangle indices.
	pub index_policy: IndexPolicy,
	/// Treat every recoverable issue as a hard failure.
	pub strict: bool,
}

impl DecodeOptions {
	/// Preset that rejects anything a lenient decode would only report.
	pub fn strict() -> Self {
		Self {
			index_policy: IndexPolicy::Error,
			strict: true,
		}
	}
}

/// A recoverable problem that aborted one chunk without stopping the decode.
#[derive(Debug)]
pub struct DecodeIssue {
	/// Header offset of the affected chunk.
	pub offset: usize,
	/// Tag of the affected chunk.
	pub chunk: Tag,
	/// What went wrong.
	pub error: B3dError,
}

/// Decoded document plus every issue recovered from along the way.
#[derive(Debug)]
pub struct Decoded {
	/// Decoded document; possibly partial when `issues` is non-empty.
	pub document: Document,
	/// Recovered issues in file order.
	pub issues: Vec<DecodeIssue>,
}

/// Decode a `.b3d` buffer with default options, discarding recovered issues.
///
/// Issues are still logged at `warn` level.
pub fn decode(bytes: &[u8]) -> Result<Document> {
	decode_with(bytes, &DecodeOptions::default()).map(|decoded| decoded.document)
}

/// Decode a `.b3d` buffer and return the document with its issue report.
pub fn decode_with(bytes: &[u8], opt: &DecodeOptions) -> Result<Decoded> {
	let mut decoder = Decoder {
		cursor: Cursor::new(bytes),
		opt,
		document: Document::default(),
		issues: Vec::new(),
	};
	let limit = decoder.cursor.limit();
	decoder.parse_sections(limit, true)?;

	Ok(Decoded {
		document: decoder.document,
		issues: decoder.issues,
	})
}

struct Decoder<'a, 'o> {
	cursor: Cursor<'a>,
	opt: &'o DecodeOptions,
	document: Document,
	issues: Vec<DecodeIssue>,
}

struct NodeFrame {
	node: Node,
	end: usize,
}

impl<'a> Decoder<'a, '_> {
	/// Dispatch `BB3D`/`TEXS`/`BRUS`/`NODE` chunks until `limit`.
	fn parse_sections(&mut self, limit: usize, top_level: bool) -> Result<()> {
		while self.cursor.pos() < limit {
			let header = ChunkHeader::read(&mut self.cursor, limit)?;
			trace!("chunk {} at {} size {}", header.tag, header.offset, header.size);

			match header.kind() {
				Tag::BB3D if top_level => self.parse_root(&header)?,
				Tag::TEXS => {
					let result = self.parse_textures(&header);
					self.settle(&header, result)?;
				}
				Tag::BRUS => {
					let result = self.parse_brushes(&header);
					self.settle(&header, result)?;
				}
				Tag::NODE => {
					if let Some(node) = self.parse_node_tree(&header)? {
						self.document.root_nodes.push(node);
					}
				}
				_ => debug!("skipping {} chunk at {}", header.tag, header.offset),
			}

			header.skip(&mut self.cursor);
		}
		Ok(())
	}

	fn parse_root(&mut self, header: &ChunkHeader) -> Result<()> {
		let mut body = header.body(&self.cursor);
		match body.read_i32_le() {
			Ok(version) => {
				debug!("BB3D version {version}");
				self.document.format_version = version;
				self.cursor.seek(body.pos());
				self.parse_sections(header.end, false)
			}
			Err(err) => self.recover(header, err),
		}
	}

	fn parse_textures(&mut self, header: &ChunkHeader) -> Result<()> {
		let mut body = header.body(&self.cursor);
		while body.remaining() > 0 {
			let name = body.read_cstring()?;
			let flags = body.read_i32_le()?;
			let blend_mode = body.read_i32_le()?;
			let uv_offset = body.read_f32_array()?;
			let uv_scale = body.read_f32_array()?;
			let uv_rotation = body.read_f32_le()?;
			self.document.textures.push(Texture {
				name,
				flags,
				blend_mode,
				uv_offset,
				uv_scale,
				uv_rotation,
			});
		}
		Ok(())
	}

	fn parse_brushes(&mut self, header: &ChunkHeader) -> Result<()> {
		let mut body = header.body(&self.cursor);
		let slots = usize::try_from(body.read_i32_le()?).unwrap_or(0);
		while body.remaining() > 0 {
			let name = body.read_cstring()?;
			let color = body.read_f32_array()?;
			let shininess = body.read_f32_le()?;
			let blend_mode = body.read_i32_le()?;
			let fx_flags = body.read_i32_le()?;
			let texture_ids = body.read_i32s(slots)?;
			self.document.brushes.push(Brush {
				name,
				color,
				shininess,
				blend_mode,
				fx_flags,
				texture_ids,
			});
		}
		Ok(())
	}

	/// Parse a `NODE` chunk and all of its descendants without recursion.
	fn parse_node_tree(&mut self, header: &ChunkHeader) -> Result<Option<Node>> {
		let Some(root) = self.begin_node(header)? else {
			return Ok(None);
		};
		let mut stack = vec![root];

		while let Some(frame) = stack.last() {
			let end = frame.end;
			if self.cursor.pos() >= end {
				self.cursor.seek(end);
				let Some(done) = stack.pop() else { break };
				match stack.last_mut() {
					Some(parent) => parent.node.children.push(done.node),
					None => return Ok(Some(done.node)),
				}
				continue;
			}

			let child = ChunkHeader::read(&mut self.cursor, end)?;
			if child.kind() == Tag::NODE {
				match self.begin_node(&child)? {
					Some(frame) => stack.push(frame),
					None => child.skip(&mut self.cursor),
				}
				continue;
			}

			if let Some(frame) = stack.last_mut() {
				self.parse_node_child(&child, &mut frame.node)?;
			}
			child.skip(&mut self.cursor);
		}

		Ok(None)
	}

	/// Read the fixed node prefix and leave the cursor at its first child.
	fn begin_node(&mut self, header: &ChunkHeader) -> Result<Option<NodeFrame>> {
		let mut body = header.body(&self.cursor);
		let node = match read_node_prefix(&mut body) {
			Ok(node) => node,
			Err(err) => {
				self.recover(header, err)?;
				return Ok(None);
			}
		};

		trace!("node {:?} at {}", node.name, header.offset);
		self.cursor.seek(body.pos());
		Ok(Some(NodeFrame { node, end: header.end }))
	}

	fn parse_node_child(&mut self, child: &ChunkHeader, node: &mut Node) -> Result<()> {
		let mut body = child.body(&self.cursor);
		match child.kind() {
			Tag::ANIM => {
				let result = read_anim(&mut body).map(|meta| node.animation_meta = Some(meta));
				self.settle(child, result)
			}
			Tag::KEYS => {
				let result = read_keys(&mut body, &mut node.keyframes);
				self.settle(child, result)
			}
			Tag::BONE => {
				let result = read_bone(&mut body, &mut node.bone_weights);
				self.settle(child, result)
			}
			Tag::MESH => match self.parse_mesh(child) {
				Ok(mesh) => {
					if node.mesh.is_some() {
						debug!("node {:?} has more than one MESH, keeping the last", node.name);
					}
					node.mesh = Some(mesh);
					Ok(())
				}
				Err(err @ B3dError::IndexOutOfRange { .. }) => Err(err),
				Err(err) => self.recover(child, err),
			},
			_ => {
				debug!("skipping {} chunk inside node {:?} at {}", child.tag, node.name, child.offset);
				Ok(())
			}
		}
	}

	fn parse_mesh(&mut self, header: &ChunkHeader) -> Result<Mesh> {
		let mut body = header.body(&self.cursor);
		let brush_id = body.read_i32_le()?;

		let vrts = ChunkHeader::read(&mut body, header.end)?;
		if vrts.kind() != Tag::VRTS {
			return Err(B3dError::UnexpectedChunkOrder {
				at: vrts.offset,
				parent: Tag::MESH,
				expected: Tag::VRTS,
				got: vrts.tag,
			});
		}
		let (vertex_format, vertices) = read_vertices(&mut vrts.body(&body))?;
		vrts.skip(&mut body);

		let mut triangle_groups = Vec::new();
		while body.remaining() > 0 {
			let tris = ChunkHeader::read(&mut body, header.end)?;
			if tris.kind() != Tag::TRIS {
				debug!("skipping {} chunk inside MESH at {}", tris.tag, tris.offset);
				tris.skip(&mut body);
				continue;
			}

			match self.parse_tris(&tris, &body, vertices.len()) {
				Ok(group) => triangle_groups.push(group),
				Err(err @ B3dError::IndexOutOfRange { .. }) => return Err(err),
				Err(err) => self.recover(&tris, err)?,
			}
			tris.skip(&mut body);
		}

		Ok(Mesh {
			brush_id,
			vertex_format,
			vertices,
			triangle_groups,
		})
	}

	/// Read one `TRIS` group, applying the index policy.
	fn parse_tris(&mut self, header: &ChunkHeader, parent: &Cursor<'a>, vertex_count: usize) -> Result<TriangleGroup> {
		let mut body = header.body(parent);
		let brush_id = body.read_i32_le()?;
		let mut group = TriangleGroup {
			brush_id,
			indices: Vec::new(),
			invalid: Vec::new(),
		};

		while body.remaining() > 0 {
			let at = body.pos();
			let mut triangle = [body.read_i32_le()?, body.read_i32_le()?, body.read_i32_le()?];
			let Some(&index) = triangle.iter().find(|index| !in_range(**index, vertex_count)) else {
				group.indices.push(triangle);
				continue;
			};

			let err = B3dError::IndexOutOfRange {
				at,
				triangle: group.indices.len(),
				index,
				vertex_count,
			};
			match self.opt.index_policy {
				IndexPolicy::Error => return Err(err),
				IndexPolicy::Flag => {
					self.report(header, err)?;
					group.invalid.push(group.indices.len());
					group.indices.push(triangle);
				}
				IndexPolicy::Clamp => {
					self.report(header, err)?;
					if vertex_count == 0 {
						continue;
					}
					let max = i32::try_from(vertex_count - 1).unwrap_or(i32::MAX);
					for index in &mut triangle {
						*index = (*index).clamp(0, max);
					}
					group.indices.push(triangle);
				}
			}
		}

		Ok(group)
	}

	/// Turn a chunk-scoped failure into a recorded issue when allowed.
	fn settle(&mut self, header: &ChunkHeader, result: Result<()>) -> Result<()> {
		match result {
			Ok(()) => Ok(()),
			Err(err) => self.recover(header, err),
		}
	}

	fn recover(&mut self, header: &ChunkHeader, err: B3dError) -> Result<()> {
		if !err.is_recoverable() {
			return Err(err);
		}
		self.report(header, err)
	}

	fn report(&mut self, header: &ChunkHeader, err: B3dError) -> Result<()> {
		if self.opt.strict {
			return Err(err);
		}

		warn!("{} chunk at offset {}: {err}", header.kind(), header.offset);
		self.issues.push(DecodeIssue {
			offset: header.offset,
			chunk: header.kind(),
			error: err,
		});
		Ok(())
	}
}

fn in_range(index: i32, vertex_count: usize) -> bool {
	usize::try_from(index).is_ok_and(|index| index < vertex_count)
}

fn read_node_prefix(body: &mut Cursor<'_>) -> Result<Node> {
	let name = body.read_cstring()?;
	let position = body.read_f32_array()?;
	let scale = body.read_f32_array()?;
	let rotation = body.read_f32_array()?;
	let mut node = Node::default();
	node.name = name;
	node.position = position;
	node.scale = scale;
	node.rotation = rotation;
	Ok(node)
}

fn read_anim(body: &mut Cursor<'_>) -> Result<AnimationMeta> {
	Ok(AnimationMeta {
		flags: body.read_i32_le()?,
		frame_count: body.read_i32_le()?,
		fps: body.read_f32_le()?,
	})
}

/// Append keys to `out`; keys read before a failure are kept.
fn read_keys(body: &mut Cursor<'_>, out: &mut Vec<Keyframe>) -> Result<()> {
	let flags = body.read_i32_le()?;
	while body.remaining() > 0 {
		let frame = body.read_i32_le()?;
		let position = if flags & KEY_POSITION != 0 { Some(body.read_f32_array()?) } else { None };
		let scale = if flags & KEY_SCALE != 0 { Some(body.read_f32_array()?) } else { None };
		let rotation = if flags & KEY_ROTATION != 0 { Some(body.read_f32_array()?) } else { None };
		out.push(Keyframe {
			frame,
			position,
			scale,
			rotation,
		});
	}
	Ok(())
}

fn read_bone(body: &mut Cursor<'_>, out: &mut Vec<BoneWeight>) -> Result<()> {
	while body.remaining() > 0 {
		let vertex_id = body.read_i32_le()?;
		let weight = body.read_f32_le()?;
		out.push(BoneWeight { vertex_id, weight });
	}
	Ok(())
}

fn read_vertices(body: &mut Cursor<'_>) -> Result<(VertexFormat, Vec<Vertex>)> {
	let format = VertexFormat {
		flags: body.read_i32_le()?,
		tex_coord_sets: body.read_i32_le()?,
		tex_coord_size: body.read_i32_le()?,
	};
	let (Some(tex_len), Some(stride)) = (format.tex_coord_len(), format.stride()) else {
		return Err(B3dError::InvalidVertexFormat {
			sets: format.tex_coord_sets,
			size: format.tex_coord_size,
		});
	};

	// Every vertex carries at least a position, so the stride is never zero.
	let mut vertices = Vec::with_capacity(body.remaining() / stride);
	while body.remaining() > 0 {
		let position = body.read_f32_array()?;
		let normal = if format.has_normal() { Some(body.read_f32_array()?) } else { None };
		let color = if format.has_color() { Some(body.read_f32_array()?) } else { None };
		let tex_coords = body.read_f32s(tex_len)?;
		vertices.push(Vertex {
			position,
			normal,
			color,
			tex_coords,
		});
	}
	Ok((format, vertices))
}
