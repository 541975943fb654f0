use serde::{Deserialize, Serialize};

/// Three-component vector as stored on the wire.
pub type Vec3 = [f32; 3];

/// Quaternion in wire order `(x, y, z, w)`.
///
/// No handedness or component reordering is applied; that belongs to the consumer.
pub type Quat = [f32; 4];

/// Decoded `.b3d` document: texture and brush tables plus the node forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	/// Version stored in the `BB3D` root chunk.
	pub format_version: i32,
	/// Texture table in file order.
	#[serde(default)]
	pub textures: Vec<Texture>,
	/// Brush table in file order.
	#[serde(default)]
	pub brushes: Vec<Brush>,
	/// Top-level nodes in file order.
	#[serde(default)]
	pub root_nodes: Vec<Node>,
}

impl Document {
	/// Visit every node depth-first in file order, with its nesting depth.
	pub fn walk(&self) -> Vec<(usize, &Node)> {
		let mut out = Vec::new();
		let mut stack: Vec<(usize, &Node)> = self.root_nodes.iter().rev().map(|node| (0, node)).collect();
		while let Some((depth, node)) = stack.pop() {
			out.push((depth, node));
			stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
		}
		out
	}

	/// Total number of nodes at any depth.
	pub fn node_count(&self) -> usize {
		self.walk().len()
	}

	/// Total number of nodes carrying a mesh.
	pub fn mesh_count(&self) -> usize {
		self.walk().into_iter().filter(|(_, node)| node.mesh.is_some()).count()
	}

	/// Number of node levels, 0 for an empty forest.
	pub fn depth(&self) -> usize {
		self.walk().into_iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
	}

	/// Count NaN and infinite values across every float field.
	///
	/// JSON has no spelling for them, so they do not survive `dump` and `pack`.
	pub fn non_finite_floats(&self) -> usize {
		let mut floats: Vec<f32> = Vec::new();
		for texture in &self.textures {
			floats.extend(texture.uv_offset);
			floats.extend(texture.uv_scale);
			floats.push(texture.uv_rotation);
		}
		for brush in &self.brushes {
			floats.extend(brush.color);
			floats.push(brush.shininess);
		}
		for (_, node) in self.walk() {
			floats.extend(node.position);
			floats.extend(node.scale);
			floats.extend(node.rotation);
			floats.extend(node.animation_meta.map(|meta| meta.fps));
			for key in &node.keyframes {
				floats.extend(key.position.into_iter().flatten());
				floats.extend(key.scale.into_iter().flatten());
				floats.extend(key.rotation.into_iter().flatten());
			}
			floats.extend(node.bone_weights.iter().map(|bone| bone.weight));
			for vertex in node.mesh.iter().flat_map(|mesh| &mesh.vertices) {
				floats.extend(vertex.position);
				floats.extend(vertex.normal.into_iter().flatten());
				floats.extend(vertex.color.into_iter().flatten());
				floats.extend(&vertex.tex_coords);
			}
		}
		floats.into_iter().filter(|value| !value.is_finite()).count()
	}
}

/// Named transform frame.
///
/// Dropping, cloning, and comparing walk the subtree with an explicit stack, so
/// trees of any depth are safe to handle after a successful decode.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Node {
	/// Node name.
	pub name: String,
	/// Local translation.
	pub position: Vec3,
	/// Local scale.
	pub scale: Vec3,
	/// Local rotation in wire order.
	pub rotation: Quat,
	/// Child nodes in file order.
	#[serde(default)]
	pub children: Vec<Node>,
	/// Mesh attached to this node.
	#[serde(default)]
	pub mesh: Option<Mesh>,
	/// Animation header from `ANIM`.
	#[serde(default)]
	pub animation_meta: Option<AnimationMeta>,
	/// Keyframes from all `KEYS` chunks, in file order.
	#[serde(default)]
	pub keyframes: Vec<Keyframe>,
	/// Skinning weights when this node acts as a bone.
	#[serde(default)]
	pub bone_weights: Vec<BoneWeight>,
}

impl Node {
	/// Copy of this node with every field except `children`.
	fn without_children(&self) -> Node {
		Node {
			name: self.name.clone(),
			position: self.position,
			scale: self.scale,
			rotation: self.rotation,
			children: Vec::new(),
			mesh: self.mesh.clone(),
			animation_meta: self.animation_meta,
			keyframes: self.keyframes.clone(),
			bone_weights: self.bone_weights.clone(),
		}
	}

	/// Compare every field except `children`.
	fn same_fields(&self, other: &Node) -> bool {
		self.name == other.name
			&& self.position == other.position
			&& self.scale == other.scale
			&& self.rotation == other.rotation
			&& self.mesh == other.mesh
			&& self.animation_meta == other.animation_meta
			&& self.keyframes == other.keyframes
			&& self.bone_weights == other.bone_weights
	}
}

impl Drop for Node {
	fn drop(&mut self) {
		let mut pending = std::mem::take(&mut self.children);
		while let Some(mut node) = pending.pop() {
			pending.append(&mut node.children);
		}
	}
}

impl Clone for Node {
	fn clone(&self) -> Self {
		struct Frame<'n> {
			source: &'n Node,
			copy: Node,
			next: usize,
		}

		let mut stack = vec![Frame {
			source: self,
			copy: self.without_children(),
			next: 0,
		}];
		let mut root = None;

		while let Some(frame) = stack.last_mut() {
			let source = frame.source;
			if let Some(child) = source.children.get(frame.next) {
				frame.next += 1;
				stack.push(Frame {
					source: child,
					copy: child.without_children(),
					next: 0,
				});
				continue;
			}

			let Some(done) = stack.pop() else { break };
			match stack.last_mut() {
				Some(parent) => parent.copy.children.push(done.copy),
				None => root = Some(done.copy),
			}
		}

		root.unwrap_or_default()
	}
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		let mut pending = vec![(self, other)];
		while let Some((left, right)) = pending.pop() {
			if !left.same_fields(right) || left.children.len() != right.children.len() {
				return false;
			}
			pending.extend(left.children.iter().zip(&right.children));
		}
		true
	}
}

/// Node animation header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationMeta {
	/// Animation flags.
	pub flags: i32,
	/// Number of frames.
	pub frame_count: i32,
	/// Playback rate.
	pub fps: f32,
}

/// One bone influence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
	/// Vertex id within the skinned mesh.
	pub vertex_id: i32,
	/// Influence weight.
	pub weight: f32,
}

/// One animation sample; each channel is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
	/// Frame number.
	pub frame: i32,
	/// Translation, `KEYS` flag bit 0.
	pub position: Option<Vec3>,
	/// Scale, `KEYS` flag bit 1.
	pub scale: Option<Vec3>,
	/// Rotation, `KEYS` flag bit 2.
	pub rotation: Option<Quat>,
}

impl Keyframe {
	/// `KEYS` flags describing the channels present on this key.
	pub fn flags(&self) -> i32 {
		let mut flags = 0;
		if self.position.is_some() {
			flags |= KEY_POSITION;
		}
		if self.scale.is_some() {
			flags |= KEY_SCALE;
		}
		if self.rotation.is_some() {
			flags |= KEY_ROTATION;
		}
		flags
	}
}

/// `KEYS` flag bit for a position channel.
pub const KEY_POSITION: i32 = 1;
/// `KEYS` flag bit for a scale channel.
pub const KEY_SCALE: i32 = 2;
/// `KEYS` flag bit for a rotation channel.
pub const KEY_ROTATION: i32 = 4;

/// `VRTS` flag bit for per-vertex normals.
pub const VERTEX_NORMAL: i32 = 1;
/// `VRTS` flag bit for per-vertex RGBA color.
pub const VERTEX_COLOR: i32 = 2;

/// Vertex-block header shared by every vertex in one mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexFormat {
	/// `VRTS` flags.
	pub flags: i32,
	/// Number of texture coordinate sets.
	pub tex_coord_sets: i32,
	/// Floats per texture coordinate set.
	pub tex_coord_size: i32,
}

impl VertexFormat {
	/// Whether vertices carry a normal.
	pub fn has_normal(&self) -> bool {
		self.flags & VERTEX_NORMAL != 0
	}

	/// Whether vertices carry an RGBA color.
	pub fn has_color(&self) -> bool {
		self.flags & VERTEX_COLOR != 0
	}

	/// Number of texture coordinate floats per vertex, `None` if negative or overflowing.
	pub fn tex_coord_len(&self) -> Option<usize> {
		let sets = usize::try_from(self.tex_coord_sets).ok()?;
		let size = usize::try_from(self.tex_coord_size).ok()?;
		sets.checked_mul(size)
	}

	/// Encoded width of one vertex record in bytes.
	pub fn stride(&self) -> Option<usize> {
		let mut floats = 3_usize;
		if self.has_normal() {
			floats += 3;
		}
		if self.has_color() {
			floats += 4;
		}
		floats.checked_add(self.tex_coord_len()?)?.checked_mul(4)
	}
}

/// Mesh attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
	/// Brush index, or -1 for none.
	pub brush_id: i32,
	/// Header of the vertex block; fixes the shape of every vertex.
	pub vertex_format: VertexFormat,
	/// Vertices; the position is the vertex id.
	#[serde(default)]
	pub vertices: Vec<Vertex>,
	/// One group per `TRIS` chunk.
	#[serde(default)]
	pub triangle_groups: Vec<TriangleGroup>,
}

impl Mesh {
	/// Total triangles across all groups.
	pub fn triangle_count(&self) -> usize {
		self.triangle_groups.iter().map(|group| group.indices.len()).sum()
	}
}

/// One vertex record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
	/// Vertex position.
	pub position: Vec3,
	/// Normal, present iff the format has the normal bit.
	#[serde(default)]
	pub normal: Option<Vec3>,
	/// RGBA color, present iff the format has the color bit.
	#[serde(default)]
	pub color: Option<[f32; 4]>,
	/// Flat texture coordinates, `sets * size` floats.
	#[serde(default)]
	pub tex_coords: Vec<f32>,
}

/// Triangles from one `TRIS` chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleGroup {
	/// Brush index overriding the mesh brush, or -1.
	pub brush_id: i32,
	/// Zero-based vertex index triples.
	#[serde(default)]
	pub indices: Vec<[i32; 3]>,
	/// Positions in `indices` whose triangles reference a missing vertex.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub invalid: Vec<usize>,
}

/// Material record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brush {
	/// Brush name.
	pub name: String,
	/// RGBA color.
	pub color: [f32; 4],
	/// Specular shininess.
	pub shininess: f32,
	/// Blend mode.
	pub blend_mode: i32,
	/// Effect flags.
	pub fx_flags: i32,
	/// Texture index per slot, -1 for an empty slot.
	#[serde(default)]
	pub texture_ids: Vec<i32>,
}

/// Texture record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
	/// Image base name; resolving it to a file is up to the consumer.
	pub name: String,
	/// Texture flags.
	pub flags: i32,
	/// Blend mode.
	pub blend_mode: i32,
	/// UV translation.
	pub uv_offset: [f32; 2],
	/// UV scale.
	pub uv_scale: [f32; 2],
	/// UV rotation in radians.
	pub uv_rotation: f32,
}
