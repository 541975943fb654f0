//! Public library API for reading and writing Blitz3D `.b3d` files.

/// Chunk framing, document model, decoder, and encoder.
pub mod b3d;
