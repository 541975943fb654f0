/// Raw chunk tree listing command.
pub mod chunks;
/// JSON document dump command.
pub mod dump;
/// File-level information command.
pub mod info;
/// JSON to `.b3d` encode command.
pub mod pack;
/// Decode/encode fidelity check command.
pub mod roundtrip;
/// Node hierarchy command.
pub mod tree;
/// Shared argument parsing and output helpers.
pub mod util;
