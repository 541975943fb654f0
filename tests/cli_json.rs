#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use b3doc::b3d::{Document, Node, decode, encode};
use serde_json::Value;

#[test]
fn info_json_reports_counts() {
	let json = run_json(&["info", &fixture_arg("triangle.b3d"), "--json"]);

	assert_eq!(json["format_version"], 1);
	assert_eq!(json["chunk_count"], 10);
	assert_eq!(json["has_root"], true);
	assert_eq!(json["counts"]["nodes"], 2);
	assert_eq!(json["counts"]["vertices"], 3);
	assert_eq!(json["counts"]["triangles"], 1);
	assert_eq!(json["counts"]["keyframes"], 2);
	assert_eq!(json["issue_count"], 0);
	assert!(json["top_tags"].as_array().is_some_and(|items| !items.is_empty()), "expected tag table");
}

#[test]
fn chunks_json_filters_by_depth_and_tag() {
	let json = run_json(&["chunks", &fixture_arg("triangle.b3d"), "--json", "--max-depth", "1"]);
	let chunks = json["chunks"].as_array().expect("chunks array");
	let tags: Vec<_> = chunks.iter().filter_map(|item| item["tag"].as_str()).collect();
	assert_eq!(tags, vec!["BB3D", "TEXS", "BRUS", "NODE"]);

	let json = run_json(&["chunks", &fixture_arg("triangle.b3d"), "--json", "--tag", "NODE"]);
	let chunks = json["chunks"].as_array().expect("chunks array");
	assert_eq!(chunks.len(), 2);
	assert_eq!(chunks[1]["depth"], 2);
}

#[test]
fn dump_output_is_the_decoded_document() {
	let output = run(&["dump", &fixture_arg("triangle.b3d")]);
	assert!(output.status.success(), "dump failed: {}", String::from_utf8_lossy(&output.stderr));

	let dumped: Document = serde_json::from_slice(&output.stdout).expect("dump is a document");
	let bytes = std::fs::read(fixture_path("triangle.b3d")).expect("fixture reads");
	assert_eq!(dumped, decode(&bytes).expect("decode"));
}

#[test]
fn pack_restores_dumped_document() {
	let output = run(&["dump", &fixture_arg("triangle.b3d")]);
	assert!(output.status.success());

	let json_path = temp_path("pack.json");
	let b3d_path = temp_path("pack.b3d");
	std::fs::write(&json_path, &output.stdout).expect("write json");

	let packed = run(&["pack", &json_path.display().to_string(), &b3d_path.display().to_string()]);
	assert!(packed.status.success(), "pack failed: {}", String::from_utf8_lossy(&packed.stderr));

	let original = std::fs::read(fixture_path("triangle.b3d")).expect("fixture reads");
	let rebuilt = std::fs::read(&b3d_path).expect("packed file reads");
	std::fs::remove_file(&json_path).expect("cleanup json");
	std::fs::remove_file(&b3d_path).expect("cleanup b3d");
	assert_eq!(rebuilt, original);
}

#[test]
fn roundtrip_reports_equality() {
	let output = run(&["roundtrip", &fixture_arg("triangle.b3d"), "--strict"]);
	assert!(output.status.success(), "roundtrip failed: {}", String::from_utf8_lossy(&output.stderr));

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("documents_equal: true"));
	assert!(stdout.contains("byte_identical: true"));
}

#[test]
fn tree_prints_one_line_per_node() {
	let output = run(&["tree", &fixture_arg("triangle.b3d")]);
	assert!(output.status.success());

	let stdout = String::from_utf8_lossy(&output.stdout);
	let lines: Vec<_> = stdout.lines().collect();
	assert_eq!(lines.len(), 2);
	assert!(lines[0].starts_with("root  rot: 0.00,0.00,0.00,1.00  pos: 0.00,0.00,0.00  keys: 2  vertices: 3  groups: 1"));
	assert!(lines[1].starts_with(" child"));
}

#[test]
fn bad_arguments_exit_with_error_message() {
	let output = run(&["info", &fixture_arg("triangle.b3d"), "--index-policy", "lenient"]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: invalid index policy"));

	let output = run(&["chunks", &fixture_arg("triangle.b3d"), "--tag", "TOOLONG"]);
	assert_eq!(output.status.code(), Some(1));
}

#[test]
fn deep_files_stay_usable() {
	let depth = 200_000;
	let path = temp_path("deep.b3d");
	std::fs::write(&path, encode(&chain(depth, [0.0; 3])).expect("encode deep chain")).expect("write deep file");
	let arg = path.display().to_string();

	let json = run_json(&["info", &arg, "--json"]);
	assert_eq!(json["counts"]["nodes"], depth);

	let output = run(&["roundtrip", &arg]);
	assert!(output.status.success(), "roundtrip failed: {}", String::from_utf8_lossy(&output.stderr));
	assert!(String::from_utf8_lossy(&output.stdout).contains("documents_equal: true"));

	let output = run(&["dump", &arg]);
	std::fs::remove_file(&path).expect("cleanup deep file");
	assert_eq!(output.status.code(), Some(1));
	assert!(output.stdout.is_empty());
	assert!(String::from_utf8_lossy(&output.stderr).contains("error: node tree is 200000 levels deep"));
}

#[test]
fn nan_floats_roundtrip_but_not_through_json() {
	let path = temp_path("nan.b3d");
	std::fs::write(&path, encode(&chain(2, [f32::NAN, 1.0, 2.0])).expect("encode")).expect("write nan file");
	let arg = path.display().to_string();

	let output = run(&["roundtrip", &arg]);
	assert!(output.status.success(), "roundtrip failed: {}", String::from_utf8_lossy(&output.stderr));
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("documents_equal: true"));
	assert!(stdout.contains("byte_identical: true"));

	let output = run(&["dump", &arg]);
	std::fs::remove_file(&path).expect("cleanup nan file");
	assert!(output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("1 NaN or infinite float(s)"));

	let json_path = temp_path("nan.json");
	let out_path = temp_path("nan-packed.b3d");
	std::fs::write(&json_path, &output.stdout).expect("write json");
	let packed = run(&["pack", &json_path.display().to_string(), &out_path.display().to_string()]);
	std::fs::remove_file(&json_path).expect("cleanup json");
	assert_eq!(packed.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&packed.stderr).starts_with("error: json"));
	assert!(!out_path.exists());
}

/// Linear node chain whose leaf sits at `leaf_position`.
fn chain(depth: usize, leaf_position: [f32; 3]) -> Document {
	let mut current = Node::default();
	current.name = "leaf".to_owned();
	current.position = leaf_position;
	for _ in 1..depth {
		let mut parent = Node::default();
		parent.name = "n".to_owned();
		parent.children.push(current);
		current = parent;
	}
	Document {
		format_version: 1,
		root_nodes: vec![current],
		..Document::default()
	}
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_b3doc")).args(args).output().expect("command executes")
}

fn run_json(args: &[&str]) -> Value {
	let output = run(args);
	assert!(output.status.success(), "command should succeed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn fixture_path(name: &str) -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn fixture_arg(name: &str) -> String {
	fixture_path(name).display().to_string()
}

fn temp_path(name: &str) -> PathBuf {
	std::env::temp_dir().join(format!("b3doc-cli-{}-{name}", std::process::id()))
}
