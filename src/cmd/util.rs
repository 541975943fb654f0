use b3doc::b3d::{B3dError, DecodeOptions, IndexPolicy, Result};
use serde::Serialize;

/// Decode switches shared by every command that reads a `.b3d` file.
#[derive(clap::Args)]
pub struct DecodeArgs {
	/// Fail on the first recoverable issue instead of reporting it.
	#[arg(long)]
	pub strict: bool,
	/// Handling of out-of-range triangle indices: flag, clamp, or error.
	#[arg(long, default_value = "flag")]
	pub index_policy: String,
}

impl DecodeArgs {
	pub(crate) fn options(&self) -> Result<DecodeOptions> {
		Ok(DecodeOptions {
			index_policy: parse_index_policy(&self.index_policy)?,
			strict: self.strict,
		})
	}
}

/// Parse a CLI index policy name.
pub(crate) fn parse_index_policy(value: &str) -> Result<IndexPolicy> {
	match value.to_ascii_lowercase().as_str() {
		"flag" => Ok(IndexPolicy::Flag),
		"clamp" => Ok(IndexPolicy::Clamp),
		"error" => Ok(IndexPolicy::Error),
		_ => Err(B3dError::InvalidIndexPolicy { value: value.to_owned() }),
	}
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
	let text = serde_json::to_string_pretty(value)?;
	println!("{text}");
	Ok(())
}

/// Render floats with two decimals, comma separated.
pub(crate) fn fixed2(values: &[f32]) -> String {
	values.iter().map(|value| format!("{value:.2}")).collect::<Vec<_>>().join(",")
}
