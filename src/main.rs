#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "b3doc", about = "Blitz3D .b3d inspection and conversion tools")]
struct Cli {
	/// Log decode and encode progress at debug level.
	#[arg(short, long, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Show document counts and chunk statistics.
	Info(cmd::info::Args),
	/// List the raw chunk tree.
	Chunks(cmd::chunks::Args),
	/// Print the node hierarchy.
	Tree(cmd::tree::Args),
	/// Print the decoded document as JSON.
	Dump(cmd::dump::Args),
	/// Encode a JSON document into a .b3d file.
	Pack(cmd::pack::Args),
	/// Decode, re-encode, and compare.
	Roundtrip(cmd::roundtrip::Args),
}

fn main() {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli.command) {
		Ok(true) => {}
		Ok(false) => std::process::exit(2),
		Err(err) => {
			eprintln!("error: {err}");
			std::process::exit(1);
		}
	}
}

fn init_logging(verbose: bool) {
	if verbose {
		env_logger::Builder::new().filter(None, log::LevelFilter::Debug).init();
	} else {
		env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
	}
}

fn run(command: Commands) -> b3doc::b3d::Result<bool> {
	match command {
		Commands::Info(args) => cmd::info::run(args).map(|()| true),
		Commands::Chunks(args) => cmd::chunks::run(args).map(|()| true),
		Commands::Tree(args) => cmd::tree::run(args).map(|()| true),
		Commands::Dump(args) => cmd::dump::run(args).map(|()| true),
		Commands::Pack(args) => cmd::pack::run(args).map(|()| true),
		Commands::Roundtrip(args) => cmd::roundtrip::run(args),
	}
}
