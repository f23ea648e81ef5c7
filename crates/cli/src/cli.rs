use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wms::config::DEFAULT_CONFIG_FILE;

use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "wms")]
#[command(about = "Warehouse portal bot - batches waiting pick orders into pickup waves")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v debug, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Configuration file holding credentials, scope and the session token
	#[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
	pub config: PathBuf,

	/// Also write plain-text logs to hourly rotated files in this directory
	#[arg(long, global = true, value_name = "DIR")]
	pub log_dir: Option<PathBuf>,

	/// Defaults to `run`
	#[command(subcommand)]
	pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Default, PartialEq, Eq)]
pub enum Commands {
	/// Validate the session, log in if needed, and create a wave for waiting orders
	#[default]
	Run,

	/// Check whether the persisted token is still accepted
	Validate,

	/// Log in through the captcha flow and persist the new token
	Login,

	/// List pick orders waiting for a wave
	Orders {
		/// Page number (1-based)
		#[arg(long, default_value_t = 1)]
		page: u32,

		/// Page size (defaults to the configured wave page size)
		#[arg(long)]
		page_size: Option<u32>,

		/// Print the page as JSON
		#[arg(long)]
		json: bool,
	},

	/// Create a pickup wave for every waiting order in scope
	Wave {
		/// Remark attached to the wave (defaults to the configured remark)
		#[arg(long)]
		remark: Option<String>,

		/// Pickup type code (defaults to the configured pickup type)
		#[arg(long)]
		pickup_type: Option<u32>,
	},

	/// Write a configuration template
	Init {
		/// Overwrite an existing file
		#[arg(long, short)]
		force: bool,
	},
}
