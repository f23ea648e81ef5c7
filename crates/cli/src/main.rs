use clap::Parser;
use tracing::error;
use wms_cli::{cli::Cli, commands, context::CommandContext, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let cli = Cli::parse();
	if let Err(err) = logging::init_logging(cli.verbose, cli.log_dir.as_deref()) {
		eprintln!("failed to initialize logging: {err:#}");
		std::process::exit(1);
	}

	let ctx = CommandContext::new(cli.config);
	if let Err(err) = commands::dispatch(cli.command.unwrap_or_default(), &ctx).await {
		error!(target = "wms", error = %format!("{err:#}"), "command failed");
		std::process::exit(1);
	}
}
