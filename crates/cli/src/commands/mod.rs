mod init;
mod login;
mod orders;
mod run;
mod validate;
mod wave;

use anyhow::Result;

use crate::cli::Commands;
use crate::context::CommandContext;

pub async fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
	match command {
		Commands::Run => run::execute(ctx).await,
		Commands::Validate => validate::execute(ctx).await,
		Commands::Login => login::execute(ctx).await,
		Commands::Orders { page, page_size, json } => orders::execute(ctx, page, page_size, json).await,
		Commands::Wave { remark, pickup_type } => wave::execute(ctx, remark, pickup_type).await,
		Commands::Init { force } => init::execute(ctx, force),
	}
}
