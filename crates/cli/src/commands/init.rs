use anyhow::{Context, Result, bail};
use colored::Colorize;
use wms::{ConfigStore, PortalConfig};

use crate::context::CommandContext;

fn template() -> PortalConfig {
	PortalConfig {
		account: "operator@example.com".into(),
		password: "change-me".into(),
		warehouse_id: "WAREHOUSE_ID".into(),
		customer_ids: vec!["CUSTOMER_ID".into()],
		ocr_endpoint: "http://127.0.0.1:9898/ocr".into(),
		..Default::default()
	}
}

pub fn execute(ctx: &CommandContext, force: bool) -> Result<()> {
	let path = ctx.config_path();
	if path.exists() && !force {
		bail!("{} already exists (use --force to overwrite)", path.display());
	}

	ctx.store()
		.save(&template())
		.with_context(|| format!("writing {}", path.display()))?;
	println!("{}", format!("wrote config template to {}", path.display()).green());
	Ok(())
}
