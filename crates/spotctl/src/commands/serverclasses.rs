use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use spot_api::SpotApi;

use super::Context;

/// Inspect server classes
#[derive(Args, Debug)]
pub struct ServerclassesCommand {
    #[command(subcommand)]
    action: ServerclassesAction,
}

#[derive(Subcommand, Debug)]
enum ServerclassesAction {
    /// List server classes with their current pricing
    List {
        /// Region (defaults to the configured region)
        #[arg(long)]
        region: Option<String>,
    },
}

impl ServerclassesCommand {
    /// # Errors
    /// Returns configuration, API and rendering failures.
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        match &self.action {
            ServerclassesAction::List { region } => {
                let (config, client) = ctx.connect()?;
                let region = region.as_deref().unwrap_or(&config.region).trim();
                if region.is_empty() {
                    bail!("region not specified (use --region or set region in ~/.spot_config)");
                }
                let classes = client
                    .list_server_classes(region)
                    .await
                    .with_context(|| format!("failed to list server classes in {region}"))?;
                ctx.print_list(&classes)
            }
        }
    }
}
