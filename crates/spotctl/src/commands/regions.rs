use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use spot_api::SpotApi;

use super::Context;

/// Inspect regions
#[derive(Args, Debug)]
pub struct RegionsCommand {
    #[command(subcommand)]
    action: RegionsAction,
}

#[derive(Subcommand, Debug)]
enum RegionsAction {
    /// List regions cloudspaces can be created in
    List,
}

impl RegionsCommand {
    /// # Errors
    /// Returns configuration, API and rendering failures.
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        match self.action {
            RegionsAction::List => {
                let (_, client) = ctx.connect()?;
                let regions = client.list_regions().await.context("failed to list regions")?;
                ctx.print_list(&regions)
            }
        }
    }
}
