use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use spot_api::SpotApi;

use crate::output::PriceQuote;
use crate::price;

use super::Context;

/// Inspect pricing
#[derive(Args, Debug)]
pub struct PricingCommand {
    #[command(subcommand)]
    action: PricingAction,
}

#[derive(Subcommand, Debug)]
enum PricingAction {
    /// Show the minimum bid for a server class
    Get {
        /// Server class name (e.g., gp.vs1.medium-ord)
        #[arg(long)]
        serverclass: String,
    },
}

impl PricingCommand {
    /// # Errors
    /// Returns configuration, API and rendering failures.
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        match &self.action {
            PricingAction::Get { serverclass } => {
                let (_, client) = ctx.connect()?;
                let raw = client
                    .get_minimum_bid_price(serverclass)
                    .await
                    .with_context(|| format!("failed to get pricing for {serverclass}"))?;
                let quote = PriceQuote {
                    server_class: serverclass.clone(),
                    minimum_bid_price: price::normalize(&raw)?,
                };
                ctx.print_one(&quote)
            }
        }
    }
}
