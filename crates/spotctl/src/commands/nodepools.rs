use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use spot_api::SpotApi;

use crate::saga::ResourceKind;
use crate::ui;

use super::{confirm_delete, resolve_org, Context};

/// Inspect and delete node pools
#[derive(Args, Debug)]
pub struct NodepoolsCommand {
    #[command(subcommand)]
    kind: NodepoolKind,
}

#[derive(Subcommand, Debug)]
enum NodepoolKind {
    /// Spot node pools
    Spot {
        #[command(subcommand)]
        action: NodepoolAction,
    },

    /// On-demand node pools
    Ondemand {
        #[command(subcommand)]
        action: NodepoolAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum NodepoolAction {
    /// List the node pools of a cloudspace
    List {
        /// Cloudspace name
        #[arg(long)]
        cloudspace: String,

        /// Organization (defaults to the configured org)
        #[arg(long)]
        org: Option<String>,
    },

    /// Show one node pool
    Get {
        /// Node pool name
        #[arg(long)]
        name: String,

        /// Organization (defaults to the configured org)
        #[arg(long)]
        org: Option<String>,
    },

    /// Delete a node pool
    Delete {
        /// Node pool name
        #[arg(long)]
        name: String,

        /// Organization (defaults to the configured org)
        #[arg(long)]
        org: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl NodepoolsCommand {
    /// # Errors
    /// Returns configuration, API and rendering failures.
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        let (config, client) = ctx.connect()?;
        match &self.kind {
            NodepoolKind::Spot { action } => match action {
                NodepoolAction::List { cloudspace, org } => {
                    let org = resolve_org(org.as_deref(), &config)?;
                    let pools = client
                        .list_spot_pools(&org, cloudspace)
                        .await
                        .context("failed to list spot node pools")?;
                    ctx.print_list(&pools)
                }
                NodepoolAction::Get { name, org } => {
                    let org = resolve_org(org.as_deref(), &config)?;
                    let pool = client
                        .get_spot_pool(&org, name)
                        .await
                        .with_context(|| format!("failed to get spot node pool '{name}'"))?;
                    ctx.print_one(&pool)
                }
                NodepoolAction::Delete { name, org, yes } => {
                    let org = resolve_org(org.as_deref(), &config)?;
                    delete_pool(&client, ResourceKind::SpotPool, &org, name, *yes).await
                }
            },
            NodepoolKind::Ondemand { action } => match action {
                NodepoolAction::List { cloudspace, org } => {
                    let org = resolve_org(org.as_deref(), &config)?;
                    let pools = client
                        .list_on_demand_pools(&org, cloudspace)
                        .await
                        .context("failed to list on-demand node pools")?;
                    ctx.print_list(&pools)
                }
                NodepoolAction::Get { name, org } => {
                    let org = resolve_org(org.as_deref(), &config)?;
                    let pool = client
                        .get_on_demand_pool(&org, name)
                        .await
                        .with_context(|| format!("failed to get on-demand node pool '{name}'"))?;
                    ctx.print_one(&pool)
                }
                NodepoolAction::Delete { name, org, yes } => {
                    let org = resolve_org(org.as_deref(), &config)?;
                    delete_pool(&client, ResourceKind::OnDemandPool, &org, name, *yes).await
                }
            },
        }
    }
}

async fn delete_pool(
    api: &dyn SpotApi,
    kind: ResourceKind,
    org: &str,
    name: &str,
    yes: bool,
) -> Result<()> {
    if !yes && !confirm_delete(&format!("Delete {kind} '{name}'?"))? {
        ui::print_info("Delete aborted.");
        return Ok(());
    }

    let result = match kind {
        ResourceKind::SpotPool => api.delete_spot_pool(org, name).await,
        ResourceKind::OnDemandPool => api.delete_on_demand_pool(org, name).await,
        ResourceKind::Cloudspace => api.delete_cloudspace(org, name).await,
    };
    result.with_context(|| format!("failed to delete {kind} '{name}'"))?;
    ui::print_success(&format!("{kind} '{name}' deleted"));
    Ok(())
}
