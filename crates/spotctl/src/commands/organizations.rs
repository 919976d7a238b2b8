use anyhow::{anyhow, Context as _, Result};
use clap::{Args, Subcommand};
use spot_api::{Organization, SpotApi};

use super::Context;

/// Inspect organizations
#[derive(Args, Debug)]
pub struct OrganizationsCommand {
    #[command(subcommand)]
    action: OrganizationsAction,
}

#[derive(Subcommand, Debug)]
enum OrganizationsAction {
    /// List organizations the access token can see
    List,

    /// Show one organization
    Get {
        /// Organization name
        #[arg(long)]
        name: String,
    },
}

impl OrganizationsCommand {
    /// # Errors
    /// Returns configuration, API and rendering failures.
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        let (_, client) = ctx.connect()?;
        match &self.action {
            OrganizationsAction::List => {
                let organizations = client
                    .list_organizations()
                    .await
                    .context("failed to list organizations")?;
                ctx.print_list(&organizations)
            }
            OrganizationsAction::Get { name } => {
                let organization = get_organization(&client, name).await?;
                ctx.print_one(&organization)
            }
        }
    }
}

/// Look up an organization by name. The control plane has no single-item
/// read, so the list is searched.
///
/// # Errors
/// Returns API failures, or an error if no organization has that name.
pub async fn get_organization(api: &dyn SpotApi, name: &str) -> Result<Organization> {
    let organizations = api
        .list_organizations()
        .await
        .context("failed to list organizations")?;
    find_organization(organizations, name)
}

fn find_organization(organizations: Vec<Organization>, name: &str) -> Result<Organization> {
    organizations
        .into_iter()
        .find(|organization| organization.name == name)
        .ok_or_else(|| anyhow!("organization with org '{name}' not found"))
}
