use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use spot_api::SpotApi;
use tracing::debug;

use crate::ui;

use super::create::CreateCommand;
use super::{confirm_delete, resolve_org, Context};

/// Manage cloudspaces
#[derive(Args, Debug)]
pub struct CloudspacesCommand {
    #[command(subcommand)]
    action: CloudspacesAction,
}

#[derive(Subcommand, Debug)]
enum CloudspacesAction {
    /// Create a cloudspace with its node pools
    Create(CreateCommand),

    /// Show one cloudspace
    Get {
        /// Cloudspace name
        #[arg(long)]
        name: String,

        /// Organization (defaults to the configured org)
        #[arg(long)]
        org: Option<String>,
    },

    /// List cloudspaces in an organization
    List {
        /// Organization (defaults to the configured org)
        #[arg(long)]
        org: Option<String>,
    },

    /// Save the kubeconfig of a cloudspace
    GetConfig {
        /// Cloudspace name
        #[arg(long)]
        name: String,

        /// Organization (defaults to the configured org)
        #[arg(long)]
        org: Option<String>,

        /// Directory to save `<name>.yaml` in (default: ~/.kube)
        #[arg(long, value_name = "DIR")]
        file: Option<PathBuf>,
    },

    /// Delete a cloudspace
    Delete {
        /// Cloudspace name
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

impl CloudspacesCommand {
    /// # Errors
    /// Returns configuration, API and rendering failures.
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        match &self.action {
            CloudspacesAction::Create(create) => create.run(ctx).await,
            CloudspacesAction::Get { name, org } => {
                let (config, client) = ctx.connect()?;
                let org = resolve_org(org.as_deref(), &config)?;
                let cloudspace = client
                    .get_cloudspace(&org, name)
                    .await
                    .with_context(|| format!("failed to get cloudspace '{name}'"))?;
                ctx.print_one(&cloudspace)
            }
            CloudspacesAction::List { org } => {
                let (config, client) = ctx.connect()?;
                let org = resolve_org(org.as_deref(), &config)?;
                let cloudspaces = client
                    .list_cloudspaces(&org)
                    .await
                    .context("failed to list cloudspaces")?;
                ctx.print_list(&cloudspaces)
            }
            CloudspacesAction::GetConfig { name, org, file } => {
                let (config, client) = ctx.connect()?;
                let org = resolve_org(org.as_deref(), &config)?;
                let path = save_kubeconfig(&client, &org, name, file.as_deref()).await?;
                println!("Config has been saved to {} successfully", path.display());
                Ok(())
            }
            CloudspacesAction::Delete { name, org, yes } => {
                let (config, client) = ctx.connect()?;
                let org = resolve_org(org.as_deref(), &config)?;
                let prompt = format!("Delete cloudspace '{name}' and all of its node pools?");
                if !yes && !confirm_delete(&prompt)? {
                    ui::print_info("Delete aborted.");
                    return Ok(());
                }
                client
                    .delete_cloudspace(&org, name)
                    .await
                    .with_context(|| format!("failed to delete cloudspace '{name}'"))?;
                ui::print_success(&format!("Cloudspace '{name}' deleted"));
                Ok(())
            }
        }
    }
}

/// Where the kubeconfig of cloudspace `name` is written: `<dir>/<name>.yaml`,
/// or `~/.kube/<name>.yaml` without a directory.
///
/// # Errors
/// Returns an error if no directory is given and the home directory is unknown.
pub fn kubeconfig_path(name: &str, dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::home_dir()
            .context("could not determine home directory")?
            .join(".kube"),
    };
    Ok(dir.join(format!("{name}.yaml")))
}

/// Fetch the kubeconfig of a cloudspace and write it to disk.
///
/// # Errors
/// Returns API failures and file system errors.
pub async fn save_kubeconfig(
    api: &dyn SpotApi,
    org: &str,
    name: &str,
    dir: Option<&Path>,
) -> Result<PathBuf> {
    let kubeconfig = api
        .get_cloudspace_config(org, name)
        .await
        .with_context(|| format!("failed to get config of cloudspace '{name}'"))?;

    let path = kubeconfig_path(name, dir)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, kubeconfig)
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    debug!(cloudspace = %name, path = %path.display(), "Kubeconfig written");
    Ok(path)
}
