use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use spot_api::{CloudSpace, SpotApi};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::acquire::{acquire, CreateOptions};
use crate::config::SpotConfig;
use crate::saga::{ProvisioningSaga, SagaError};
use crate::ui;
use crate::validate::validate;
use crate::wizard::{Prompter, TerminalPrompter};

use super::Context;

/// Create a cloudspace with its node pools.
///
/// Without any flag an interactive wizard collects the parameters.
#[derive(Args, Debug, Default)]
pub struct CreateCommand {
    /// Request file (.yaml, .yml or .json); excludes every other flag
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cloudspace name
    #[arg(long)]
    name: Option<String>,

    /// Organization (defaults to the configured org)
    #[arg(long)]
    org: Option<String>,

    /// Region code (e.g., us-central-ord-1)
    #[arg(long)]
    region: Option<String>,

    /// Kubernetes version
    #[arg(long, value_name = "VERSION")]
    kubernetes_version: Option<String>,

    /// CNI plugin
    #[arg(long)]
    cni: Option<String>,

    /// Endpoint notified before spot nodes are preempted
    #[arg(long, value_name = "URL")]
    preemption_webhook_url: Option<String>,

    /// Spot node pool, as key=value pairs or a JSON object (repeatable)
    #[arg(long = "spot-nodepool", value_name = "DESCRIPTOR")]
    spot_nodepool: Vec<String>,

    /// On-demand node pool, as key=value pairs or a JSON object (repeatable)
    #[arg(long = "ondemand-nodepool", value_name = "DESCRIPTOR")]
    ondemand_nodepool: Vec<String>,
}

impl CreateCommand {
    #[must_use]
    pub fn options(&self) -> CreateOptions {
        CreateOptions {
            config: self.config.clone(),
            name: self.name.clone(),
            org: self.org.clone(),
            region: self.region.clone(),
            kubernetes_version: self.kubernetes_version.clone(),
            cni: self.cni.clone(),
            preemption_webhook_url: self.preemption_webhook_url.clone(),
            spot_nodepools: self.spot_nodepool.clone(),
            ondemand_nodepools: self.ondemand_nodepool.clone(),
        }
    }

    /// # Errors
    /// Returns acquisition, validation and provisioning failures.
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        let config = ctx.load_config()?;
        let client = ctx.client(&config)?;
        let mut prompter = TerminalPrompter::new();

        let result =
            create_cloudspace(&self.options(), &config, &client, &mut prompter, &ctx.cancel).await;

        match result {
            Ok(cloudspace) => {
                ctx.print_one(&cloudspace)?;
                ui::print_success(&format!("Cloudspace '{}' created", cloudspace.name));
                Ok(())
            }
            Err(err) => {
                for warning in &err.rollback_warnings {
                    ui::print_warning(&warning.to_string());
                }
                Err(err.into())
            }
        }
    }
}

/// Acquire, validate and provision one cloudspace.
///
/// # Errors
/// Returns a [`SagaError`]; failures before any remote mutation carry no
/// rollback warnings.
pub async fn create_cloudspace(
    options: &CreateOptions,
    config: &SpotConfig,
    api: &dyn SpotApi,
    prompter: &mut dyn Prompter,
    cancel: &CancellationToken,
) -> Result<CloudSpace, SagaError> {
    let acquired = acquire(options, config, api, prompter, cancel).await?;
    validate(&acquired.request, acquired.source.validation_mode())?;

    info!(
        source = acquired.source.label(),
        cloudspace = %acquired.request.name,
        pools = acquired.request.pool_count(),
        "Provisioning cloudspace"
    );
    ProvisioningSaga::new(api, cancel.clone())
        .execute(&acquired.request)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::acquire::ParameterSource;
    use crate::output::OutputFormat;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        create: CreateCommand,
    }

    #[test]
    fn test_repeatable_pool_flags() {
        let harness = Harness::parse_from([
            "spotctl",
            "--name",
            "dev",
            "--spot-nodepool",
            "desired=1,bidprice=0.08",
            "--spot-nodepool",
            "desired=2,bidprice=0.09",
        ]);
        let options = harness.create.options();
        assert_eq!(options.spot_nodepools.len(), 2);
        assert_eq!(options.name.as_deref(), Some("dev"));
        assert!(options.ondemand_nodepools.is_empty());
        assert_eq!(options.explicit_flags(), ["--name", "--spot-nodepool"]);
    }

    #[test]
    fn test_no_flags_means_no_explicit_flags() {
        let harness = Harness::parse_from(["spotctl"]);
        assert!(harness.create.options().explicit_flags().is_empty());
    }

    #[derive(Parser)]
    struct WithGlobals {
        #[arg(short, long)]
        verbose: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,

        #[arg(long)]
        spot_config: Option<PathBuf>,

        #[command(flatten)]
        create: CreateCommand,
    }

    #[test]
    fn test_global_flags_still_start_the_wizard() {
        let parsed = WithGlobals::parse_from([
            "spotctl",
            "-v",
            "-o",
            "yaml",
            "--spot-config",
            "/tmp/spot.yaml",
        ]);
        assert_eq!(parsed.output, OutputFormat::Yaml);
        assert!(parsed.verbose);
        assert!(parsed.spot_config.is_some());

        let options = parsed.create.options();
        assert!(options.explicit_flags().is_empty());
        assert_eq!(
            ParameterSource::select(&options).unwrap(),
            ParameterSource::Wizard
        );
    }
}
