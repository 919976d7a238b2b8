//! Command implementations.

pub mod cloudspaces;
pub mod create;
pub mod nodepools;
pub mod organizations;
pub mod pricing;
pub mod regions;
pub mod serverclasses;

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde::Serialize;
use spot_api::SpotClient;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientSettings, SpotConfig};
use crate::error::ProvisionError;
use crate::output::{self, OutputFormat, TableRow};

/// State shared by every command of one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputFormat,
    /// Explicit CLI configuration path; `~/.spot_config` otherwise.
    pub spot_config: Option<PathBuf>,
    /// Fired on process interrupt.
    pub cancel: CancellationToken,
}

impl Context {
    /// Load the CLI configuration.
    ///
    /// # Errors
    /// Returns an error if the file is missing or malformed.
    pub fn load_config(&self) -> Result<SpotConfig> {
        SpotConfig::load_from(self.spot_config.as_deref())
            .context("failed to load spot configuration")
    }

    /// Control-plane client authenticated with the configured token.
    ///
    /// # Errors
    /// Returns an error if the endpoint or token is unusable.
    pub fn client(&self, config: &SpotConfig) -> Result<SpotClient> {
        let settings = ClientSettings::from_env();
        SpotClient::with_timeout(&settings.base_url, config.access_token.clone(), settings.timeout)
            .context("failed to create API client")
    }

    /// Configuration and client, for commands that only read or delete.
    ///
    /// # Errors
    /// Returns configuration or client construction failures.
    pub fn connect(&self) -> Result<(SpotConfig, SpotClient)> {
        let config = self.load_config()?;
        let client = self.client(&config)?;
        Ok((config, client))
    }

    /// Render `item` to stdout.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn print_one<T: Serialize + TableRow>(&self, item: &T) -> Result<()> {
        println!("{}", output::render_one(item, self.output)?);
        Ok(())
    }

    /// Render `items` to stdout.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn print_list<T: Serialize + TableRow>(&self, items: &[T]) -> Result<()> {
        println!("{}", output::render_list(items, self.output)?);
        Ok(())
    }
}

/// The `--org` flag, or the configured organization.
///
/// # Errors
/// Returns an error if neither is set.
pub fn resolve_org(flag: Option<&str>, config: &SpotConfig) -> Result<String> {
    let org = flag.unwrap_or(&config.org).trim();
    if org.is_empty() {
        bail!("organization not specified (use --org or set org in ~/.spot_config)");
    }
    Ok(org.to_string())
}

/// Ask before deleting. Esc or an empty answer means no.
pub(crate) fn confirm_delete(prompt: &str) -> Result<bool, ProvisionError> {
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact_opt()?;
    Ok(answer.unwrap_or(false))
}
