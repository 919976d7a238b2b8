//! Parameter acquisition.
//!
//! A [`CreateRequest`] comes from exactly one of three sources: a request
//! file (`--config`), individual command-line flags, or the interactive
//! wizard when no creation flag was given at all.

mod file;
mod flags;

use std::path::PathBuf;

use spot_api::SpotApi;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::SpotConfig;
use crate::error::ProvisionError;
use crate::request::CreateRequest;
use crate::validate::ValidationMode;
use crate::wizard::{Prompter, Wizard, WizardDefaults};

pub use file::load_request_file;
pub use flags::{parse_descriptor, request_from_flags, PoolType};

/// Creation flags as given on the command line.
///
/// `Some` (or a non-empty list) means the flag was explicitly set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub config: Option<PathBuf>,
    pub name: Option<String>,
    pub org: Option<String>,
    pub region: Option<String>,
    pub kubernetes_version: Option<String>,
    pub cni: Option<String>,
    pub preemption_webhook_url: Option<String>,
    pub spot_nodepools: Vec<String>,
    pub ondemand_nodepools: Vec<String>,
}

impl CreateOptions {
    /// Flags other than `--config` that were explicitly set.
    #[must_use]
    pub fn explicit_flags(&self) -> Vec<String> {
        let scalars = [
            ("--name", self.name.is_some()),
            ("--org", self.org.is_some()),
            ("--region", self.region.is_some()),
            ("--kubernetes-version", self.kubernetes_version.is_some()),
            ("--cni", self.cni.is_some()),
            ("--preemption-webhook-url", self.preemption_webhook_url.is_some()),
            ("--spot-nodepool", !self.spot_nodepools.is_empty()),
            ("--ondemand-nodepool", !self.ondemand_nodepools.is_empty()),
        ];
        scalars
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(flag, _)| flag.to_string())
            .collect()
    }
}

/// Where a request's parameters come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSource {
    File(PathBuf),
    Flags,
    Wizard,
}

impl ParameterSource {
    /// Pick the source for `options`.
    ///
    /// A request file excludes every other creation flag. Otherwise any
    /// explicitly set flag selects flag mode; none at all selects the wizard.
    ///
    /// # Errors
    /// Returns [`ProvisionError::ConflictingSource`] when `--config` is combined
    /// with other creation flags.
    pub fn select(options: &CreateOptions) -> Result<Self, ProvisionError> {
        let explicit = options.explicit_flags();
        match &options.config {
            Some(path) if explicit.is_empty() => Ok(Self::File(path.clone())),
            Some(_) => Err(ProvisionError::ConflictingSource { flags: explicit }),
            None if explicit.is_empty() => Ok(Self::Wizard),
            None => Ok(Self::Flags),
        }
    }

    #[must_use]
    pub fn validation_mode(&self) -> ValidationMode {
        match self {
            Self::Wizard => ValidationMode::Interactive,
            Self::File(_) | Self::Flags => ValidationMode::Strict,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Flags => "flags",
            Self::Wizard => "wizard",
        }
    }
}

/// A request together with the source that produced it.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub source: ParameterSource,
    pub request: CreateRequest,
}

/// Build a [`CreateRequest`] from whichever source `options` selects, then
/// fill remaining gaps from `config`.
///
/// # Errors
/// Returns source conflicts, parse errors, unknown pool parameters, or the
/// wizard's failure or cancellation.
pub async fn acquire(
    options: &CreateOptions,
    config: &SpotConfig,
    api: &dyn SpotApi,
    prompter: &mut dyn Prompter,
    cancel: &CancellationToken,
) -> Result<Acquired, ProvisionError> {
    let source = ParameterSource::select(options)?;
    debug!(source = source.label(), "Acquiring create parameters");

    let mut request = match &source {
        ParameterSource::File(path) => load_request_file(path)?,
        ParameterSource::Flags => request_from_flags(options)?,
        ParameterSource::Wizard => {
            let defaults = WizardDefaults::from_config(config);
            Wizard::new(api, prompter, cancel.clone(), defaults)
                .run()
                .await?
        }
    };
    request.apply_defaults(config);

    Ok(Acquired { source, request })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_selects_wizard() {
        let options = CreateOptions::default();
        assert_eq!(ParameterSource::select(&options).unwrap(), ParameterSource::Wizard);
    }

    #[test]
    fn test_any_flag_selects_flags() {
        let options = CreateOptions {
            cni: Some("cilium".into()),
            ..CreateOptions::default()
        };
        let source = ParameterSource::select(&options).unwrap();
        assert_eq!(source, ParameterSource::Flags);
        assert_eq!(source.validation_mode(), ValidationMode::Strict);
    }

    #[test]
    fn test_config_alone_selects_file() {
        let options = CreateOptions {
            config: Some(PathBuf::from("dev.yaml")),
            ..CreateOptions::default()
        };
        assert_eq!(
            ParameterSource::select(&options).unwrap(),
            ParameterSource::File(PathBuf::from("dev.yaml"))
        );
    }

    #[test]
    fn test_config_with_flags_conflicts() {
        let options = CreateOptions {
            config: Some(PathBuf::from("dev.yaml")),
            name: Some("dev".into()),
            spot_nodepools: vec!["desired=1".into()],
            ..CreateOptions::default()
        };
        match ParameterSource::select(&options) {
            Err(ProvisionError::ConflictingSource { flags }) => {
                assert_eq!(flags, ["--name", "--spot-nodepool"]);
            }
            other => panic!("expected ConflictingSource, got {other:?}"),
        }
    }
}
