//! Error types for the provisioning workflow.

use std::path::PathBuf;

use spot_api::ApiError;
use thiserror::Error;

use crate::saga::ResourceKind;

/// Errors raised while acquiring, validating or provisioning a cloudspace.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// `--config` was combined with other creation flags.
    #[error("--config cannot be combined with other creation flags (also set: {})", flags.join(", "))]
    ConflictingSource { flags: Vec<String> },

    /// A node pool descriptor used a key that is not recognized.
    #[error("unknown {pool_type} node pool parameter '{key}' (expected one of: {expected})")]
    UnknownParameter {
        pool_type: &'static str,
        key: String,
        expected: &'static str,
    },

    /// A node pool descriptor could not be split into parameters.
    #[error("invalid node pool descriptor {descriptor:?}: {reason}")]
    MalformedDescriptor { descriptor: String, reason: String },

    /// The request violates a required-field or cross-field rule.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A bid price could not be normalized.
    #[error("invalid price {input:?}: {reason}")]
    InvalidPrice { input: String, reason: String },

    /// A remote create call failed.
    #[error("failed to create {kind} '{name}': {source}")]
    CreateFailed {
        kind: ResourceKind,
        name: String,
        #[source]
        source: ApiError,
    },

    /// A node pool was refused locally before its create call was made.
    #[error("failed to create {kind} '{name}': {source}")]
    PoolRejected {
        kind: ResourceKind,
        name: String,
        #[source]
        source: Box<ProvisionError>,
    },

    /// A created node pool could not be read back.
    #[error("failed to verify creation of {kind} '{name}': {source}")]
    VerifyFailed {
        kind: ResourceKind,
        name: String,
        #[source]
        source: ApiError,
    },

    /// The created cloudspace could not be read back.
    #[error("failed to confirm cloudspace '{name}': {source}")]
    ConfirmFailed {
        name: String,
        #[source]
        source: ApiError,
    },

    /// The region offers no server classes to choose from.
    #[error("no server classes available in region {region}")]
    NoServerClasses { region: String },

    /// The operator or the process aborted the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// A configuration or request file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A request file has an extension we cannot parse.
    #[error("unsupported config file format: {extension:?} (must be .yaml, .yml, or .json)")]
    UnsupportedFormat { extension: String },

    /// A configuration or request file could not be parsed.
    #[error("failed to parse {}: {reason}", path.display())]
    ParseFile { path: PathBuf, reason: String },

    /// The terminal prompt failed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// A read-only remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ProvisionError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a price that failed normalization.
    pub fn invalid_price(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPrice {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Field named by a validation failure.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Remote error underneath a create, verify, confirm or read failure.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::CreateFailed { source, .. }
            | Self::VerifyFailed { source, .. }
            | Self::ConfirmFailed { source, .. } => Some(source),
            Self::Api(source) => Some(source),
            _ => None,
        }
    }
}

impl From<dialoguer::Error> for ProvisionError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
                Self::Cancelled
            }
            other => Self::Prompt(other.to_string()),
        }
    }
}
