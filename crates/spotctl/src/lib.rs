//! Provisioning workflow behind the `spotctl` CLI.
//!
//! A `cloudspaces create` invocation flows through three stages:
//!
//! 1. [`acquire::acquire`] builds a [`CreateRequest`] from a request file, from
//!    command-line flags, or from the interactive [`wizard`].
//! 2. [`validate()`] rejects incomplete or inconsistent requests before
//!    anything is created.
//! 3. [`ProvisioningSaga`] creates the cloudspace and its node pools in order,
//!    deleting what it created when a later step fails or the operation is
//!    cancelled.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod acquire;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod price;
pub mod request;
pub mod saga;
pub mod ui;
pub mod validate;
pub mod wizard;

pub use acquire::{Acquired, CreateOptions, ParameterSource};
pub use config::{ClientSettings, SpotConfig};
pub use error::ProvisionError;
pub use request::{CreateRequest, OnDemandPoolSpec, SpotPoolSpec};
pub use saga::{
    LedgerEntry, ProvisioningLedger, ProvisioningSaga, ResourceKind, RollbackWarning, SagaError,
};
pub use validate::{validate, ValidationMode};
pub use wizard::{Prompter, TerminalPrompter, Wizard, WizardDefaults, WizardState, WizardStep};
