//! Provisioning saga.
//!
//! Creates a cloudspace and its node pools strictly in order (cloudspace,
//! spot pools, on-demand pools). Every successful create is appended to a
//! [`ProvisioningLedger`] and each pool is read back before the next step.
//! When a later step fails or the cancellation token fires, the ledger is
//! walked in reverse and each resource deleted. Rollback never fails: delete
//! errors are collected as [`RollbackWarning`]s and returned next to the
//! error that triggered it.

use std::fmt;

use spot_api::{ApiError, CloudSpace, SpotApi};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ProvisionError;
use crate::price;
use crate::request::CreateRequest;

/// Kind of remote resource the saga creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Cloudspace,
    SpotPool,
    OnDemandPool,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cloudspace => "cloudspace",
            Self::SpotPool => "spot node pool",
            Self::OnDemandPool => "on-demand node pool",
        };
        f.write_str(label)
    }
}

/// One resource created during the current operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub kind: ResourceKind,
    pub name: String,
}

/// Append-only record of created resources, in creation order.
#[derive(Debug, Default)]
pub struct ProvisioningLedger {
    entries: Vec<LedgerEntry>,
}

impl ProvisioningLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: ResourceKind, name: impl Into<String>) {
        self.entries.push(LedgerEntry {
            kind,
            name: name.into(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Remove every entry, newest first.
    pub fn drain_reversed(&mut self) -> Vec<LedgerEntry> {
        let mut drained: Vec<LedgerEntry> = self.entries.drain(..).collect();
        drained.reverse();
        drained
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A compensating delete that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackWarning {
    pub kind: ResourceKind,
    pub name: String,
    pub message: String,
}

impl fmt::Display for RollbackWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to delete {} '{}' during rollback: {}",
            self.kind, self.name, self.message
        )
    }
}

/// Terminal saga failure.
///
/// Displays as its cause, so report chains do not repeat it.
#[derive(Debug)]
pub struct SagaError {
    pub cause: ProvisionError,
    /// Resources that could not be cleaned up and may need manual deletion.
    pub rollback_warnings: Vec<RollbackWarning>,
}

impl fmt::Display for SagaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}

impl std::error::Error for SagaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.cause)
    }
}

impl From<ProvisionError> for SagaError {
    fn from(cause: ProvisionError) -> Self {
        Self {
            cause,
            rollback_warnings: Vec::new(),
        }
    }
}

impl SagaError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cause.is_cancelled()
    }
}

/// Executes one validated [`CreateRequest`].
pub struct ProvisioningSaga<'a> {
    api: &'a dyn SpotApi,
    cancel: CancellationToken,
    ledger: ProvisioningLedger,
}

impl<'a> ProvisioningSaga<'a> {
    #[must_use]
    pub fn new(api: &'a dyn SpotApi, cancel: CancellationToken) -> Self {
        Self {
            api,
            cancel,
            ledger: ProvisioningLedger::new(),
        }
    }

    /// Resources created and not yet rolled back.
    #[must_use]
    pub fn ledger(&self) -> &ProvisioningLedger {
        &self.ledger
    }

    /// Create everything `request` describes and return the confirmed
    /// cloudspace.
    ///
    /// # Errors
    /// Returns the triggering error after rolling back anything created.
    pub async fn execute(&mut self, request: &CreateRequest) -> Result<CloudSpace, SagaError> {
        let org = request.organization.as_str();
        let cloudspace = request.name.as_str();

        if self.cancel.is_cancelled() {
            return Err(SagaError::from(ProvisionError::Cancelled));
        }

        info!(org = %org, cloudspace = %cloudspace, region = %request.region, "Creating cloudspace");
        if let Err(source) = self.api.create_cloudspace(&request.to_cloudspace()).await {
            return Err(SagaError::from(ProvisionError::CreateFailed {
                kind: ResourceKind::Cloudspace,
                name: cloudspace.to_string(),
                source,
            }));
        }
        self.ledger.record(ResourceKind::Cloudspace, cloudspace);

        for spec in &request.spot_pools {
            self.ensure_not_cancelled(org).await?;

            let bid = match price::normalize(&spec.bid_price) {
                Ok(bid) => bid,
                Err(err) => {
                    let err = ProvisionError::PoolRejected {
                        kind: ResourceKind::SpotPool,
                        name: spec.name.clone(),
                        source: Box::new(err),
                    };
                    return Err(self.fail(org, err).await);
                }
            };

            info!(org = %org, pool = %spec.name, bid = %bid, desired = spec.desired, "Creating spot node pool");
            let pool = spec.to_node_pool(org, cloudspace, bid);
            if let Err(source) = self.api.create_spot_pool(org, &pool).await {
                let err = ProvisionError::CreateFailed {
                    kind: ResourceKind::SpotPool,
                    name: spec.name.clone(),
                    source,
                };
                return Err(self.fail(org, err).await);
            }
            self.ledger.record(ResourceKind::SpotPool, &spec.name);

            if let Err(source) = self.api.get_spot_pool(org, &spec.name).await {
                let err = ProvisionError::VerifyFailed {
                    kind: ResourceKind::SpotPool,
                    name: spec.name.clone(),
                    source,
                };
                return Err(self.fail(org, err).await);
            }
            debug!(org = %org, pool = %spec.name, "Spot node pool verified");
        }

        for spec in &request.on_demand_pools {
            self.ensure_not_cancelled(org).await?;

            info!(org = %org, pool = %spec.name, desired = spec.desired, "Creating on-demand node pool");
            let pool = spec.to_node_pool(org, cloudspace);
            if let Err(source) = self.api.create_on_demand_pool(org, &pool).await {
                let err = ProvisionError::CreateFailed {
                    kind: ResourceKind::OnDemandPool,
                    name: spec.name.clone(),
                    source,
                };
                return Err(self.fail(org, err).await);
            }
            self.ledger.record(ResourceKind::OnDemandPool, &spec.name);

            if let Err(source) = self.api.get_on_demand_pool(org, &spec.name).await {
                let err = ProvisionError::VerifyFailed {
                    kind: ResourceKind::OnDemandPool,
                    name: spec.name.clone(),
                    source,
                };
                return Err(self.fail(org, err).await);
            }
            debug!(org = %org, pool = %spec.name, "On-demand node pool verified");
        }

        match self.api.get_cloudspace(org, cloudspace).await {
            Ok(confirmed) => {
                info!(
                    org = %org,
                    cloudspace = %cloudspace,
                    pools = request.pool_count(),
                    "Cloudspace created"
                );
                self.ledger.clear();
                Ok(confirmed)
            }
            Err(source) => {
                let err = ProvisionError::ConfirmFailed {
                    name: cloudspace.to_string(),
                    source,
                };
                Err(self.fail(org, err).await)
            }
        }
    }

    async fn ensure_not_cancelled(&mut self, org: &str) -> Result<(), SagaError> {
        if self.cancel.is_cancelled() {
            warn!("Cancellation observed, rolling back created resources");
            return Err(self.fail(org, ProvisionError::Cancelled).await);
        }
        Ok(())
    }

    async fn fail(&mut self, org: &str, cause: ProvisionError) -> SagaError {
        let rollback_warnings = self.rollback(org).await;
        SagaError {
            cause,
            rollback_warnings,
        }
    }

    /// Delete every ledger entry, newest first. Never fails.
    async fn rollback(&mut self, org: &str) -> Vec<RollbackWarning> {
        let entries = self.ledger.drain_reversed();
        if entries.is_empty() {
            return Vec::new();
        }
        info!(org = %org, resources = entries.len(), "Rolling back created resources");

        let mut warnings = Vec::new();
        for entry in entries {
            let result = match entry.kind {
                ResourceKind::SpotPool => self.api.delete_spot_pool(org, &entry.name).await,
                ResourceKind::OnDemandPool => {
                    self.api.delete_on_demand_pool(org, &entry.name).await
                }
                ResourceKind::Cloudspace => self.api.delete_cloudspace(org, &entry.name).await,
            };

            match result {
                Ok(()) => debug!(kind = %entry.kind, name = %entry.name, "Rolled back"),
                Err(ApiError::NotFound(_)) => {
                    debug!(kind = %entry.kind, name = %entry.name, "Already gone during rollback");
                }
                Err(err) => {
                    let warning = RollbackWarning {
                        kind: entry.kind,
                        name: entry.name,
                        message: err.to_string(),
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }
        warnings
    }
}
