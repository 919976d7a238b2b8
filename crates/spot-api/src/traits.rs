//! Control-plane trait and common resource types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by control-plane operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A resource with the same name already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Control plane is temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// API returned any other error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            500..=599 => Self::Unavailable(message),
            _ => Self::Api { status, message },
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

/// An organization (tenant namespace) the caller belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization name, used as the namespace of its resources.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A region cloudspaces can be placed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region code (e.g., "us-central-ord-1").
    pub name: String,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// CPU and memory of a server class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerClassResources {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
}

/// A machine shape offered in a region, with its current pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerClass {
    /// Server class name (e.g., "gp.vs1.medium-ord").
    pub name: String,
    /// Region the class is offered in.
    #[serde(default)]
    pub region: String,
    /// CPU and memory.
    #[serde(default)]
    pub resources: ServerClassResources,
    /// Lowest accepted bid, as a price string (e.g., "$0.002").
    #[serde(default)]
    pub min_bid_price_per_hour: String,
    /// Current spot market price.
    #[serde(default)]
    pub current_market_price_per_hour: String,
    /// Fixed on-demand price.
    #[serde(default)]
    pub on_demand_price_per_hour: String,
}

/// A managed Kubernetes cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSpace {
    pub name: String,
    pub org: String,
    pub region: String,
    pub kubernetes_version: String,
    pub cni: String,
    /// Endpoint notified before spot nodes are preempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preemption_webhook_url: Option<String>,
    /// Lifecycle phase reported by the control plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A pool of spot-priced nodes attached to a cloudspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotNodePool {
    pub name: String,
    pub org: String,
    pub cloudspace: String,
    pub server_class: String,
    pub desired: u32,
    /// Maximum hourly bid, canonical three-decimal string.
    pub bid_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A pool of fixed-price nodes attached to a cloudspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnDemandNodePool {
    pub name: String,
    pub org: String,
    pub cloudspace: String,
    pub server_class: String,
    pub desired: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Operations the provisioning workflow needs from the control plane.
///
/// Every call is a single request; implementations do not retry.
#[async_trait]
pub trait SpotApi: Send + Sync {
    /// List organizations visible to the caller.
    async fn list_organizations(&self) -> Result<Vec<Organization>, ApiError>;

    /// List regions visible to the caller.
    async fn list_regions(&self) -> Result<Vec<Region>, ApiError>;

    /// List server classes offered in a region.
    async fn list_server_classes(&self, region: &str) -> Result<Vec<ServerClass>, ApiError>;

    /// Lowest bid currently accepted for a server class.
    async fn get_minimum_bid_price(&self, server_class: &str) -> Result<String, ApiError>;

    /// Create a cloudspace.
    async fn create_cloudspace(&self, cloudspace: &CloudSpace) -> Result<(), ApiError>;

    /// Get a cloudspace by organization and name.
    async fn get_cloudspace(&self, org: &str, name: &str) -> Result<CloudSpace, ApiError>;

    /// List cloudspaces in an organization.
    async fn list_cloudspaces(&self, org: &str) -> Result<Vec<CloudSpace>, ApiError>;

    /// Kubeconfig of a cloudspace, as YAML text.
    async fn get_cloudspace_config(&self, org: &str, name: &str) -> Result<String, ApiError>;

    /// Delete a cloudspace.
    async fn delete_cloudspace(&self, org: &str, name: &str) -> Result<(), ApiError>;

    /// Create a spot node pool.
    async fn create_spot_pool(&self, org: &str, pool: &SpotNodePool) -> Result<(), ApiError>;

    /// List the spot node pools of a cloudspace.
    async fn list_spot_pools(&self, org: &str, cloudspace: &str)
        -> Result<Vec<SpotNodePool>, ApiError>;

    /// Get a spot node pool.
    async fn get_spot_pool(&self, org: &str, name: &str) -> Result<SpotNodePool, ApiError>;

    /// Delete a spot node pool.
    async fn delete_spot_pool(&self, org: &str, name: &str) -> Result<(), ApiError>;

    /// Create an on-demand node pool.
    async fn create_on_demand_pool(
        &self,
        org: &str,
        pool: &OnDemandNodePool,
    ) -> Result<(), ApiError>;

    /// List the on-demand node pools of a cloudspace.
    async fn list_on_demand_pools(
        &self,
        org: &str,
        cloudspace: &str,
    ) -> Result<Vec<OnDemandNodePool>, ApiError>;

    /// Get an on-demand node pool.
    async fn get_on_demand_pool(&self, org: &str, name: &str)
        -> Result<OnDemandNodePool, ApiError>;

    /// Delete an on-demand node pool.
    async fn delete_on_demand_pool(&self, org: &str, name: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(ApiError::from_status(404, String::new()).is_not_found());
        assert!(ApiError::from_status(409, String::new()).is_conflict());
        assert!(ApiError::from_status(403, String::new()).is_forbidden());
        assert!(matches!(
            ApiError::from_status(401, String::new()),
            ApiError::Unauthorized(_)
        ));
        for status in [500, 502, 503, 599] {
            assert!(
                matches!(ApiError::from_status(status, String::new()), ApiError::Unavailable(_)),
                "{status}"
            );
        }
        assert!(matches!(
            ApiError::from_status(422, "bad".into()),
            ApiError::Api { status: 422, .. }
        ));
    }

    #[test]
    fn test_spot_pool_wire_names() {
        let pool = SpotNodePool {
            name: "p1".into(),
            org: "acme".into(),
            cloudspace: "dev".into(),
            server_class: "gp.vs1.medium-ord".into(),
            desired: 2,
            bid_price: "0.080".into(),
            status: None,
        };
        let value = serde_json::to_value(&pool).unwrap();
        assert_eq!(value["serverClass"], "gp.vs1.medium-ord");
        assert_eq!(value["bidPrice"], "0.080");
        assert!(value.get("status").is_none());
    }
}
