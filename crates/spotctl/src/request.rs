//! The normalized intent of one `cloudspaces create` invocation.

use serde::{Deserialize, Serialize};
use spot_api::{CloudSpace, OnDemandNodePool, SpotNodePool};

use crate::config::SpotConfig;

/// Region codes a cloudspace may be created in.
pub const VALID_REGIONS: [&str; 8] = [
    "us-central-ord-1",
    "hkg-hkg-1",
    "aus-syd-1",
    "uk-lon-1",
    "us-east-iad-1",
    "us-central-dfw-1",
    "us-central-dfw-2",
    "us-west-sjc-1",
];

/// Kubernetes version used when none is requested.
pub const DEFAULT_KUBERNETES_VERSION: &str = "1.31.1";

/// Kubernetes versions offered by the wizard.
pub const KUBERNETES_VERSIONS: [&str; 3] = ["1.31.1", "1.30.10", "1.29.6"];

/// CNI plugin used when none is requested.
pub const DEFAULT_CNI: &str = "calico";

/// CNI plugins offered by the wizard.
pub const CNI_PLUGINS: [&str; 3] = ["calico", "cilium", "bring your own CNI"];

/// Server class used for flag-described pools that omit one.
pub const DEFAULT_SERVER_CLASS: &str = "gp.vs1.medium-ord";

/// Whether `region` is one of [`VALID_REGIONS`].
#[must_use]
pub fn is_valid_region(region: &str) -> bool {
    VALID_REGIONS.contains(&region)
}

/// Fresh random pool name, so a retried invocation never collides with
/// pools left over from an earlier attempt.
#[must_use]
pub fn generate_pool_name() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Everything needed to create one cloudspace and its node pools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Cloudspace name.
    pub name: String,
    /// Tenant the cloudspace belongs to.
    #[serde(rename = "org")]
    pub organization: String,
    /// Region code.
    pub region: String,
    pub kubernetes_version: String,
    pub cni: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preemption_webhook_url: Option<String>,
    /// Spot pools, created in this order.
    #[serde(default)]
    pub spot_pools: Vec<SpotPoolSpec>,
    /// On-demand pools, created after every spot pool, in this order.
    #[serde(default)]
    pub on_demand_pools: Vec<OnDemandPoolSpec>,
}

/// A requested spot node pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPoolSpec {
    pub name: String,
    pub server_class: String,
    pub desired: u32,
    pub bid_price: String,
}

/// A requested on-demand node pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnDemandPoolSpec {
    pub name: String,
    pub server_class: String,
    pub desired: u32,
}

impl CreateRequest {
    /// Fill fields the acquirer left empty from the CLI configuration and
    /// the fixed defaults.
    pub fn apply_defaults(&mut self, config: &SpotConfig) {
        if self.organization.is_empty() {
            self.organization.clone_from(&config.org);
        }
        if self.region.is_empty() {
            self.region.clone_from(&config.region);
        }
        if self.kubernetes_version.is_empty() {
            self.kubernetes_version = DEFAULT_KUBERNETES_VERSION.to_string();
        }
        if self.cni.is_empty() {
            self.cni = DEFAULT_CNI.to_string();
        }
    }

    /// Total number of requested pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.spot_pools.len() + self.on_demand_pools.len()
    }

    /// The cloudspace resource to create.
    #[must_use]
    pub fn to_cloudspace(&self) -> CloudSpace {
        CloudSpace {
            name: self.name.clone(),
            org: self.organization.clone(),
            region: self.region.clone(),
            kubernetes_version: self.kubernetes_version.clone(),
            cni: self.cni.clone(),
            preemption_webhook_url: self
                .preemption_webhook_url
                .clone()
                .filter(|url| !url.is_empty()),
            status: None,
            created_at: None,
        }
    }
}

impl SpotPoolSpec {
    /// The pool resource to create, with an already normalized bid.
    #[must_use]
    pub fn to_node_pool(&self, org: &str, cloudspace: &str, bid_price: String) -> SpotNodePool {
        SpotNodePool {
            name: self.name.clone(),
            org: org.to_string(),
            cloudspace: cloudspace.to_string(),
            server_class: self.server_class.clone(),
            desired: self.desired,
            bid_price,
            status: None,
        }
    }
}

impl OnDemandPoolSpec {
    #[must_use]
    pub fn to_node_pool(&self, org: &str, cloudspace: &str) -> OnDemandNodePool {
        OnDemandNodePool {
            name: self.name.clone(),
            org: org.to_string(),
            cloudspace: cloudspace.to_string(),
            server_class: self.server_class.clone(),
            desired: self.desired,
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_membership() {
        assert!(is_valid_region("us-central-ord-1"));
        assert!(is_valid_region("uk-lon-1"));
        assert!(!is_valid_region("mars-1"));
        assert!(!is_valid_region(""));
    }

    #[test]
    fn test_generated_pool_names_differ() {
        assert_ne!(generate_pool_name(), generate_pool_name());
    }

    #[test]
    fn test_apply_defaults_only_fills_gaps() {
        let config = SpotConfig {
            org: "acme".into(),
            region: "uk-lon-1".into(),
            ..SpotConfig::default()
        };

        let mut request = CreateRequest {
            name: "dev".into(),
            region: "us-east-iad-1".into(),
            cni: "cilium".into(),
            ..CreateRequest::default()
        };
        request.apply_defaults(&config);

        assert_eq!(request.organization, "acme");
        assert_eq!(request.region, "us-east-iad-1");
        assert_eq!(request.kubernetes_version, DEFAULT_KUBERNETES_VERSION);
        assert_eq!(request.cni, "cilium");
    }

    #[test]
    fn test_to_cloudspace_drops_empty_webhook() {
        let request = CreateRequest {
            name: "dev".into(),
            organization: "acme".into(),
            preemption_webhook_url: Some(String::new()),
            ..CreateRequest::default()
        };
        assert_eq!(request.to_cloudspace().preemption_webhook_url, None);
    }

    #[test]
    fn test_pool_resources_reference_cloudspace() {
        let spot = SpotPoolSpec {
            name: "s1".into(),
            server_class: DEFAULT_SERVER_CLASS.into(),
            desired: 3,
            bid_price: "0.08".into(),
        };
        let pool = spot.to_node_pool("acme", "dev", "0.080".into());
        assert_eq!(pool.cloudspace, "dev");
        assert_eq!(pool.org, "acme");
        assert_eq!(pool.bid_price, "0.080");
        assert_eq!(pool.desired, 3);
    }
}
