//! File-mode acquisition.
//!
//! ```yaml
//! cloudspace:
//!   name: dev
//!   org: acme
//!   region: us-central-ord-1
//! spotnodepools:
//!   - serverclass: gp.vs1.medium-ord
//!     desired: 2
//!     bidprice: 0.08
//! ondemandnodepools:
//!   - serverclass: gp.vs1.large-ord
//!     desired: 1
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ProvisionError;
use crate::request::{generate_pool_name, CreateRequest, OnDemandPoolSpec, SpotPoolSpec};

use super::flags::check_reference;

#[derive(Debug, Deserialize)]
struct RequestDocument {
    cloudspace: CloudspaceDescriptor,
    #[serde(default, alias = "spotNodePools", alias = "spot_node_pools")]
    spotnodepools: Vec<PoolDescriptor>,
    #[serde(default, alias = "onDemandNodePools", alias = "on_demand_node_pools")]
    ondemandnodepools: Vec<PoolDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CloudspaceDescriptor {
    name: String,
    #[serde(alias = "organization")]
    org: String,
    region: String,
    #[serde(alias = "kubernetesVersion")]
    kubernetes_version: String,
    cni: String,
    #[serde(alias = "preemptionWebhookURL", alias = "preemptionWebhookUrl")]
    preemption_webhook_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PoolDescriptor {
    name: Option<String>,
    org: Option<String>,
    cloudspace: Option<String>,
    #[serde(alias = "serverClass", alias = "serverclass")]
    server_class: Option<String>,
    desired: Option<u32>,
    #[serde(alias = "bidPrice", alias = "bidprice")]
    bid_price: Option<PriceValue>,
}

/// Documents write prices both quoted and bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Number(f64),
}

impl PriceValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

enum Format {
    Yaml,
    Json,
}

fn detect_format(path: &Path) -> Result<Format, ProvisionError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "yaml" | "yml" => Ok(Format::Yaml),
        "json" => Ok(Format::Json),
        _ => Err(ProvisionError::UnsupportedFormat { extension }),
    }
}

/// Read a request document. Pools inherit the cloudspace's org and name when
/// they omit them, and get a generated name when unnamed.
///
/// # Errors
/// Returns read, format and parse errors, or a validation error when a pool
/// refers to a different org or cloudspace.
pub fn load_request_file(path: &Path) -> Result<CreateRequest, ProvisionError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ProvisionError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;

    let document: RequestDocument = match format {
        Format::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
    }
    .map_err(|reason| ProvisionError::ParseFile {
        path: path.to_path_buf(),
        reason,
    })?;

    let request = document.into_request()?;
    debug!(
        path = %path.display(),
        cloudspace = %request.name,
        pools = request.pool_count(),
        "Loaded request file"
    );
    Ok(request)
}

impl RequestDocument {
    fn into_request(self) -> Result<CreateRequest, ProvisionError> {
        let cs = self.cloudspace;
        let mut request = CreateRequest {
            name: cs.name.trim().to_string(),
            organization: cs.org.trim().to_string(),
            region: cs.region.trim().to_string(),
            kubernetes_version: cs.kubernetes_version.trim().to_string(),
            cni: cs.cni.trim().to_string(),
            preemption_webhook_url: cs.preemption_webhook_url.filter(|url| !url.trim().is_empty()),
            ..CreateRequest::default()
        };

        for (index, pool) in self.spotnodepools.into_iter().enumerate() {
            pool.check_references("spotNodePools", index, &request)?;
            request.spot_pools.push(SpotPoolSpec {
                name: pool.name.filter(|n| !n.is_empty()).unwrap_or_else(generate_pool_name),
                server_class: pool.server_class.unwrap_or_default(),
                desired: pool.desired.unwrap_or(1),
                bid_price: pool.bid_price.map(PriceValue::into_text).unwrap_or_default(),
            });
        }

        for (index, pool) in self.ondemandnodepools.into_iter().enumerate() {
            pool.check_references("onDemandNodePools", index, &request)?;
            request.on_demand_pools.push(OnDemandPoolSpec {
                name: pool.name.filter(|n| !n.is_empty()).unwrap_or_else(generate_pool_name),
                server_class: pool.server_class.unwrap_or_default(),
                desired: pool.desired.unwrap_or(1),
            });
        }

        Ok(request)
    }
}

impl PoolDescriptor {
    fn check_references(
        &self,
        prefix: &str,
        index: usize,
        request: &CreateRequest,
    ) -> Result<(), ProvisionError> {
        check_reference(
            format!("{prefix}[{index}].org"),
            self.org.as_deref().filter(|v| !v.is_empty()),
            &request.organization,
        )?;
        check_reference(
            format!("{prefix}[{index}].cloudspace"),
            self.cloudspace.as_deref().filter(|v| !v.is_empty()),
            &request.name,
        )
    }
}
