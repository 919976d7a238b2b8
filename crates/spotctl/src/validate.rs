//! Request validation.
//!
//! Runs before any remote mutation. Checks happen in a fixed order and stop at
//! the first violation.

use crate::error::ProvisionError;
use crate::price;
use crate::request::{is_valid_region, CreateRequest, VALID_REGIONS};

/// How strictly a request is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every rule applies (file and flag sources).
    Strict,
    /// The wizard already enforced region and price rules while prompting;
    /// required fields, pool presence and desired counts are still checked.
    Interactive,
}

/// Validate `request`.
///
/// # Errors
/// Returns [`ProvisionError::Validation`] naming the first offending field.
pub fn validate(request: &CreateRequest, mode: ValidationMode) -> Result<(), ProvisionError> {
    if request.name.trim().is_empty() {
        return Err(ProvisionError::validation("name", "name is required"));
    }

    if request.region.trim().is_empty() {
        return Err(ProvisionError::validation("region", "region is required"));
    }
    if mode == ValidationMode::Strict && !is_valid_region(&request.region) {
        return Err(ProvisionError::validation(
            "region",
            format!(
                "region {} is not valid. Available regions: {}",
                request.region,
                VALID_REGIONS.join(", ")
            ),
        ));
    }

    if request.organization.trim().is_empty() {
        return Err(ProvisionError::validation(
            "org",
            "organization not specified (use --org or set org in ~/.spot_config)",
        ));
    }

    if request.pool_count() == 0 {
        return Err(ProvisionError::validation(
            "pools",
            "at least one node pool is required (use --spot-nodepool or --ondemand-nodepool)",
        ));
    }

    if mode == ValidationMode::Strict {
        for (index, pool) in request.spot_pools.iter().enumerate() {
            let field = format!("spotNodePools[{index}].bidPrice");
            if pool.bid_price.trim().is_empty() {
                return Err(ProvisionError::validation(
                    field,
                    format!("bid price is required for spot node pool {}", pool.name),
                ));
            }
            if let Err(err) = price::normalize(&pool.bid_price) {
                return Err(ProvisionError::validation(
                    field,
                    format!("invalid bid price for pool {}: {err}", pool.name),
                ));
            }
        }
    }

    for (index, pool) in request.spot_pools.iter().enumerate() {
        if pool.server_class.trim().is_empty() {
            return Err(ProvisionError::validation(
                format!("spotNodePools[{index}].serverClass"),
                format!("server class is required for spot node pool {}", pool.name),
            ));
        }
    }
    for (index, pool) in request.on_demand_pools.iter().enumerate() {
        if pool.server_class.trim().is_empty() {
            return Err(ProvisionError::validation(
                format!("onDemandNodePools[{index}].serverClass"),
                format!("server class is required for on-demand node pool {}", pool.name),
            ));
        }
    }

    for (index, pool) in request.on_demand_pools.iter().enumerate() {
        if pool.desired < 1 {
            return Err(ProvisionError::validation(
                format!("onDemandNodePools[{index}].desired"),
                format!(
                    "desired number of nodes must be greater than 0 for on-demand node pool {}",
                    pool.name
                ),
            ));
        }
    }
    for (index, pool) in request.spot_pools.iter().enumerate() {
        if pool.desired < 1 {
            return Err(ProvisionError::validation(
                format!("spotNodePools[{index}].desired"),
                format!(
                    "desired number of nodes must be greater than 0 for spot node pool {}",
                    pool.name
                ),
            ));
        }
    }

    Ok(())
}
