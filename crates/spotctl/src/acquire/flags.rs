//! Flag-mode acquisition.
//!
//! Node pools are described either as `key=value` lists
//! (`desired=2,serverclass=gp.vs1.medium-ord,bidprice=0.08`) or as an inline
//! JSON object with the same keys.

use serde_json::Value;

use crate::error::ProvisionError;
use crate::request::{
    generate_pool_name, CreateRequest, OnDemandPoolSpec, SpotPoolSpec, DEFAULT_SERVER_CLASS,
};

use super::CreateOptions;

const SPOT_KEYS: &str = "name, org, cloudspace, serverclass, desired, bidprice";
const ON_DEMAND_KEYS: &str = "name, org, cloudspace, serverclass, desired";

/// Node pool pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolType {
    Spot,
    OnDemand,
}

impl PoolType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::OnDemand => "on-demand",
        }
    }

    fn expected_keys(self) -> &'static str {
        match self {
            Self::Spot => SPOT_KEYS,
            Self::OnDemand => ON_DEMAND_KEYS,
        }
    }

    fn field_prefix(self) -> &'static str {
        match self {
            Self::Spot => "spotNodePools",
            Self::OnDemand => "onDemandNodePools",
        }
    }
}

/// Split a pool descriptor into raw key/value pairs, in order.
///
/// # Errors
/// Returns [`ProvisionError::MalformedDescriptor`] for empty input, a pair
/// without `=`, or a JSON record that is not a flat object.
pub fn parse_descriptor(descriptor: &str) -> Result<Vec<(String, String)>, ProvisionError> {
    let trimmed = descriptor.trim();
    let malformed = |reason: &str| ProvisionError::MalformedDescriptor {
        descriptor: descriptor.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(malformed("descriptor is empty"));
    }

    if trimmed.starts_with('{') {
        let record: serde_json::Map<String, Value> =
            serde_json::from_str(trimmed).map_err(|e| malformed(&e.to_string()))?;
        return record
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => Ok((key, text.trim().to_string())),
                Value::Number(number) => Ok((key, number.to_string())),
                _ => Err(malformed(&format!("value of '{key}' must be a string or number"))),
            })
            .collect();
    }

    trimmed
        .split(',')
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                .ok_or_else(|| malformed(&format!("'{}' is not key=value", pair.trim())))
        })
        .collect()
}

/// Lowercase and drop `-`/`_`, so `serverClass`, `server-class` and
/// `serverclass` are the same key.
fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Default)]
struct PoolFields {
    name: Option<String>,
    org: Option<String>,
    cloudspace: Option<String>,
    server_class: Option<String>,
    desired: Option<String>,
    bid_price: Option<String>,
}

impl PoolFields {
    fn from_pairs(
        pool_type: PoolType,
        pairs: Vec<(String, String)>,
    ) -> Result<Self, ProvisionError> {
        let mut fields = Self::default();
        for (key, value) in pairs {
            let slot = match canonical_key(&key).as_str() {
                "name" => &mut fields.name,
                "org" => &mut fields.org,
                "cloudspace" => &mut fields.cloudspace,
                "serverclass" => &mut fields.server_class,
                "desired" => &mut fields.desired,
                "bidprice" if pool_type == PoolType::Spot => &mut fields.bid_price,
                _ => {
                    return Err(ProvisionError::UnknownParameter {
                        pool_type: pool_type.label(),
                        key,
                        expected: pool_type.expected_keys(),
                    })
                }
            };
            *slot = Some(value).filter(|v| !v.is_empty());
        }
        Ok(fields)
    }

    fn desired(&self, field: &str) -> Result<u32, ProvisionError> {
        match self.desired.as_deref() {
            None => Ok(1),
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                ProvisionError::validation(
                    field,
                    format!("desired must be a non-negative whole number, got {raw:?}"),
                )
            }),
        }
    }
}

/// A pool-level reference must agree with the cloudspace it belongs to.
pub(super) fn check_reference(
    field: String,
    pool_value: Option<&str>,
    request_value: &str,
) -> Result<(), ProvisionError> {
    match pool_value {
        Some(value) if !request_value.is_empty() && value != request_value => {
            Err(ProvisionError::validation(
                field,
                format!("node pool refers to '{value}' but the cloudspace uses '{request_value}'"),
            ))
        }
        _ => Ok(()),
    }
}

fn pool_from_descriptor(
    pool_type: PoolType,
    index: usize,
    descriptor: &str,
    request: &CreateRequest,
) -> Result<PoolFields, ProvisionError> {
    let fields = PoolFields::from_pairs(pool_type, parse_descriptor(descriptor)?)?;
    let prefix = format!("{}[{index}]", pool_type.field_prefix());
    check_reference(format!("{prefix}.org"), fields.org.as_deref(), &request.organization)?;
    check_reference(format!("{prefix}.cloudspace"), fields.cloudspace.as_deref(), &request.name)?;
    Ok(fields)
}

/// Build a request from explicitly set flags.
///
/// # Errors
/// Returns descriptor parse errors, [`ProvisionError::UnknownParameter`], or a
/// validation error for a non-numeric `desired` or a conflicting reference.
pub fn request_from_flags(options: &CreateOptions) -> Result<CreateRequest, ProvisionError> {
    let text = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();

    let mut request = CreateRequest {
        name: text(&options.name),
        organization: text(&options.org),
        region: text(&options.region),
        kubernetes_version: text(&options.kubernetes_version),
        cni: text(&options.cni),
        preemption_webhook_url: options
            .preemption_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string),
        ..CreateRequest::default()
    };

    for (index, descriptor) in options.spot_nodepools.iter().enumerate() {
        let fields = pool_from_descriptor(PoolType::Spot, index, descriptor, &request)?;
        let desired = fields.desired(&format!("spotNodePools[{index}].desired"))?;
        request.spot_pools.push(SpotPoolSpec {
            name: fields.name.unwrap_or_else(generate_pool_name),
            server_class: fields
                .server_class
                .unwrap_or_else(|| DEFAULT_SERVER_CLASS.to_string()),
            desired,
            bid_price: fields.bid_price.unwrap_or_default(),
        });
    }

    for (index, descriptor) in options.ondemand_nodepools.iter().enumerate() {
        let fields = pool_from_descriptor(PoolType::OnDemand, index, descriptor, &request)?;
        let desired = fields.desired(&format!("onDemandNodePools[{index}].desired"))?;
        request.on_demand_pools.push(OnDemandPoolSpec {
            name: fields.name.unwrap_or_else(generate_pool_name),
            server_class: fields
                .server_class
                .unwrap_or_else(|| DEFAULT_SERVER_CLASS.to_string()),
            desired,
        });
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CreateOptions {
        CreateOptions {
            name: Some("dev".into()),
            org: Some("acme".into()),
            region: Some("us-central-ord-1".into()),
            ..CreateOptions::default()
        }
    }

    #[test]
    fn test_parse_key_value_descriptor() {
        let pairs = parse_descriptor(" desired=2 , serverclass = gp.vs1.large-ord,bidprice=0.08").unwrap();
        assert_eq!(
            pairs,
            [
                ("desired".to_string(), "2".to_string()),
                ("serverclass".to_string(), "gp.vs1.large-ord".to_string()),
                ("bidprice".to_string(), "0.08".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_json_descriptor() {
        let pairs = parse_descriptor(r#"{"serverClass":"gp.vs1.large-ord","desired":3}"#).unwrap();
        assert!(pairs.contains(&("desired".to_string(), "3".to_string())));
        assert!(pairs.contains(&("serverClass".to_string(), "gp.vs1.large-ord".to_string())));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["", "desired", "desired=1,serverclass", r#"{"desired":[1]}"#, "{not json"] {
            assert!(
                matches!(parse_descriptor(raw), Err(ProvisionError::MalformedDescriptor { .. })),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("serverClass"), "serverclass");
        assert_eq!(canonical_key("server-class"), "serverclass");
        assert_eq!(canonical_key("Bid_Price"), "bidprice");
    }

    #[test]
    fn test_pool_defaults() {
        let mut opts = options();
        opts.spot_nodepools = vec!["bidprice=0.08".into()];
        opts.ondemand_nodepools = vec!["name=od-1".into()];

        let request = request_from_flags(&opts).unwrap();
        let spot = &request.spot_pools[0];
        assert_eq!(spot.desired, 1);
        assert_eq!(spot.server_class, DEFAULT_SERVER_CLASS);
        assert_eq!(spot.bid_price, "0.08");
        assert!(!spot.name.is_empty());

        let on_demand = &request.on_demand_pools[0];
        assert_eq!(on_demand.name, "od-1");
        assert_eq!(on_demand.desired, 1);
    }

    #[test]
    fn test_bidprice_unknown_for_on_demand() {
        let mut opts = options();
        opts.ondemand_nodepools = vec!["desired=1,bidprice=0.08".into()];
        match request_from_flags(&opts) {
            Err(ProvisionError::UnknownParameter { pool_type, key, .. }) => {
                assert_eq!(pool_type, "on-demand");
                assert_eq!(key, "bidprice");
            }
            other => panic!("expected UnknownParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_desired() {
        let mut opts = options();
        opts.spot_nodepools = vec!["desired=two,bidprice=0.08".into()];
        let err = request_from_flags(&opts).unwrap_err();
        assert_eq!(err.field(), Some("spotNodePools[0].desired"));
    }

    #[test]
    fn test_zero_desired_is_left_for_validation() {
        let mut opts = options();
        opts.spot_nodepools = vec!["desired=0,bidprice=0.08".into()];
        assert_eq!(request_from_flags(&opts).unwrap().spot_pools[0].desired, 0);
    }

    #[test]
    fn test_pool_reference_mismatch() {
        let mut opts = options();
        opts.ondemand_nodepools = vec!["org=other".into()];
        let err = request_from_flags(&opts).unwrap_err();
        assert_eq!(err.field(), Some("onDemandNodePools[0].org"));

        let mut opts = options();
        opts.spot_nodepools = vec!["cloudspace=dev,org=acme,bidprice=1".into()];
        assert!(request_from_flags(&opts).is_ok());
    }

    #[test]
    fn test_webhook_is_trimmed_and_dropped_when_empty() {
        let mut opts = options();
        opts.preemption_webhook_url = Some("  ".into());
        assert_eq!(request_from_flags(&opts).unwrap().preemption_webhook_url, None);
    }
}
