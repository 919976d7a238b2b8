//! Control-plane client for Spot cloudspaces.
//!
//! This crate defines the [`SpotApi`] contract the provisioning workflow is
//! written against, the resource types it exchanges, and [`SpotClient`], an
//! HTTP implementation of the contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use spot_api::{SpotApi, SpotClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpotClient::new("https://spot.rackspace.com", "access-token")?;
//!
//!     for region in client.list_regions().await? {
//!         println!("{}", region.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod http;
mod traits;

pub use http::SpotClient;
pub use traits::{
    ApiError, CloudSpace, OnDemandNodePool, Organization, Region, ServerClass,
    ServerClassResources, SpotApi, SpotNodePool,
};
