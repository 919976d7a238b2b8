//! REST client for the Spot control plane.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use tracing::{debug, info, warn};
use url::Url;

use super::models::{ErrorBody, ItemList};
use crate::traits::{
    ApiError, CloudSpace, OnDemandNodePool, Organization, Region, ServerClass, SpotApi,
    SpotNodePool,
};

/// Prefix of every resource path.
const API_PREFIX: &str = "/apis/ngpc.rxt.io/v1";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the Spot control plane.
#[derive(Clone)]
pub struct SpotClient {
    /// HTTP client.
    client: Client,
    /// Control-plane root (e.g., `https://spot.rackspace.com`).
    base_url: Url,
    /// Bearer token sent with every request.
    access_token: String,
}

impl SpotClient {
    /// Create a client with the default request timeout.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(
            base_url,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with an explicit request timeout.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be created.
    pub fn with_timeout(
        base_url: &str,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(ApiError::Config(
                "access token is empty; set access_token in ~/.spot_config or the file named by SPOT_CONFIG".into(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(&format!("{API_PREFIX}{path}"))
            .map_err(|e| ApiError::Config(format!("invalid request path {path:?}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        debug!(method = %method, url = %url, "API request");
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.access_token))
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path)?.send().await?;
        Self::handle_response(response).await
    }

    /// Make an authenticated GET request for a plain-text body.
    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let response = self.request(Method::GET, path)?.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::from_status(
                status.as_u16(),
                ErrorBody::describe(&text),
            ))
        }
    }

    /// Make an authenticated POST request, ignoring the response body.
    async fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        Self::expect_success(response).await
    }

    /// Make an authenticated DELETE request.
    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        Self::expect_success(response).await
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(
            status.as_u16(),
            ErrorBody::describe(&text),
        ))
    }

    /// Handle API response, parsing JSON or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                ApiError::Serialization(e)
            })
        } else {
            Err(ApiError::from_status(
                status.as_u16(),
                ErrorBody::describe(&text),
            ))
        }
    }
}

/// Numeric value of a price string such as `$0.012`.
fn price_value(price: &str) -> Option<f64> {
    price.trim().trim_start_matches('$').trim().parse().ok()
}

#[async_trait]
impl SpotApi for SpotClient {
    async fn list_organizations(&self) -> Result<Vec<Organization>, ApiError> {
        let list: ItemList<Organization> = self.get("/organizations").await?;
        Ok(list.items)
    }

    async fn list_regions(&self) -> Result<Vec<Region>, ApiError> {
        let list: ItemList<Region> = self.get("/regions").await?;
        Ok(list.items)
    }

    async fn list_server_classes(&self, region: &str) -> Result<Vec<ServerClass>, ApiError> {
        let list: ItemList<ServerClass> = self.get("/serverclasses").await?;
        Ok(list
            .items
            .into_iter()
            .filter(|sc| region.is_empty() || sc.region.is_empty() || sc.region == region)
            .collect())
    }

    async fn get_minimum_bid_price(&self, server_class: &str) -> Result<String, ApiError> {
        let class: ServerClass = self.get(&format!("/serverclasses/{server_class}")).await?;

        // The control plane rejects bids under the live market price even when
        // the advertised minimum is lower.
        let min_bid = price_value(&class.min_bid_price_per_hour);
        let market = price_value(&class.current_market_price_per_hour);
        let price = match (min_bid, market) {
            (Some(min), Some(current)) if current > min => &class.current_market_price_per_hour,
            (None, Some(_)) => &class.current_market_price_per_hour,
            _ => &class.min_bid_price_per_hour,
        };

        Ok(price.trim().trim_start_matches('$').trim().to_string())
    }

    async fn create_cloudspace(&self, cloudspace: &CloudSpace) -> Result<(), ApiError> {
        info!(
            org = %cloudspace.org,
            name = %cloudspace.name,
            region = %cloudspace.region,
            "Creating cloudspace"
        );
        self.post(
            &format!("/namespaces/{}/cloudspaces", cloudspace.org),
            cloudspace,
        )
        .await
    }

    async fn get_cloudspace(&self, org: &str, name: &str) -> Result<CloudSpace, ApiError> {
        self.get(&format!("/namespaces/{org}/cloudspaces/{name}"))
            .await
    }

    async fn list_cloudspaces(&self, org: &str) -> Result<Vec<CloudSpace>, ApiError> {
        let list: ItemList<CloudSpace> = self.get(&format!("/namespaces/{org}/cloudspaces")).await?;
        Ok(list.items)
    }

    async fn get_cloudspace_config(&self, org: &str, name: &str) -> Result<String, ApiError> {
        self.get_text(&format!("/namespaces/{org}/cloudspaces/{name}/kubeconfig"))
            .await
    }

    async fn delete_cloudspace(&self, org: &str, name: &str) -> Result<(), ApiError> {
        info!(org = %org, name = %name, "Deleting cloudspace");
        self.delete(&format!("/namespaces/{org}/cloudspaces/{name}"))
            .await
    }

    async fn create_spot_pool(&self, org: &str, pool: &SpotNodePool) -> Result<(), ApiError> {
        info!(
            org = %org,
            cloudspace = %pool.cloudspace,
            pool = %pool.name,
            server_class = %pool.server_class,
            bid_price = %pool.bid_price,
            "Creating spot node pool"
        );
        self.post(&format!("/namespaces/{org}/spotnodepools"), pool)
            .await
    }

    async fn list_spot_pools(
        &self,
        org: &str,
        cloudspace: &str,
    ) -> Result<Vec<SpotNodePool>, ApiError> {
        let list: ItemList<SpotNodePool> =
            self.get(&format!("/namespaces/{org}/spotnodepools")).await?;
        Ok(list
            .items
            .into_iter()
            .filter(|pool| pool.cloudspace == cloudspace)
            .collect())
    }

    async fn get_spot_pool(&self, org: &str, name: &str) -> Result<SpotNodePool, ApiError> {
        self.get(&format!("/namespaces/{org}/spotnodepools/{name}"))
            .await
    }

    async fn delete_spot_pool(&self, org: &str, name: &str) -> Result<(), ApiError> {
        info!(org = %org, pool = %name, "Deleting spot node pool");
        self.delete(&format!("/namespaces/{org}/spotnodepools/{name}"))
            .await
    }

    async fn create_on_demand_pool(
        &self,
        org: &str,
        pool: &OnDemandNodePool,
    ) -> Result<(), ApiError> {
        info!(
            org = %org,
            cloudspace = %pool.cloudspace,
            pool = %pool.name,
            server_class = %pool.server_class,
            "Creating on-demand node pool"
        );
        self.post(&format!("/namespaces/{org}/ondemandnodepools"), pool)
            .await
    }

    async fn list_on_demand_pools(
        &self,
        org: &str,
        cloudspace: &str,
    ) -> Result<Vec<OnDemandNodePool>, ApiError> {
        let list: ItemList<OnDemandNodePool> =
            self.get(&format!("/namespaces/{org}/ondemandnodepools")).await?;
        Ok(list
            .items
            .into_iter()
            .filter(|pool| pool.cloudspace == cloudspace)
            .collect())
    }

    async fn get_on_demand_pool(
        &self,
        org: &str,
        name: &str,
    ) -> Result<OnDemandNodePool, ApiError> {
        self.get(&format!("/namespaces/{org}/ondemandnodepools/{name}"))
            .await
    }

    async fn delete_on_demand_pool(&self, org: &str, name: &str) -> Result<(), ApiError> {
        info!(org = %org, pool = %name, "Deleting on-demand node pool");
        self.delete(&format!("/namespaces/{org}/ondemandnodepools/{name}"))
            .await
    }
}
