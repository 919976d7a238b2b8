//! Shared fixtures: a recording in-memory control plane and a scripted
//! prompter.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use spot_api::{
    ApiError, CloudSpace, OnDemandNodePool, Organization, Region, ServerClass,
    ServerClassResources, SpotApi, SpotNodePool,
};
use spotctl::{CreateRequest, OnDemandPoolSpec, ProvisionError, Prompter, SpotPoolSpec};
use tokio_util::sync::CancellationToken;

/// A remote call seen by [`FakeSpotApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListOrganizations,
    ListRegions,
    ListServerClasses(String),
    MinimumBid(String),
    CreateCloudspace(String),
    GetCloudspace(String),
    ListCloudspaces,
    GetCloudspaceConfig(String),
    DeleteCloudspace(String),
    CreateSpotPool { name: String, bid: String },
    ListSpotPools(String),
    GetSpotPool(String),
    DeleteSpotPool(String),
    CreateOnDemandPool(String),
    ListOnDemandPools(String),
    GetOnDemandPool(String),
    DeleteOnDemandPool(String),
}

impl Call {
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            Self::CreateCloudspace(_) | Self::CreateSpotPool { .. } | Self::CreateOnDemandPool(_)
        )
    }

    pub fn is_pool_create(&self) -> bool {
        matches!(self, Self::CreateSpotPool { .. } | Self::CreateOnDemandPool(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            Self::DeleteCloudspace(_) | Self::DeleteSpotPool(_) | Self::DeleteOnDemandPool(_)
        )
    }
}

/// Error a fake call fails with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Conflict,
    Forbidden,
    NotFound,
    Unavailable,
}

impl Failure {
    fn to_error(self) -> ApiError {
        match self {
            Self::Conflict => ApiError::Conflict("already exists".into()),
            Self::Forbidden => ApiError::Forbidden("not permitted".into()),
            Self::NotFound => ApiError::NotFound("no such resource".into()),
            Self::Unavailable => ApiError::Unavailable("try again later".into()),
        }
    }
}

/// In-memory [`SpotApi`] that records every call.
#[derive(Default)]
pub struct FakeSpotApi {
    pub log: Mutex<Vec<Call>>,
    /// Pools whose create succeeded, returned by the get and list calls.
    pub spot_pools: Mutex<Vec<SpotNodePool>>,
    pub on_demand_pools: Mutex<Vec<OnDemandNodePool>>,
    pub organizations: Vec<Organization>,
    pub regions: Vec<Region>,
    pub regions_failure: Option<Failure>,
    pub server_classes: Vec<ServerClass>,
    /// `None` makes the minimum bid lookup fail.
    pub min_bid: Option<String>,
    pub cloudspace_create_failure: Option<Failure>,
    /// 1-indexed position among all pool creates, spot and on-demand.
    pub pool_create_failure: Option<(usize, Failure)>,
    pub delete_failure: Option<Failure>,
    pub get_failure: Option<Failure>,
    /// Reading back the named pool fails, spot or on-demand.
    pub pool_get_failure: Option<(&'static str, Failure)>,
    /// Fired right after the cloudspace create succeeds.
    pub cancel_after_cloudspace: Option<CancellationToken>,
}

impl FakeSpotApi {
    pub fn new() -> Self {
        Self {
            organizations: vec![organization("acme"), organization("globex")],
            regions: vec![region("us-central-ord-1"), region("uk-lon-1")],
            server_classes: vec![server_class("gp.vs1.medium-ord"), server_class("gp.vs1.large-ord")],
            min_bid: Some("$0.012".into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_create).collect()
    }

    pub fn deletes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_delete).collect()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }

    fn pool_creates_so_far(&self) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.is_pool_create())
            .count()
    }

    fn pool_create_result(&self) -> Result<(), ApiError> {
        match self.pool_create_failure {
            Some((position, failure)) if self.pool_creates_so_far() + 1 == position => {
                Err(failure.to_error())
            }
            _ => Ok(()),
        }
    }

    fn pool_get_result(&self, name: &str) -> Result<(), ApiError> {
        match self.pool_get_failure {
            Some((failing, failure)) if failing == name => Err(failure.to_error()),
            _ => Ok(()),
        }
    }

    fn delete_result(&self) -> Result<(), ApiError> {
        self.delete_failure.map_or(Ok(()), |failure| Err(failure.to_error()))
    }
}

#[async_trait]
impl SpotApi for FakeSpotApi {
    async fn list_organizations(&self) -> Result<Vec<Organization>, ApiError> {
        self.record(Call::ListOrganizations);
        Ok(self.organizations.clone())
    }

    async fn list_regions(&self) -> Result<Vec<Region>, ApiError> {
        self.record(Call::ListRegions);
        match self.regions_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.regions.clone()),
        }
    }

    async fn list_server_classes(&self, region: &str) -> Result<Vec<ServerClass>, ApiError> {
        self.record(Call::ListServerClasses(region.to_string()));
        Ok(self.server_classes.clone())
    }

    async fn get_minimum_bid_price(&self, server_class: &str) -> Result<String, ApiError> {
        self.record(Call::MinimumBid(server_class.to_string()));
        self.min_bid
            .clone()
            .ok_or_else(|| ApiError::Unavailable("pricing unavailable".into()))
    }

    async fn create_cloudspace(&self, cloudspace: &CloudSpace) -> Result<(), ApiError> {
        self.record(Call::CreateCloudspace(cloudspace.name.clone()));
        if let Some(failure) = self.cloudspace_create_failure {
            return Err(failure.to_error());
        }
        if let Some(token) = &self.cancel_after_cloudspace {
            token.cancel();
        }
        Ok(())
    }

    async fn get_cloudspace(&self, org: &str, name: &str) -> Result<CloudSpace, ApiError> {
        self.record(Call::GetCloudspace(name.to_string()));
        if let Some(failure) = self.get_failure {
            return Err(failure.to_error());
        }
        Ok(CloudSpace {
            name: name.to_string(),
            org: org.to_string(),
            region: "us-central-ord-1".into(),
            kubernetes_version: "1.31.1".into(),
            cni: "calico".into(),
            preemption_webhook_url: None,
            status: Some("Provisioning".into()),
            created_at: None,
        })
    }

    async fn list_cloudspaces(&self, _org: &str) -> Result<Vec<CloudSpace>, ApiError> {
        self.record(Call::ListCloudspaces);
        Ok(Vec::new())
    }

    async fn get_cloudspace_config(&self, _org: &str, name: &str) -> Result<String, ApiError> {
        self.record(Call::GetCloudspaceConfig(name.to_string()));
        if let Some(failure) = self.get_failure {
            return Err(failure.to_error());
        }
        Ok(format!(
            "apiVersion: v1\nkind: Config\ncurrent-context: {name}\n"
        ))
    }

    async fn delete_cloudspace(&self, _org: &str, name: &str) -> Result<(), ApiError> {
        self.record(Call::DeleteCloudspace(name.to_string()));
        self.delete_result()
    }

    async fn create_spot_pool(&self, _org: &str, pool: &SpotNodePool) -> Result<(), ApiError> {
        let result = self.pool_create_result();
        self.record(Call::CreateSpotPool {
            name: pool.name.clone(),
            bid: pool.bid_price.clone(),
        });
        if result.is_ok() {
            self.spot_pools.lock().unwrap().push(pool.clone());
        }
        result
    }

    async fn list_spot_pools(
        &self,
        _org: &str,
        cloudspace: &str,
    ) -> Result<Vec<SpotNodePool>, ApiError> {
        self.record(Call::ListSpotPools(cloudspace.to_string()));
        Ok(self
            .spot_pools
            .lock()
            .unwrap()
            .iter()
            .filter(|pool| pool.cloudspace == cloudspace)
            .cloned()
            .collect())
    }

    async fn get_spot_pool(&self, _org: &str, name: &str) -> Result<SpotNodePool, ApiError> {
        self.record(Call::GetSpotPool(name.to_string()));
        self.pool_get_result(name)?;
        self.spot_pools
            .lock()
            .unwrap()
            .iter()
            .find(|pool| pool.name == name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(name.to_string()))
    }

    async fn delete_spot_pool(&self, _org: &str, name: &str) -> Result<(), ApiError> {
        self.record(Call::DeleteSpotPool(name.to_string()));
        self.delete_result()
    }

    async fn create_on_demand_pool(
        &self,
        _org: &str,
        pool: &OnDemandNodePool,
    ) -> Result<(), ApiError> {
        let result = self.pool_create_result();
        self.record(Call::CreateOnDemandPool(pool.name.clone()));
        if result.is_ok() {
            self.on_demand_pools.lock().unwrap().push(pool.clone());
        }
        result
    }

    async fn list_on_demand_pools(
        &self,
        _org: &str,
        cloudspace: &str,
    ) -> Result<Vec<OnDemandNodePool>, ApiError> {
        self.record(Call::ListOnDemandPools(cloudspace.to_string()));
        Ok(self
            .on_demand_pools
            .lock()
            .unwrap()
            .iter()
            .filter(|pool| pool.cloudspace == cloudspace)
            .cloned()
            .collect())
    }

    async fn get_on_demand_pool(
        &self,
        _org: &str,
        name: &str,
    ) -> Result<OnDemandNodePool, ApiError> {
        self.record(Call::GetOnDemandPool(name.to_string()));
        self.pool_get_result(name)?;
        self.on_demand_pools
            .lock()
            .unwrap()
            .iter()
            .find(|pool| pool.name == name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(name.to_string()))
    }

    async fn delete_on_demand_pool(&self, _org: &str, name: &str) -> Result<(), ApiError> {
        self.record(Call::DeleteOnDemandPool(name.to_string()));
        self.delete_result()
    }
}

pub fn organization(name: &str) -> Organization {
    Organization {
        name: name.to_string(),
        id: None,
        display_name: None,
    }
}

pub fn region(name: &str) -> Region {
    Region {
        name: name.to_string(),
        description: None,
    }
}

pub fn server_class(name: &str) -> ServerClass {
    ServerClass {
        name: name.to_string(),
        region: "us-central-ord-1".into(),
        resources: ServerClassResources {
            cpu: "2".into(),
            memory: "4GB".into(),
        },
        min_bid_price_per_hour: "0.010".into(),
        current_market_price_per_hour: "0.012".into(),
        on_demand_price_per_hour: "0.050".into(),
    }
}

/// A valid request with `spot` spot pools followed by `on_demand` on-demand
/// pools, named `spot-1..` and `od-1..`.
pub fn request(spot: usize, on_demand: usize) -> CreateRequest {
    CreateRequest {
        name: "dev".into(),
        organization: "acme".into(),
        region: "us-central-ord-1".into(),
        kubernetes_version: "1.31.1".into(),
        cni: "calico".into(),
        preemption_webhook_url: None,
        spot_pools: (1..=spot)
            .map(|i| SpotPoolSpec {
                name: format!("spot-{i}"),
                server_class: "gp.vs1.medium-ord".into(),
                desired: 1,
                bid_price: "$0.08".into(),
            })
            .collect(),
        on_demand_pools: (1..=on_demand)
            .map(|i| OnDemandPoolSpec {
                name: format!("od-{i}"),
                server_class: "gp.vs1.large-ord".into(),
                desired: 2,
            })
            .collect(),
    }
}

/// One scripted operator answer.
#[derive(Debug, Clone)]
pub enum Answer {
    Select(usize),
    Input(&'static str),
    Confirm(bool),
    /// Esc: the operator backs out of the prompt.
    Back,
    /// Ctrl-C inside the prompt.
    Interrupt,
}

/// [`Prompter`] that replays a fixed list of answers and records prompts.
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub prompts: Vec<String>,
    pub shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
            shown: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn prompt_count(&self, prefix: &str) -> usize {
        self.prompts.iter().filter(|p| p.starts_with(prefix)).count()
    }

    fn next(&mut self, prompt: &str) -> Answer {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer left for prompt {prompt:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        _default: usize,
    ) -> Result<Option<usize>, ProvisionError> {
        match self.next(prompt) {
            Answer::Select(index) => {
                assert!(index < items.len(), "{prompt:?}: {index} out of range {items:?}");
                Ok(Some(index))
            }
            Answer::Back => Ok(None),
            Answer::Interrupt => Err(ProvisionError::Cancelled),
            other => panic!("{prompt:?} is a selection, scripted {other:?}"),
        }
    }

    fn input(
        &mut self,
        prompt: &str,
        _default: Option<&str>,
    ) -> Result<Option<String>, ProvisionError> {
        match self.next(prompt) {
            Answer::Input(text) => Ok(Some(text.to_string())),
            Answer::Back => Ok(None),
            Answer::Interrupt => Err(ProvisionError::Cancelled),
            other => panic!("{prompt:?} is an input, scripted {other:?}"),
        }
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Result<Option<bool>, ProvisionError> {
        match self.next(prompt) {
            Answer::Confirm(yes) => Ok(Some(yes)),
            Answer::Back => Ok(None),
            Answer::Interrupt => Err(ProvisionError::Cancelled),
            other => panic!("{prompt:?} is a confirmation, scripted {other:?}"),
        }
    }

    fn show(&mut self, message: &str) {
        self.shown.push(message.to_string());
    }
}
