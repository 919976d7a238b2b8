//! Interactive creation wizard.
//!
//! A fixed sequence of steps, each collecting one part of a
//! [`CreateRequest`]. Steps run strictly in order; invalid input is retried
//! inside the step. The wizard never creates anything itself: it ends in
//! [`WizardState::Completed`] with a request, or in a cancelled or failed
//! state.

mod prompt;

use spot_api::{ServerClass, SpotApi};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SpotConfig;
use crate::error::ProvisionError;
use crate::price::{self, DEFAULT_MIN_BID_PRICE};
use crate::request::{
    generate_pool_name, is_valid_region, CreateRequest, OnDemandPoolSpec, SpotPoolSpec,
    CNI_PLUGINS, DEFAULT_CNI, DEFAULT_KUBERNETES_VERSION, KUBERNETES_VERSIONS, VALID_REGIONS,
};
use crate::ui;

pub use prompt::{Prompter, TerminalPrompter};

pub const POOL_TYPES: [&str; 2] = ["Spot", "On-Demand"];

/// Wizard steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SelectRegion,
    EnterName,
    SelectKubernetesVersion,
    SelectCni,
    AddNodePools,
    Confirm,
}

impl WizardStep {
    pub const ALL: [Self; 6] = [
        Self::SelectRegion,
        Self::EnterName,
        Self::SelectKubernetesVersion,
        Self::SelectCni,
        Self::AddNodePools,
        Self::Confirm,
    ];

    pub const TOTAL_STEPS: usize = Self::ALL.len();

    /// 1-based position.
    #[must_use]
    pub fn step_number(self) -> usize {
        self as usize + 1
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::SelectRegion => "Select region",
            Self::EnterName => "Name the cloudspace",
            Self::SelectKubernetesVersion => "Select Kubernetes version",
            Self::SelectCni => "Select CNI plugin",
            Self::AddNodePools => "Add node pools",
            Self::Confirm => "Review and confirm",
        }
    }
}

/// Where the wizard is.
#[derive(Debug)]
pub enum WizardState {
    /// About to run the step at this index of [`WizardStep::ALL`].
    Running(usize),
    Cancelled,
    Failed(ProvisionError),
    Completed(CreateRequest),
}

/// Preselected answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardDefaults {
    pub region: Option<String>,
    pub kubernetes_version: String,
    pub cni: String,
}

impl Default for WizardDefaults {
    fn default() -> Self {
        Self {
            region: None,
            kubernetes_version: DEFAULT_KUBERNETES_VERSION.to_string(),
            cni: DEFAULT_CNI.to_string(),
        }
    }
}

impl WizardDefaults {
    #[must_use]
    pub fn from_config(config: &SpotConfig) -> Self {
        let non_empty = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let fallback = Self::default();
        Self {
            region: non_empty(Some(config.region.as_str())),
            kubernetes_version: non_empty(config.kubernetes_version.as_deref())
                .unwrap_or(fallback.kubernetes_version),
            cni: non_empty(config.cni.as_deref()).unwrap_or(fallback.cni),
        }
    }
}

/// Outcome of one step that did not error.
enum Flow {
    Next,
    /// The operator backed out or declined.
    Abort,
}

type StepResult = Result<Flow, ProvisionError>;

/// Unwrap a prompt answer, or stop the step when the operator backed out.
macro_rules! answer {
    ($prompt:expr) => {
        match $prompt? {
            Some(value) => value,
            None => return Ok(Flow::Abort),
        }
    };
}

/// Choice list with `default` inserted at the front when missing.
fn options_with_default(fixed: &[&str], default: &str) -> (Vec<String>, usize) {
    let mut items: Vec<String> = fixed.iter().map(|s| (*s).to_string()).collect();
    match items.iter().position(|item| item == default) {
        Some(index) => (items, index),
        None => {
            items.insert(0, default.to_string());
            (items, 0)
        }
    }
}

fn describe_server_class(class: &ServerClass, spot: bool) -> String {
    let price = if spot {
        format!(
            "min bid ${}",
            price::normalize_or_default(Some(class.min_bid_price_per_hour.as_str()))
        )
    } else {
        format!("${}/hr", class.on_demand_price_per_hour.trim_start_matches('$'))
    };
    format!(
        "{} ({} CPU, {} memory, {price})",
        class.name, class.resources.cpu, class.resources.memory
    )
}

/// Step-by-step collector of a [`CreateRequest`].
pub struct Wizard<'a> {
    api: &'a dyn SpotApi,
    prompter: &'a mut dyn Prompter,
    cancel: CancellationToken,
    defaults: WizardDefaults,
    state: WizardState,
    draft: CreateRequest,
}

impl<'a> Wizard<'a> {
    pub fn new(
        api: &'a dyn SpotApi,
        prompter: &'a mut dyn Prompter,
        cancel: CancellationToken,
        defaults: WizardDefaults,
    ) -> Self {
        Self {
            api,
            prompter,
            cancel,
            defaults,
            state: WizardState::Running(0),
            draft: CreateRequest::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// The request collected so far.
    #[must_use]
    pub fn draft(&self) -> &CreateRequest {
        &self.draft
    }

    /// Run the current step and advance. Does nothing once terminal.
    pub async fn step(&mut self) -> &WizardState {
        let WizardState::Running(index) = self.state else {
            return &self.state;
        };

        if self.cancel.is_cancelled() {
            debug!(step = index, "Cancellation observed at wizard step boundary");
            self.state = WizardState::Cancelled;
            return &self.state;
        }

        let step = WizardStep::ALL[index];
        ui::print_step(step.step_number(), WizardStep::TOTAL_STEPS, step.description());

        let result = match step {
            WizardStep::SelectRegion => self.select_region().await,
            WizardStep::EnterName => self.enter_name(),
            WizardStep::SelectKubernetesVersion => self.select_kubernetes_version(),
            WizardStep::SelectCni => self.select_cni(),
            WizardStep::AddNodePools => self.add_node_pools().await,
            WizardStep::Confirm => self.confirm(),
        };

        self.state = match result {
            Ok(Flow::Next) if index + 1 == WizardStep::TOTAL_STEPS => {
                WizardState::Completed(std::mem::take(&mut self.draft))
            }
            Ok(Flow::Next) => WizardState::Running(index + 1),
            Ok(Flow::Abort) | Err(ProvisionError::Cancelled) => WizardState::Cancelled,
            Err(err) => WizardState::Failed(err),
        };
        &self.state
    }

    /// Run every remaining step.
    ///
    /// # Errors
    /// Returns [`ProvisionError::Cancelled`] when the operator aborted, or the
    /// error that failed a step.
    pub async fn run(mut self) -> Result<CreateRequest, ProvisionError> {
        while let WizardState::Running(_) = self.step().await {}

        match self.state {
            WizardState::Completed(request) => Ok(request),
            WizardState::Failed(err) => Err(err),
            WizardState::Cancelled | WizardState::Running(_) => Err(ProvisionError::Cancelled),
        }
    }

    async fn select_region(&mut self) -> StepResult {
        let regions = match self.api.list_regions().await {
            Ok(regions) => regions,
            Err(err) => {
                warn!(error = %err, "Cannot list regions, falling back to manual entry");
                Vec::new()
            }
        };

        if regions.is_empty() {
            return self.enter_region();
        }

        let names: Vec<String> = regions.into_iter().map(|region| region.name).collect();
        let default = self
            .defaults
            .region
            .as_ref()
            .and_then(|region| names.iter().position(|name| name == region))
            .unwrap_or(0);
        let index = answer!(self.prompter.select("Select region", &names, default));
        self.draft.region.clone_from(&names[index]);
        Ok(Flow::Next)
    }

    fn enter_region(&mut self) -> StepResult {
        loop {
            let default = self.defaults.region.clone();
            let region = answer!(self
                .prompter
                .input("Enter region (e.g., us-central-ord-1)", default.as_deref()));
            let region = region.trim();
            if region.is_empty() {
                self.prompter
                    .show("Region cannot be empty. Please enter a valid region.");
            } else if !is_valid_region(region) {
                self.prompter.show(&format!(
                    "Region {region} is not valid. Available regions: {}",
                    VALID_REGIONS.join(", ")
                ));
            } else {
                self.draft.region = region.to_string();
                return Ok(Flow::Next);
            }
        }
    }

    fn enter_name(&mut self) -> StepResult {
        loop {
            let name = answer!(self.prompter.input("Cloudspace name", None));
            let name = name.trim();
            if !name.is_empty() {
                self.draft.name = name.to_string();
                return Ok(Flow::Next);
            }
            self.prompter
                .show("Name cannot be empty. Please enter a valid name.");
        }
    }

    fn select_kubernetes_version(&mut self) -> StepResult {
        let (items, default) =
            options_with_default(&KUBERNETES_VERSIONS, &self.defaults.kubernetes_version);
        let index = answer!(self.prompter.select("Kubernetes version", &items, default));
        self.draft.kubernetes_version.clone_from(&items[index]);
        Ok(Flow::Next)
    }

    fn select_cni(&mut self) -> StepResult {
        let (items, default) = options_with_default(&CNI_PLUGINS, &self.defaults.cni);
        let index = answer!(self.prompter.select("CNI plugin", &items, default));
        self.draft.cni.clone_from(&items[index]);
        Ok(Flow::Next)
    }

    async fn add_node_pools(&mut self) -> StepResult {
        let classes = self.api.list_server_classes(&self.draft.region).await?;
        if classes.is_empty() {
            return Err(ProvisionError::NoServerClasses {
                region: self.draft.region.clone(),
            });
        }

        loop {
            let pool_types: Vec<String> = POOL_TYPES.iter().map(|s| (*s).to_string()).collect();
            let spot = answer!(self.prompter.select("Node pool type", &pool_types, 0)) == 0;

            let items: Vec<String> = classes
                .iter()
                .map(|class| describe_server_class(class, spot))
                .collect();
            let index = answer!(self.prompter.select("Server class", &items, 0));
            let server_class = classes[index].name.clone();

            if spot {
                let min_bid = self.minimum_bid(&server_class).await;
                let desired = answer!(self.desired_count());
                let bid_price = answer!(self.bid_price(&min_bid));
                self.draft.spot_pools.push(SpotPoolSpec {
                    name: generate_pool_name(),
                    server_class,
                    desired,
                    bid_price,
                });
            } else {
                let desired = answer!(self.desired_count());
                self.draft.on_demand_pools.push(OnDemandPoolSpec {
                    name: generate_pool_name(),
                    server_class,
                    desired,
                });
            }

            if !answer!(self.prompter.confirm("Add another node pool?", false)) {
                return Ok(Flow::Next);
            }
        }
    }

    async fn minimum_bid(&self, server_class: &str) -> String {
        match self.api.get_minimum_bid_price(server_class).await {
            Ok(price) => price::normalize_or_default(Some(price.as_str())),
            Err(err) => {
                warn!(server_class = %server_class, error = %err, "Cannot fetch minimum bid price");
                DEFAULT_MIN_BID_PRICE.to_string()
            }
        }
    }

    fn desired_count(&mut self) -> Result<Option<u32>, ProvisionError> {
        loop {
            let Some(raw) = self.prompter.input("Desired number of nodes", Some("1"))? else {
                return Ok(None);
            };
            match raw.trim().parse::<u32>() {
                Ok(desired) if desired >= 1 => return Ok(Some(desired)),
                _ => self.prompter.show("Please enter a valid number >= 1."),
            }
        }
    }

    fn bid_price(&mut self, min_bid: &str) -> Result<Option<String>, ProvisionError> {
        let prompt = format!("Maximum bid price (minimum: ${min_bid})");
        loop {
            let Some(raw) = self.prompter.input(&prompt, Some(min_bid))? else {
                return Ok(None);
            };
            match price::normalize(&raw) {
                Ok(bid) => return Ok(Some(bid)),
                Err(err) => self.prompter.show(&format!("Invalid bid price: {err}")),
            }
        }
    }

    fn confirm(&mut self) -> StepResult {
        let summary = ui::render_summary(&self.draft);
        self.prompter.show(&summary);
        if answer!(self.prompter.confirm("Create this cloudspace?", true)) {
            Ok(Flow::Next)
        } else {
            Ok(Flow::Abort)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_numbered_in_order() {
        let numbers: Vec<usize> = WizardStep::ALL.iter().map(|s| s.step_number()).collect();
        assert_eq!(numbers, [1, 2, 3, 4, 5, 6]);
        assert_eq!(WizardStep::TOTAL_STEPS, 6);
    }

    #[test]
    fn test_default_inserted_when_missing() {
        let (items, index) = options_with_default(&KUBERNETES_VERSIONS, "1.32.0");
        assert_eq!(items[0], "1.32.0");
        assert_eq!(items.len(), 4);
        assert_eq!(index, 0);

        let (items, index) = options_with_default(&CNI_PLUGINS, "cilium");
        assert_eq!(items.len(), 3);
        assert_eq!(items[index], "cilium");
    }

    #[test]
    fn test_defaults_from_config() {
        let config = SpotConfig {
            region: "uk-lon-1".into(),
            cni: Some(" ".into()),
            kubernetes_version: Some("1.30.10".into()),
            ..SpotConfig::default()
        };
        let defaults = WizardDefaults::from_config(&config);
        assert_eq!(defaults.region.as_deref(), Some("uk-lon-1"));
        assert_eq!(defaults.kubernetes_version, "1.30.10");
        assert_eq!(defaults.cni, DEFAULT_CNI);
        assert_eq!(WizardDefaults::from_config(&SpotConfig::default()).region, None);
    }

    #[test]
    fn test_describe_server_class() {
        let class = ServerClass {
            name: "gp.vs1.medium-ord".into(),
            region: "us-central-ord-1".into(),
            resources: spot_api::ServerClassResources {
                cpu: "2".into(),
                memory: "4GB".into(),
            },
            min_bid_price_per_hour: "$0.002".into(),
            current_market_price_per_hour: "0.004".into(),
            on_demand_price_per_hour: "$0.05".into(),
        };
        assert_eq!(
            describe_server_class(&class, true),
            "gp.vs1.medium-ord (2 CPU, 4GB memory, min bid $0.002)"
        );
        assert_eq!(
            describe_server_class(&class, false),
            "gp.vs1.medium-ord (2 CPU, 4GB memory, $0.05/hr)"
        );
    }
}
