//! Rendering of command results.

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use spot_api::{CloudSpace, OnDemandNodePool, Organization, Region, ServerClass, SpotNodePool};

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

/// A resource that can be shown as one table row.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for CloudSpace {
    const HEADERS: &'static [&'static str] = &["NAME", "REGION", "K8S VERSION", "CNI", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.region.clone(),
            self.kubernetes_version.clone(),
            self.cni.clone(),
            self.status.clone().unwrap_or_else(|| "-".into()),
        ]
    }
}

impl TableRow for Organization {
    const HEADERS: &'static [&'static str] = &["NAME", "DISPLAY NAME", "ID"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.display_name.clone().unwrap_or_default(),
            self.id.clone().unwrap_or_default(),
        ]
    }
}

impl TableRow for SpotNodePool {
    const HEADERS: &'static [&'static str] =
        &["NAME", "CLOUDSPACE", "SERVER CLASS", "DESIRED", "BID PRICE", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.cloudspace.clone(),
            self.server_class.clone(),
            self.desired.to_string(),
            format!("${}", self.bid_price),
            self.status.clone().unwrap_or_else(|| "-".into()),
        ]
    }
}

impl TableRow for OnDemandNodePool {
    const HEADERS: &'static [&'static str] =
        &["NAME", "CLOUDSPACE", "SERVER CLASS", "DESIRED", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.cloudspace.clone(),
            self.server_class.clone(),
            self.desired.to_string(),
            self.status.clone().unwrap_or_else(|| "-".into()),
        ]
    }
}

impl TableRow for Region {
    const HEADERS: &'static [&'static str] = &["NAME", "DESCRIPTION"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.description.clone().unwrap_or_default(),
        ]
    }
}

impl TableRow for ServerClass {
    const HEADERS: &'static [&'static str] =
        &["NAME", "REGION", "CPU", "MEMORY", "MIN BID", "MARKET", "ON-DEMAND"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.region.clone(),
            self.resources.cpu.clone(),
            self.resources.memory.clone(),
            self.min_bid_price_per_hour.clone(),
            self.current_market_price_per_hour.clone(),
            self.on_demand_price_per_hour.clone(),
        ]
    }
}

/// Minimum bid for a server class, as reported by `pricing get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub server_class: String,
    pub minimum_bid_price: String,
}

impl TableRow for PriceQuote {
    const HEADERS: &'static [&'static str] = &["SERVER CLASS", "MIN BID PRICE"];

    fn cells(&self) -> Vec<String> {
        vec![self.server_class.clone(), format!("${}", self.minimum_bid_price)]
    }
}

/// Render a single resource.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_one<T: Serialize + TableRow>(item: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(item)?),
        OutputFormat::Table => Ok(table(std::slice::from_ref(item))),
    }
}

/// Render a list of resources.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_list<T: Serialize + TableRow>(items: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(items)?),
        OutputFormat::Table => Ok(table(items)),
    }
}

fn table<T: TableRow>(items: &[T]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        T::HEADERS
            .iter()
            .map(|header| Cell::new(header).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    for item in items {
        table.add_row(item.cells());
    }
    table.to_string()
}
