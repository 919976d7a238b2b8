//! UI helpers for the spotctl CLI.
//!
//! Progress and status lines go to stdout; rendered resources use
//! [`crate::output`].

use std::fmt::Write as _;

use colored::Colorize;

use crate::request::CreateRequest;

/// Print a progress step with step number.
pub fn print_step(current: usize, total: usize, message: &str) {
    println!(
        "{} {} {}",
        format!("[{current}/{total}]").bright_black(),
        "▶".cyan(),
        message.bold()
    );
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Human-readable summary of a request, shown before the wizard's final
/// confirmation.
#[must_use]
pub fn render_summary(request: &CreateRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Cloudspace Configuration:".bold());
    for (label, value) in [
        ("Name:", request.name.as_str()),
        ("Region:", request.region.as_str()),
        ("Kubernetes Version:", request.kubernetes_version.as_str()),
        ("CNI:", request.cni.as_str()),
    ] {
        let _ = writeln!(out, "• {label:<20} {}", value.cyan());
    }

    if !request.spot_pools.is_empty() {
        let _ = writeln!(out, "\n{}", "Spot Node Pools:".bold());
        for pool in &request.spot_pools {
            let _ = writeln!(out, "  • {}", pool.name.cyan());
            let _ = writeln!(out, "    {:<15} {}", "Server Class:", pool.server_class);
            let _ = writeln!(out, "    {:<15} {}", "Desired Nodes:", pool.desired);
            let _ = writeln!(out, "    {:<15} ${}", "Bid Price:", pool.bid_price);
        }
    }

    if !request.on_demand_pools.is_empty() {
        let _ = writeln!(out, "\n{}", "On-Demand Node Pools:".bold());
        for pool in &request.on_demand_pools {
            let _ = writeln!(out, "  • {}", pool.name.cyan());
            let _ = writeln!(out, "    {:<15} {}", "Server Class:", pool.server_class);
            let _ = writeln!(out, "    {:<15} {}", "Desired Nodes:", pool.desired);
        }
    }

    out
}
