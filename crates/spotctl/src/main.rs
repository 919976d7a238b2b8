//! spotctl - provision and manage Spot cloudspaces.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spotctl::commands::cloudspaces::CloudspacesCommand;
use spotctl::commands::nodepools::NodepoolsCommand;
use spotctl::commands::organizations::OrganizationsCommand;
use spotctl::commands::pricing::PricingCommand;
use spotctl::commands::regions::RegionsCommand;
use spotctl::commands::serverclasses::ServerclassesCommand;
use spotctl::commands::Context;
use spotctl::output::OutputFormat;
use spotctl::{ui, ProvisionError, SagaError};

const EXIT_CANCELLED: u8 = 130;

/// spotctl - Spot cloudspace provisioning.
#[derive(Parser)]
#[command(name = "spotctl", version, about = "Provision and manage Spot cloudspaces")]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// CLI configuration file (default: ~/.spot_config).
    #[arg(long, global = true, env = "SPOT_CONFIG", value_name = "PATH")]
    spot_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage cloudspaces.
    #[command(visible_alias = "cs")]
    Cloudspaces(CloudspacesCommand),

    /// Inspect and delete node pools.
    Nodepools(NodepoolsCommand),

    /// Inspect organizations.
    #[command(visible_aliases = ["org", "organization"])]
    Organizations(OrganizationsCommand),

    /// Inspect regions.
    Regions(RegionsCommand),

    /// Inspect server classes.
    Serverclasses(ServerclassesCommand),

    /// Inspect pricing.
    Pricing(PricingCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info,spotctl=debug,spot_api=debug")
        } else {
            EnvFilter::new("warn,spotctl=info,spot_api=info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let ctx = Context {
        output: cli.output,
        spot_config: cli.spot_config,
        cancel,
    };

    let result = match &cli.command {
        Commands::Cloudspaces(cmd) => cmd.run(&ctx).await,
        Commands::Nodepools(cmd) => cmd.run(&ctx).await,
        Commands::Organizations(cmd) => cmd.run(&ctx).await,
        Commands::Regions(cmd) => cmd.run(&ctx).await,
        Commands::Serverclasses(cmd) => cmd.run(&ctx).await,
        Commands::Pricing(cmd) => cmd.run(&ctx).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_cancelled(&err) => {
            ui::print_warning("Operation cancelled by user");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(err) => {
            ui::print_error(&report(&err));
            ExitCode::FAILURE
        }
    }
}

/// Fire `cancel` on Ctrl+C or SIGTERM. The saga and the wizard poll it.
async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, cancelling"),
        () = terminate => info!("Received SIGTERM, cancelling"),
    }
    cancel.cancel();
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<SagaError>()
            .is_some_and(SagaError::is_cancelled)
            || cause
                .downcast_ref::<ProvisionError>()
                .is_some_and(ProvisionError::is_cancelled)
    })
}

/// Join the error chain, skipping causes a parent message already includes.
fn report(err: &anyhow::Error) -> String {
    let mut message = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if message.contains(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}
