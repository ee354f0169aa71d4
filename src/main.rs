use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

use contract_registry::config_loader;
use contract_registry::deployer::{PlannedDeployer, SimulatedDeployer};
use contract_registry::orchestrator::{run_deployment, summarize_changes};
use contract_registry::registry::{
    contract_path_by_network, read_network_registry, resolve_contract_address, write_registry,
};

/// Records deployed smart contract addresses into per-network manifests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a deployment plan and replace the network's manifest
    Deploy {
        /// Path to the deployment plan YAML file
        #[arg(short, long)]
        plan: PathBuf,

        /// Target network
        #[arg(short, long)]
        network: String,

        /// Manifest directory (overrides the plan's manifest_dir)
        #[arg(short, long)]
        manifest_dir: Option<PathBuf>,

        /// Simulate deployments and print the registry instead of writing it
        #[arg(long)]
        dry_run: bool,

        /// Seed for simulated addresses
        #[arg(long, default_value = "0", requires = "dry_run")]
        seed: u64,
    },

    /// Print a network's manifest
    Show {
        #[arg(short, long)]
        network: String,

        #[arg(short, long, default_value = "contracts")]
        manifest_dir: PathBuf,
    },

    /// Print the address recorded under a key
    Resolve {
        #[arg(short, long)]
        network: String,

        #[arg(short, long)]
        key: String,

        #[arg(short, long, default_value = "contracts")]
        manifest_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging with the requested filter level
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    match cli.command {
        Commands::Deploy { plan, network, manifest_dir, dry_run, seed } => {
            let plan = config_loader::load_plan(&plan)?;

            // CLI directory takes precedence over the plan's
            let manifest_dir = manifest_dir.unwrap_or_else(|| plan.general.manifest_dir.clone());
            let environment = plan.general.environment.clone();

            if dry_run {
                info!("Dry run with seed {}; nothing will be written", seed);
                let registry = run_deployment(&plan, SimulatedDeployer::new(seed), &network)?;
                println!("{}", serde_json::to_string_pretty(&registry)?);
                return Ok(());
            }

            // Resolve the manifest path before deploying anything
            let path = contract_path_by_network(&manifest_dir, &network)?;
            let registry = run_deployment(&plan, PlannedDeployer::new(), &network)
                .wrap_err_with(|| format!("Deployment to '{}' failed; manifest left untouched", network))?;

            // The previous manifest is only read to report what changes
            match read_network_registry(&manifest_dir, &network) {
                Ok(previous) => {
                    for change in summarize_changes(&previous, &registry) {
                        info!("{}", change);
                    }
                }
                Err(e) => warn!("Could not read previous manifest: {}", e),
            }

            // Replace the manifest in one atomic write
            write_registry(&path, &registry, &environment)
                .wrap_err_with(|| format!("Failed to write manifest '{}'", path.display()))?;
            info!("Manifest for '{}' written to {:?}", network, path);
        }
        Commands::Show { network, manifest_dir } => {
            let registry = read_network_registry(&manifest_dir, &network)?;
            println!("{}", serde_json::to_string_pretty(&registry)?);
        }
        Commands::Resolve { network, key, manifest_dir } => {
            let registry = read_network_registry(&manifest_dir, &network)?;
            let address = resolve_contract_address(&registry.entries, &key)
                .wrap_err_with(|| format!("Key '{}' is not registered on '{}'", key, network))?;
            println!("{}", address);
        }
    }

    Ok(())
}
