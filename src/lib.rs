//! # contract-registry - per-network manifests of deployed smart contracts
//!
//! This library records the addresses of contracts published during a
//! deployment run into a manifest file scoped to one network, so that
//! front-ends and later deployments can look them up by key.
//!
//! ## Overview
//!
//! A run deploys the contracts of a plan in order, collects each instance
//! into a [`registry::RegistryBuilder`], and writes the resulting
//! [`registry::Registry`] exactly once. The previous manifest for the
//! network is replaced atomically; manifests of other networks are never
//! touched.
//!
//! ## Architecture
//!
//! - `registry`: manifest types, per-run builder, atomic persistence, lookups
//! - `orchestrator`: ordered deployment with `@key` constructor references
//! - `deployer`: record-mode and simulated `Deployer` implementations
//! - `config`: deployment plan structures and validation
//! - `config_loader`: plan file loading
//! - `utils`: address and network validation, option merging
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use contract_registry::{config_loader, deployer::PlannedDeployer, orchestrator, registry};
//! use std::path::Path;
//!
//! let plan = config_loader::load_plan(Path::new("deploy.yaml"))?;
//! let built = orchestrator::run_deployment(&plan, PlannedDeployer::new(), "ropsten")?;
//! registry::write_network_registry(&plan.general.manifest_dir, &built, &plan.general.environment)?;
//!
//! let manifest = registry::read_network_registry(&plan.general.manifest_dir, "ropsten")?;
//! let chef = registry::resolve_contract_address(&manifest.entries, "optionchef")?;
//! println!("OptionChef lives at {}", chef);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return typed errors (`RegistryError`, `DeployError`,
//! `ValidationError`); the binary reports them through `color_eyre`.

pub mod config;
pub mod config_loader;
pub mod deployer;
pub mod orchestrator;
pub mod registry;
pub mod utils;
