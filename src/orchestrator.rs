//! Deployment orchestrator.
//!
//! This module walks a deployment plan in order, asks a [`Deployer`] to
//! publish each contract, feeds constructor arguments that reference
//! earlier contracts, and accumulates the resulting registry. Persisting
//! the registry is left to the caller so that a failure anywhere in the
//! run writes nothing.

use crate::config::{ContractPlan, DeployPlan};
use crate::registry::{
    encode_contract_entry, find_contract_address, is_reserved_key, ContractAddress, ContractInstance, Registry,
    RegistryBuilder, RegistryError,
};
use crate::utils::options::merge_options;
use crate::utils::validation::validate_network_name;
use log::{debug, info};
use std::collections::HashMap;

/// Errors that abort a deployment run
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Contract '{contract}' references '@{reference}', which has no deployed address")]
    UnresolvedReference { contract: String, reference: String },

    #[error("No address available for contract '{key}'")]
    MissingAddress { key: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Publishes one contract and reports where it landed.
///
/// Implementations block until the contract is deployed. `args` are the
/// constructor arguments with every `@<key>` reference already replaced by
/// an address.
pub trait Deployer {
    fn deploy(&mut self, contract: &ContractPlan, args: &[String]) -> Result<ContractInstance, DeployError>;
}

impl<D: Deployer + ?Sized> Deployer for &mut D {
    fn deploy(&mut self, contract: &ContractPlan, args: &[String]) -> Result<ContractInstance, DeployError> {
        (**self).deploy(contract, args)
    }
}

/// Replace `@<key>` arguments with the address deployed under that key
pub fn resolve_args(
    contract: &ContractPlan,
    deployed: &HashMap<String, ContractAddress>,
) -> Result<Vec<String>, DeployError> {
    contract
        .args
        .iter()
        .flatten()
        .map(|arg| match arg.strip_prefix('@') {
            Some(reference) => deployed
                .get(reference)
                .map(|address| address.to_string())
                .ok_or_else(|| DeployError::UnresolvedReference {
                    contract: contract.key.clone(),
                    reference: reference.to_string(),
                }),
            None => Ok(arg.clone()),
        })
        .collect()
}

/// Deploy every contract of `plan` to `network` and return the registry
/// to persist.
///
/// Contracts are deployed strictly in plan order. The reserved
/// `migrations` contract is deployed and can be referenced, but is not
/// recorded.
pub fn run_deployment<D: Deployer>(plan: &DeployPlan, mut deployer: D, network: &str) -> Result<Registry, DeployError> {
    validate_network_name(network).map_err(RegistryError::InvalidNetwork)?;
    info!(
        "Migrating {} contract(s) to {}, {} to record",
        plan.contracts.len(),
        network,
        plan.recorded_contracts().count()
    );

    let mut builder = RegistryBuilder::new(network);
    let mut deployed: HashMap<String, ContractAddress> = HashMap::new();

    for contract in &plan.contracts {
        let args = resolve_args(contract, &deployed)?;
        info!("Deploying {} ('{}')...", contract.name, contract.key);
        let instance = deployer.deploy(contract, &args)?;
        if let Some(tx) = &instance.transaction_hash {
            debug!("{} deployed in transaction {}", contract.name, tx);
        }

        // Reserved contracts must still report a usable address for `@` references
        if is_reserved_key(&contract.key) {
            let entry = encode_contract_entry(&instance, &contract.name, &contract.key, Default::default())?;
            deployed.insert(contract.key.clone(), entry.address);
            debug!("Not recording reserved contract '{}'", contract.key);
            continue;
        }

        let options = merge_options(plan.general().default_options.as_ref(), contract.options.as_ref());
        let entry = builder.assign(&instance, &contract.name, &contract.key, Some(options))?;
        deployed.insert(contract.key.clone(), entry.address.clone());
    }

    info!(
        "Deployment to {} produced {} registry entries",
        builder.network(),
        builder.entries().len()
    );
    Ok(builder.finish())
}

/// Describe how `next` differs from the manifest it is about to replace.
///
/// The previous manifest is only consulted for these messages; it never
/// feeds into the new registry.
pub fn summarize_changes(previous: &Registry, next: &Registry) -> Vec<String> {
    let mut changes = Vec::new();

    for entry in &next.entries {
        match find_contract_address(&previous.entries, &entry.key) {
            None => changes.push(format!("+ {} ({}) at {}", entry.key, entry.name, entry.address)),
            Some(old) if old != &entry.address => {
                changes.push(format!("~ {} ({}) {} -> {}", entry.key, entry.name, old, entry.address))
            }
            Some(_) => {}
        }
    }

    for entry in &previous.entries {
        if next.get(&entry.key).is_none() {
            changes.push(format!("- {} ({}) at {}", entry.key, entry.name, entry.address));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ContractEntry;
    use crate::utils::options::ContractOptions;
    use serde_json::json;

    const HEGIC: &str = "0xefc0eeadc1132a12c9487d800112693bf49ecfa2";

    /// Hands out sequential addresses and remembers what it was asked
    struct CountingDeployer {
        calls: Vec<(String, Vec<String>)>,
    }

    impl Deployer for CountingDeployer {
        fn deploy(&mut self, contract: &ContractPlan, args: &[String]) -> Result<ContractInstance, DeployError> {
            self.calls.push((contract.key.clone(), args.to_vec()));
            Ok(ContractInstance::at(format!("0x{:040x}", self.calls.len())))
        }
    }

    fn contract(key: &str, name: &str, args: &[&str]) -> ContractPlan {
        ContractPlan {
            key: key.to_string(),
            name: name.to_string(),
            address: None,
            args: Some(args.iter().map(|a| a.to_string()).collect()),
            options: None,
        }
    }

    fn hegex_plan() -> DeployPlan {
        DeployPlan {
            general: Default::default(),
            contracts: vec![
                contract("migrations", "Migrations", &[]),
                contract("optionchef", "OptionChef", &[HEGIC]),
                contract("hegexoption", "Hegexoption", &["@optionchef", "https://example.org/meta/"]),
            ],
        }
    }

    #[test]
    fn test_deploys_in_order_and_skips_reserved() {
        let mut deployer = CountingDeployer { calls: Vec::new() };
        let registry = run_deployment(&hegex_plan(), &mut deployer, "ropsten").unwrap();

        let order: Vec<_> = deployer.calls.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, vec!["migrations", "optionchef", "hegexoption"]);

        assert_eq!(registry.network, "ropsten");
        let keys: Vec<_> = registry.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["optionchef", "hegexoption"]);
        assert!(registry.get("migrations").is_none());
    }

    #[test]
    fn test_references_resolve_to_earlier_addresses() {
        let mut deployer = CountingDeployer { calls: Vec::new() };
        let registry = run_deployment(&hegex_plan(), &mut deployer, "ropsten").unwrap();

        let chef = registry.get("optionchef").unwrap().address.to_string();
        assert_eq!(deployer.calls[1].1, vec![HEGIC.to_string()]);
        assert_eq!(deployer.calls[2].1, vec![chef, "https://example.org/meta/".to_string()]);
    }

    #[test]
    fn test_unresolved_reference_aborts() {
        let plan = DeployPlan {
            general: Default::default(),
            contracts: vec![contract("hegexoption", "Hegexoption", &["@optionchef"])],
        };
        let mut deployer = CountingDeployer { calls: Vec::new() };

        let err = run_deployment(&plan, &mut deployer, "ropsten").unwrap_err();
        assert!(matches!(err, DeployError::UnresolvedReference { ref reference, .. } if reference == "optionchef"));
        assert!(deployer.calls.is_empty());
    }

    #[test]
    fn test_options_are_merged() {
        let mut plan = hegex_plan();
        let mut defaults = ContractOptions::new();
        defaults.insert("verified".to_string(), json!(false));
        plan.general.default_options = Some(defaults);

        let mut own = ContractOptions::new();
        own.insert("verified".to_string(), json!(true));
        plan.contracts[2].options = Some(own);

        let registry = run_deployment(&plan, CountingDeployer { calls: Vec::new() }, "ropsten").unwrap();
        assert_eq!(registry.get("optionchef").unwrap().options["verified"], json!(false));
        assert_eq!(registry.get("hegexoption").unwrap().options["verified"], json!(true));
    }

    #[test]
    fn test_instance_without_address_aborts() {
        struct Broken;
        impl Deployer for Broken {
            fn deploy(&mut self, _: &ContractPlan, _: &[String]) -> Result<ContractInstance, DeployError> {
                Ok(ContractInstance::default())
            }
        }

        let plan = DeployPlan {
            general: Default::default(),
            contracts: vec![contract("optionchef", "OptionChef", &[])],
        };
        let err = run_deployment(&plan, Broken, "ropsten").unwrap_err();
        assert!(matches!(err, DeployError::Registry(RegistryError::InvalidInstance { .. })));
    }

    #[test]
    fn test_reserved_contract_without_address_aborts() {
        /// Reports a malformed address for the reserved contract only
        struct BadMigrations(CountingDeployer);
        impl Deployer for BadMigrations {
            fn deploy(&mut self, contract: &ContractPlan, args: &[String]) -> Result<ContractInstance, DeployError> {
                if contract.key == "migrations" {
                    return Ok(ContractInstance::at("0x1234"));
                }
                self.0.deploy(contract, args)
            }
        }

        let mut plan = hegex_plan();
        plan.contracts[1].args = Some(vec!["@migrations".to_string()]);

        let mut deployer = BadMigrations(CountingDeployer { calls: Vec::new() });
        let err = run_deployment(&plan, &mut deployer, "ropsten").unwrap_err();
        assert!(matches!(
            err,
            DeployError::Registry(RegistryError::InvalidInstance { ref key, .. }) if key == "migrations"
        ));
        assert!(deployer.0.calls.is_empty());
    }

    #[test]
    fn test_reserved_contract_can_be_referenced() {
        let mut plan = hegex_plan();
        plan.contracts[1].args = Some(vec!["@migrations".to_string()]);

        let mut deployer = CountingDeployer { calls: Vec::new() };
        run_deployment(&plan, &mut deployer, "ropsten").unwrap();
        assert_eq!(deployer.calls[1].1, vec![format!("0x{:040x}", 1)]);
    }

    #[test]
    fn test_summarize_changes() {
        let entry = |key: &str, address: &str| ContractEntry {
            key: key.to_string(),
            name: key.to_uppercase(),
            address: ContractAddress::try_from(address).unwrap(),
            options: ContractOptions::new(),
        };
        let a = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let b = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

        let mut previous = Registry::empty("ropsten");
        previous.entries = vec![entry("optionchef", a), entry("oldtoken", a), entry("stable", b)];
        let mut next = Registry::empty("ropsten");
        next.entries = vec![entry("optionchef", b), entry("stable", b), entry("hegexoption", a)];

        let changes = summarize_changes(&previous, &next);
        assert_eq!(changes.len(), 3);
        assert!(changes[0].starts_with("~ optionchef"));
        assert!(changes[1].starts_with("+ hegexoption"));
        assert!(changes[2].starts_with("- oldtoken"));

        assert!(summarize_changes(&next, &next).is_empty());
    }

    #[test]
    fn test_invalid_network() {
        let err = run_deployment(&hegex_plan(), CountingDeployer { calls: Vec::new() }, "a/b").unwrap_err();
        assert!(matches!(err, DeployError::Registry(RegistryError::InvalidNetwork(_))));
    }
}
