//! Record-mode deployer.
//!
//! Contracts are published by an external framework, which reports their
//! addresses in the plan file. This deployer replays those addresses so the
//! run can be recorded into a manifest without touching the chain.

use crate::config::ContractPlan;
use crate::orchestrator::{DeployError, Deployer};
use crate::registry::ContractInstance;
use log::debug;

#[derive(Debug, Default)]
pub struct PlannedDeployer;

impl PlannedDeployer {
    pub fn new() -> Self {
        PlannedDeployer
    }
}

impl Deployer for PlannedDeployer {
    fn deploy(&mut self, contract: &ContractPlan, args: &[String]) -> Result<ContractInstance, DeployError> {
        let address = contract.address.as_ref().ok_or_else(|| DeployError::MissingAddress {
            key: contract.key.clone(),
        })?;
        if !args.is_empty() {
            debug!("{} was constructed with {:?}", contract.name, args);
        }
        Ok(ContractInstance::at(address.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(address: Option<&str>) -> ContractPlan {
        ContractPlan {
            key: "optionchef".to_string(),
            name: "OptionChef".to_string(),
            address: address.map(str::to_string),
            args: None,
            options: None,
        }
    }

    #[test]
    fn test_replays_plan_address() {
        let address = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let instance = PlannedDeployer::new().deploy(&contract(Some(address)), &[]).unwrap();
        assert_eq!(instance.address.as_deref(), Some(address));
    }

    #[test]
    fn test_missing_address() {
        let err = PlannedDeployer::new().deploy(&contract(None), &[]).unwrap_err();
        assert!(matches!(err, DeployError::MissingAddress { ref key } if key == "optionchef"));
    }
}
