use crate::registry::is_reserved_key;
use crate::utils::options::ContractOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// A deployment plan: which contracts to publish, in order
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeployPlan {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub contracts: Vec<ContractPlan>,
}

impl DeployPlan {
    /// Validate the plan
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.general.environment.is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "environment cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, contract) in self.contracts.iter().enumerate() {
            if contract.key.is_empty() {
                return Err(ValidationError::InvalidContract(format!(
                    "contract #{} has an empty key",
                    i
                )));
            }
            if contract.name.is_empty() {
                return Err(ValidationError::InvalidContract(format!(
                    "contract '{}' has an empty name",
                    contract.key
                )));
            }
            if !seen.insert(contract.key.as_str()) {
                return Err(ValidationError::InvalidContract(format!(
                    "key '{}' is declared more than once",
                    contract.key
                )));
            }

            // References may only point backwards
            for arg in contract.args.iter().flatten() {
                if let Some(target) = arg.strip_prefix('@') {
                    if !seen.contains(target) || target == contract.key {
                        return Err(ValidationError::InvalidContract(format!(
                            "contract '{}' references '{}', which is not deployed before it",
                            contract.key, arg
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Get the general configuration
    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }

    /// Contracts whose addresses end up in the manifest
    pub fn recorded_contracts(&self) -> impl Iterator<Item = &ContractPlan> {
        self.contracts.iter().filter(|c| !is_reserved_key(&c.key))
    }
}

/// Settings shared by every contract in the plan
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Deployment environment tag, used in log lines
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Directory holding the per-network manifests
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,
    /// Options layered under every contract's own options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_options: Option<ContractOptions>,
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("contracts")
}

/// One contract to deploy
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContractPlan {
    pub key: String,
    pub name: String,
    /// Address already published by the deployment framework
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Constructor arguments; `@<key>` stands for an earlier contract's address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ContractOptions>,
}

/// Plan validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid contract configuration: {0}")]
    InvalidContract(String),
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            manifest_dir: default_manifest_dir(),
            default_options: None,
        }
    }
}
