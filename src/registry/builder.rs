//! Per-run accumulation of registry entries.

use super::types::{ContractAddress, ContractEntry, ContractHandle, Registry, RegistryError};
use crate::utils::options::ContractOptions;
use log::{info, warn};

/// Key of the deployment-tracking contract.
///
/// It is deployed on every run but its address is never recorded.
pub const MIGRATIONS_KEY: &str = "migrations";

/// Whether `key` names a contract that is deployed but never recorded
pub fn is_reserved_key(key: &str) -> bool {
    key == MIGRATIONS_KEY
}

/// Turn a deployed instance into a registry entry.
///
/// Fails with [`RegistryError::InvalidInstance`] when the instance exposes
/// no address or one that is not a well-formed contract address.
pub fn encode_contract_entry<H: ContractHandle + ?Sized>(
    instance: &H,
    name: &str,
    key: &str,
    options: ContractOptions,
) -> Result<ContractEntry, RegistryError> {
    let raw = instance.address().ok_or_else(|| RegistryError::InvalidInstance {
        key: key.to_string(),
        reason: "instance has no address field".to_string(),
    })?;

    let address = ContractAddress::try_from(raw).map_err(|reason| RegistryError::InvalidInstance {
        key: key.to_string(),
        reason,
    })?;

    Ok(ContractEntry {
        key: key.to_string(),
        name: name.to_string(),
        address,
        options,
    })
}

/// Accumulates the entries of one deployment run.
///
/// Keys behave like a map: assigning a key a second time replaces the
/// earlier entry in place, so the finished registry never holds duplicates.
#[derive(Debug)]
pub struct RegistryBuilder {
    network: String,
    entries: Vec<ContractEntry>,
}

impl RegistryBuilder {
    pub fn new(network: impl Into<String>) -> Self {
        RegistryBuilder {
            network: network.into(),
            entries: Vec::new(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn entries(&self) -> &[ContractEntry] {
        &self.entries
    }

    /// Encode `instance` and add it under `key`.
    pub fn assign<H: ContractHandle + ?Sized>(
        &mut self,
        instance: &H,
        name: &str,
        key: &str,
        options: Option<ContractOptions>,
    ) -> Result<&ContractEntry, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidEntry(format!(
                "contract name for key '{}' cannot be empty",
                key
            )));
        }
        if key.is_empty() {
            return Err(RegistryError::InvalidEntry(format!(
                "registry key for contract '{}' cannot be empty",
                name
            )));
        }

        info!("- Assigning '{}' to smart contract listing as '{}'", name, key);
        let entry = encode_contract_entry(instance, name, key, options.unwrap_or_default())?;
        Ok(self.insert(entry))
    }

    fn insert(&mut self, entry: ContractEntry) -> &ContractEntry {
        match self.entries.iter().position(|e| e.key == entry.key) {
            Some(idx) => {
                warn!(
                    "Key '{}' assigned twice in one run; replacing {} with {}",
                    entry.key, self.entries[idx].address, entry.address
                );
                self.entries[idx] = entry;
                &self.entries[idx]
            }
            None => {
                self.entries.push(entry);
                let last = self.entries.len() - 1;
                &self.entries[last]
            }
        }
    }

    /// Consume the builder and produce the registry to persist
    pub fn finish(self) -> Registry {
        Registry {
            network: self.network,
            updated_at: None,
            entries: self.entries,
        }
    }
}

/// Collapse duplicate keys, last write wins, keeping first-seen positions.
pub fn dedup_last_wins(entries: &[ContractEntry]) -> Vec<ContractEntry> {
    let mut builder = RegistryBuilder::new(String::new());
    for entry in entries {
        builder.insert(entry.clone());
    }
    builder.entries
}
