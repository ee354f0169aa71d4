//! Registry data structures and errors.
//!
//! This module defines the values written to and read from a network
//! manifest: contract addresses, entries, the registry itself, and the
//! instance descriptors handed over by a deployer.

use crate::utils::options::ContractOptions;
use crate::utils::validation::is_valid_address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Errors produced by the registry manager
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Contract instance for '{key}' has no usable address: {reason}")]
    InvalidInstance { key: String, reason: String },

    #[error("Invalid registry entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("No contract registered under key '{key}'")]
    NotFound { key: String },

    #[error("Manifest I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest {path} is not a valid registry: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An on-chain contract address: `0x` followed by 40 hex digits.
///
/// The original spelling is kept, so a checksummed address reads back
/// exactly as it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractAddress(String);

impl ContractAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContractAddress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_address(&value) {
            Ok(ContractAddress(value))
        } else {
            Err(format!("'{}' is not a contract address", value))
        }
    }
}

impl TryFrom<&str> for ContractAddress {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ContractAddress::try_from(value.to_string())
    }
}

impl From<ContractAddress> for String {
    fn from(address: ContractAddress) -> Self {
        address.0
    }
}

impl AsRef<str> for ContractAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One deployed contract's registry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEntry {
    /// Lookup key, unique within a written registry
    pub key: String,
    /// Human-readable contract name (may repeat across keys)
    pub name: String,
    pub address: ContractAddress,
    /// Entry-specific metadata
    #[serde(default, skip_serializing_if = "ContractOptions::is_empty")]
    pub options: ContractOptions,
}

/// The complete manifest for one network.
///
/// Written to `<manifest_dir>/smart_contracts_<network>.json` and always
/// replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub network: String,
    /// Time of the write that produced this manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Entries in deployment order
    #[serde(default)]
    pub entries: Vec<ContractEntry>,
}

impl Registry {
    /// An empty registry for `network`
    pub fn empty(network: impl Into<String>) -> Self {
        Registry {
            network: network.into(),
            updated_at: None,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&ContractEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Anything a deployer returns that can report where a contract lives.
///
/// The registry only needs the address; other fields of the descriptor
/// are ignored.
pub trait ContractHandle {
    fn address(&self) -> Option<&str>;
}

/// Instance descriptor returned by a [`crate::orchestrator::Deployer`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl ContractInstance {
    pub fn at(address: impl Into<String>) -> Self {
        ContractInstance {
            address: Some(address.into()),
            transaction_hash: None,
        }
    }
}

impl ContractHandle for ContractInstance {
    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// Loosely typed descriptors, e.g. a framework artifact parsed from JSON.
/// Only a top-level string `address` field is recognised.
impl ContractHandle for serde_json::Value {
    fn address(&self) -> Option<&str> {
        self.get("address").and_then(|a| a.as_str())
    }
}
