//! # Contract Registry Module
//!
//! This module maps the contracts published during one deployment run to a
//! persisted, network-scoped manifest. A manifest lists every contract of a
//! network by key, with its name, address and optional metadata.
//!
//! ## Key Components
//!
//! - `types.rs`: manifest data structures, instance descriptors and errors
//! - `builder.rs`: per-run accumulation (`RegistryBuilder`) and entry encoding
//! - `store.rs`: path resolution, atomic writes, reads and address lookups
//!
//! ## Run Lifecycle
//!
//! 1. **Start**: `RegistryBuilder::new(network)` with an empty entry list
//! 2. **Assign**: one `assign` per deployed contract, in deployment order
//! 3. **Finish**: `finish()` yields the complete `Registry`
//! 4. **Persist**: `write_registry` replaces the network's manifest once
//!
//! Manifests are never merged with what is on disk. A previous manifest is
//! only read for lookups and is otherwise superseded.
//!
//! ## File Locations
//!
//! ```text
//! <manifest_dir>/
//! |-- smart_contracts_mainnet.json
//! \-- smart_contracts_ropsten.json
//! ```
//!
//! ## Example Manifest
//!
//! ```json
//! {
//!   "network": "ropsten",
//!   "updated_at": "2021-03-02T10:15:00Z",
//!   "entries": [
//!     {
//!       "key": "optionchef",
//!       "name": "OptionChef",
//!       "address": "0x5c2a8b3e0bb87da8c84e2b3eb8d0f7c36e5d7a11"
//!     },
//!     {
//!       "key": "hegexoption",
//!       "name": "Hegexoption",
//!       "address": "0x9f3e2b1c4d5a6e7f8091a2b3c4d5e6f708192a3b",
//!       "options": { "metadata_base": "https://stacksideflow.github.io/hegexoption-nft/meta/" }
//!     }
//!   ]
//! }
//! ```
//!
//! ## Duplicate Keys
//!
//! Keys are treated as a map: a later assignment of the same key replaces
//! the earlier entry in its original position.

pub mod builder;
pub mod store;
pub mod types;

pub use builder::{encode_contract_entry, is_reserved_key, RegistryBuilder, MIGRATIONS_KEY};
pub use store::{
    contract_path_by_network, find_contract_address, read_network_registry, read_registry,
    resolve_contract_address, write_network_registry, write_registry,
};
pub use types::{ContractAddress, ContractEntry, ContractHandle, ContractInstance, Registry, RegistryError};
