//! Entry option merging utilities.

use serde_json::Value;
use std::collections::BTreeMap;

/// Open metadata map attached to a registry entry
pub type ContractOptions = BTreeMap<String, Value>;

/// Merge two option maps, with overrides taking precedence over defaults
///
/// Used to layer plan-wide default options under each contract's own options.
pub fn merge_options(
    defaults: Option<&ContractOptions>,
    overrides: Option<&ContractOptions>,
) -> ContractOptions {
    let mut merged = BTreeMap::new();

    if let Some(defs) = defaults {
        for (k, v) in defs {
            merged.insert(k.clone(), v.clone());
        }
    }

    if let Some(ovrs) = overrides {
        for (k, v) in ovrs {
            merged.insert(k.clone(), v.clone());
        }
    }

    merged
}
