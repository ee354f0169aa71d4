//! Shared utilities: format validation and option merging.

pub mod options;
pub mod validation;

pub use options::{merge_options, ContractOptions};
pub use validation::{is_valid_address, validate_network_name};
