//! Format validation utilities.
//!
//! This module provides the format checks shared by the registry and the
//! plan loader: contract addresses and network identifiers.

use regex::Regex;
use std::sync::OnceLock;

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static address pattern"))
}

fn network_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static network pattern"))
}

/// Check whether a string is a well-formed contract address
///
/// A contract address is `0x` followed by exactly 40 hexadecimal digits.
/// Mixed case is accepted; no checksum is verified.
///
/// # Examples
/// ```
/// use contract_registry::utils::validation::is_valid_address;
///
/// assert!(is_valid_address("0xefc0eeadc1132a12c9487d800112693bf49ecfa2"));
/// assert!(!is_valid_address("0xefc0"));
/// assert!(!is_valid_address("efc0eeadc1132a12c9487d800112693bf49ecfa2"));
/// ```
pub fn is_valid_address(address: &str) -> bool {
    address_pattern().is_match(address)
}

/// Validate a network identifier
///
/// Network names become part of a file name, so they are restricted to
/// ASCII letters, digits, `_` and `-`. This keeps the name-to-path mapping
/// injective and prevents a manifest from escaping its directory.
///
/// # Returns
/// * `Ok(())` if the name is usable
/// * `Err(String)` describing why it is not
///
/// # Examples
/// ```
/// use contract_registry::utils::validation::validate_network_name;
///
/// assert!(validate_network_name("ropsten").is_ok());
/// assert!(validate_network_name("local-dev_2").is_ok());
/// assert!(validate_network_name("").is_err());
/// assert!(validate_network_name("../mainnet").is_err());
/// ```
pub fn validate_network_name(network: &str) -> Result<(), String> {
    if network.is_empty() {
        return Err("network name cannot be empty".to_string());
    }
    if !network_pattern().is_match(network) {
        return Err(format!(
            "network name '{}' may only contain ASCII letters, digits, '_' and '-'",
            network
        ));
    }
    Ok(())
}
