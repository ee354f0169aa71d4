//! Manifest persistence: path resolution, atomic writes, reads and lookups.

use super::builder::dedup_last_wins;
use super::types::{ContractAddress, ContractEntry, Registry, RegistryError};
use crate::utils::validation::validate_network_name;
use chrono::Utc;
use log::{debug, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MANIFEST_PREFIX: &str = "smart_contracts_";
const MANIFEST_EXTENSION: &str = "json";

/// Resolve the manifest path for `network` inside `manifest_dir`.
///
/// Pure: no filesystem access. Every valid network name maps to its own
/// file, `<manifest_dir>/smart_contracts_<network>.json`.
pub fn contract_path_by_network(manifest_dir: &Path, network: &str) -> Result<PathBuf, RegistryError> {
    validate_network_name(network).map_err(RegistryError::InvalidNetwork)?;
    Ok(manifest_dir.join(format!("{}{}.{}", MANIFEST_PREFIX, network, MANIFEST_EXTENSION)))
}

/// Recover the network name from a manifest path, if it follows the naming scheme
pub fn network_from_path(path: &Path) -> Option<String> {
    if path.extension()? != MANIFEST_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let network = stem.strip_prefix(MANIFEST_PREFIX)?;
    validate_network_name(network).ok()?;
    Some(network.to_string())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> RegistryError + '_ {
    move |source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Permissions for a new manifest: those of the file being replaced, or
/// 0644 when there is none.
fn manifest_permissions(path: &Path) -> std::io::Result<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Flush the directory entry so the rename survives a power loss
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Replace the manifest at `path` with `registry`.
///
/// The document is written to a temporary file in the destination
/// directory, synced, then renamed over `path`, so readers see either the
/// old manifest or the new one. Duplicate keys are collapsed (last write
/// wins) and `updated_at` is stamped. `environment` only appears in logs.
///
/// Returns the registry exactly as written.
pub fn write_registry(path: &Path, registry: &Registry, environment: &str) -> Result<Registry, RegistryError> {
    validate_network_name(&registry.network).map_err(RegistryError::InvalidNetwork)?;

    let written = Registry {
        network: registry.network.clone(),
        updated_at: Some(Utc::now()),
        entries: dedup_last_wins(&registry.entries),
    };
    if written.entries.len() != registry.entries.len() {
        warn!(
            "Dropped {} duplicate registry key(s) before writing {}",
            registry.entries.len() - written.entries.len(),
            path.display()
        );
    }

    let json = serde_json::to_string_pretty(&written).map_err(|source| RegistryError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error(path))?;
    // Temp files are created 0600; keep the manifest readable by others
    if let Some(permissions) = manifest_permissions(path).map_err(io_error(path))? {
        tmp.as_file().set_permissions(permissions).map_err(io_error(path))?;
    }
    tmp.write_all(json.as_bytes()).map_err(io_error(path))?;
    tmp.write_all(b"\n").map_err(io_error(path))?;
    tmp.as_file().sync_all().map_err(io_error(path))?;
    tmp.persist(path).map_err(|e| RegistryError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    sync_dir(dir).map_err(io_error(path))?;

    info!(
        "Wrote {} contract(s) for network '{}' ({}) to {}",
        written.entries.len(),
        written.network,
        environment,
        path.display()
    );
    Ok(written)
}

/// Read the manifest at `path`.
///
/// A missing file yields an empty registry whose network is taken from
/// the file name. When the name does not follow the
/// `smart_contracts_<network>.json` scheme the network is left empty, and
/// such a registry cannot be written back until a network is set; use
/// [`read_network_registry`] to have it filled in. Any other I/O failure
/// or malformed content is an error.
pub fn read_registry(path: &Path) -> Result<Registry, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No manifest at {}, starting empty", path.display());
            return Ok(Registry::empty(network_from_path(path).unwrap_or_default()));
        }
        Err(e) => return Err(io_error(path)(e)),
    };

    serde_json::from_str(&content).map_err(|source| RegistryError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the manifest of `network` from `manifest_dir`
pub fn read_network_registry(manifest_dir: &Path, network: &str) -> Result<Registry, RegistryError> {
    let path = contract_path_by_network(manifest_dir, network)?;
    let mut registry = read_registry(&path)?;
    if registry.network.is_empty() {
        registry.network = network.to_string();
    } else if registry.network != network {
        warn!(
            "Manifest {} declares network '{}', expected '{}'",
            path.display(),
            registry.network,
            network
        );
    }
    Ok(registry)
}

/// Write `registry` to its network's manifest in `manifest_dir`
pub fn write_network_registry(
    manifest_dir: &Path,
    registry: &Registry,
    environment: &str,
) -> Result<Registry, RegistryError> {
    let path = contract_path_by_network(manifest_dir, &registry.network)?;
    write_registry(&path, registry, environment)
}

/// Look up the address recorded under `key`.
///
/// Absence is reported as [`RegistryError::NotFound`]; advisory callers
/// can use [`find_contract_address`] instead.
pub fn resolve_contract_address<'a>(
    entries: &'a [ContractEntry],
    key: &str,
) -> Result<&'a ContractAddress, RegistryError> {
    find_contract_address(entries, key).ok_or_else(|| RegistryError::NotFound { key: key.to_string() })
}

/// Like [`resolve_contract_address`], but absence is `None`.
///
/// When a key appears more than once the last entry wins, matching how
/// duplicates are collapsed on write.
pub fn find_contract_address<'a>(entries: &'a [ContractEntry], key: &str) -> Option<&'a ContractAddress> {
    entries.iter().rev().find(|e| e.key == key).map(|e| &e.address)
}
