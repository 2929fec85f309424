//! Monitored network targets and owner-initiated target management.

use std::net::{IpAddr, SocketAddr};

use serde::Serialize;

use crate::error::{CoreError, StoreError};
use crate::state::MonitorState;
use crate::store::TargetStore;
use crate::types::{DbId, Timestamp};

/// A `host:port` endpoint watched on behalf of an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorTarget {
    pub id: DbId,
    pub owner_id: DbId,
    /// Canonical `ip:port` form (IPv6 hosts are bracketed).
    pub address: String,
    pub last_state: MonitorState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validate a target address and return its canonical socket address.
///
/// The host must be an IP literal (no DNS names) and the port must be in
/// `1..=65535`. IPv6 hosts use the bracketed form, e.g. `[::1]:22`.
pub fn parse_target_address(raw: &str) -> Result<SocketAddr, CoreError> {
    let raw = raw.trim();
    let (host, port) = raw
        .rsplit_once(':')
        .ok_or_else(|| CoreError::Validation(format!("'{raw}' is not in ip:port form")))?;

    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    let ip: IpAddr = host
        .parse()
        .map_err(|_| CoreError::Validation(format!("'{host}' is not a valid IP address")))?;

    let port: u16 = port
        .parse()
        .map_err(|_| CoreError::Validation(format!("'{port}' is not a valid port")))?;
    if port == 0 {
        return Err(CoreError::Validation(
            "port must be between 1 and 65535".to_string(),
        ));
    }

    // An unbracketed IPv6 literal would have been split on its last colon.
    if ip.is_ipv6() && !raw.starts_with('[') {
        return Err(CoreError::Validation(format!(
            "IPv6 address '{raw}' must be written as [addr]:port"
        )));
    }

    Ok(SocketAddr::new(ip, port))
}

/// Add a target for `owner_id`.
///
/// Fails with [`CoreError::Validation`] on a malformed address and with
/// [`CoreError::Conflict`] when the owner already watches the same address.
pub async fn add_target(
    store: &dyn TargetStore,
    owner_id: DbId,
    address: &str,
) -> Result<MonitorTarget, CoreError> {
    let canonical = parse_target_address(address)?.to_string();
    match store.insert_target(owner_id, &canonical).await {
        Ok(target) => Ok(target),
        Err(StoreError::Duplicate(_)) => Err(CoreError::Conflict(format!(
            "target {canonical} is already monitored"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Delete the target `address` owned by `owner_id`.
///
/// Fails with [`CoreError::NotFound`] when no such row is owned by the caller.
pub async fn remove_target(
    store: &dyn TargetStore,
    owner_id: DbId,
    address: &str,
) -> Result<(), CoreError> {
    let canonical = parse_target_address(address)?.to_string();
    if store.delete_target(owner_id, &canonical).await? {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "target",
            id: canonical,
        })
    }
}
