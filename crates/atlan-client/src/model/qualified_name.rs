//! Qualified-name construction and hierarchy validation.
//!
//! A qualified name is the parent's qualified name plus `/` plus the local
//! name. Connections sit at the root as `default/<connector>/<epoch>`.

use super::enums::AtlanConnectorType;
use crate::traits::{AtlanError, AtlanResult};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Number of segments in a connection qualified name.
pub const CONNECTION_DEPTH: usize = 3;

const TENANT: &str = "default";

pub fn child(parent: &str, name: &str) -> String {
    format!("{}/{}", parent, name)
}

/// Everything before the last `/`, or `None` for a single segment.
pub fn parent_of(qualified_name: &str) -> Option<&str> {
    qualified_name.rsplit_once('/').map(|(parent, _)| parent)
}

/// The connection prefix of any asset qualified name.
pub fn connection_of(qualified_name: &str) -> Option<&str> {
    let mut end = 0;
    for (i, segment) in qualified_name.split('/').enumerate() {
        if segment.is_empty() {
            return None;
        }
        end += segment.len();
        if i + 1 == CONNECTION_DEPTH {
            return Some(&qualified_name[..end]);
        }
        end += 1;
    }
    None
}

pub fn connector_of(qualified_name: &str) -> Option<AtlanConnectorType> {
    AtlanConnectorType::from_qualified_name(qualified_name)
}

pub fn connection_qualified_name(connector: AtlanConnectorType, created: DateTime<Utc>) -> String {
    format!("{}/{}/{}", TENANT, connector.value(), created.timestamp())
}

pub fn depth(qualified_name: &str) -> usize {
    if qualified_name.is_empty() {
        0
    } else {
        qualified_name.split('/').count()
    }
}

/// Checks that `qualified_name` has exactly `segments` non-empty segments.
///
/// `what` names the expected parent, e.g. "schema", and is used in the error.
pub fn require_depth(qualified_name: &str, segments: usize, what: &str) -> AtlanResult<()> {
    let parts: Vec<&str> = qualified_name.split('/').collect();
    if parts.len() != segments || parts.iter().any(|p| p.is_empty()) {
        return Err(AtlanError::InvalidRequest(format!(
            "Invalid {} qualifiedName {}: expected {} segments, found {}",
            what,
            qualified_name,
            segments,
            depth(qualified_name)
        )));
    }
    if connector_of(qualified_name).is_none() {
        return Err(AtlanError::InvalidRequest(format!(
            "Invalid {} qualifiedName {}: unknown connector",
            what, qualified_name
        )));
    }
    Ok(())
}

/// Fails with the names of every empty parameter.
pub fn validate_required(type_name: &str, params: &[(&str, &str)]) -> AtlanResult<()> {
    let missing: Vec<&str> = params
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AtlanError::missing_parameters(type_name, &missing))
    }
}

/// Qualified name of a lineage process.
///
/// With an `id` from the source system the name is `connection/id`. Without
/// one it is `connection/` plus a SHA-256 hex digest over the name,
/// connection, parent and every input and output qualified name, in order.
pub fn process_qualified_name(
    name: &str,
    connection_qualified_name: &str,
    id: Option<&str>,
    inputs: &[&str],
    outputs: &[&str],
    parent: Option<&str>,
) -> String {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        return child(connection_qualified_name, id);
    }

    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(connection_qualified_name.as_bytes());
    if let Some(parent) = parent {
        hasher.update(parent.as_bytes());
    }
    for qn in inputs.iter().chain(outputs.iter()) {
        hasher.update(qn.as_bytes());
    }
    child(connection_qualified_name, &hex::encode(hasher.finalize()))
}
