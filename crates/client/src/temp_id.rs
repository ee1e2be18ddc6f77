//! Placeholder ids for rows that exist only in the optimistic cache.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use gangbook_domain::DomainError;

const PREFIX: &str = "temp-";

/// Id of a speculatively created row until the server returns the real one.
///
/// The inner UUID is what the typed domain id wraps while the row is
/// pending; the `temp-` form is what gets logged and shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempId(Uuid);

impl TempId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub(crate) fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TempId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl FromStr for TempId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| DomainError::parse(format!("Not a temporary id: {s}")))?;
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| DomainError::parse(format!("Invalid temporary id {s}: {e}")))
    }
}
