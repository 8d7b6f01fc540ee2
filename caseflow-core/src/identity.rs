//! Identity types for Caseflow records

use crate::{CaseKind, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Identifier attached to every workflow command.
/// UUIDv7 keeps command ids sortable by submission time.
pub type CommandId = Uuid;

/// Identifier of a single audit entry.
pub type AuditEntryId = Uuid;

/// Generate a new UUIDv7 command id.
pub fn new_command_id() -> CommandId {
    Uuid::now_v7()
}

// ============================================================================
// CASE ID
// ============================================================================

/// Case identifier of the form `<PREFIX>-<YEAR>-<SEQ>`, e.g. `CMP-2025-0001`.
///
/// The prefix determines the case kind, so an id can never be reused across
/// kinds. Ids are immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = String, example = "CMP-2025-0001"))]
#[serde(try_from = "String", into = "String")]
pub struct CaseId(String);

impl CaseId {
    /// Build an id from its parts, zero-padding the sequence to `width` digits.
    pub fn new(kind: CaseKind, year: i32, sequence: u32, width: usize) -> Self {
        CaseId(format!(
            "{}-{:04}-{:0width$}",
            kind.prefix(),
            year,
            sequence,
            width = width
        ))
    }

    /// Parse and validate an id string.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| ValidationError::InvalidValue {
            field: "case_id".to_string(),
            reason: format!("'{}' {}", trimmed, reason),
        };

        let mut parts = trimmed.splitn(3, '-');
        let prefix = parts.next().unwrap_or_default();
        let year = parts.next().ok_or_else(|| invalid("is missing a year"))?;
        let sequence = parts.next().ok_or_else(|| invalid("is missing a sequence"))?;

        CaseKind::from_prefix(prefix).ok_or_else(|| invalid("has an unknown prefix"))?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must carry a four digit year"));
        }
        if sequence.is_empty() || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must end in a numeric sequence"));
        }

        Ok(CaseId(trimmed.to_string()))
    }

    /// Kind encoded in the id prefix.
    pub fn kind(&self) -> CaseKind {
        self.0
            .split('-')
            .next()
            .and_then(CaseKind::from_prefix)
            .unwrap_or(CaseKind::Complaint)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CaseId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CaseId {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<CaseId> for String {
    fn from(id: CaseId) -> String {
        id.0
    }
}

// ============================================================================
// ACTOR ID
// ============================================================================

/// Reference to a person or service acting on a case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = String, example = "qa.lead"))]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "actor".to_string(),
            });
        }
        Ok(ActorId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ActorId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ActorId {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ActorId> for String {
    fn from(id: ActorId) -> String {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_id_format() {
        let id = CaseId::new(CaseKind::Complaint, 2025, 1, 4);
        assert_eq!(id.as_str(), "CMP-2025-0001");
        assert_eq!(id.kind(), CaseKind::Complaint);

        let id = CaseId::new(CaseKind::Capa, 2025, 12345, 4);
        assert_eq!(id.as_str(), "CAPA-2025-12345");
        assert_eq!(id.kind(), CaseKind::Capa);
    }

    #[test]
    fn test_case_id_parse_rejects_garbage() {
        assert!(CaseId::parse("CMP-2025-0001").is_ok());
        assert!(CaseId::parse(" INC-2024-0042 ").is_ok());
        assert!(CaseId::parse("").is_err());
        assert!(CaseId::parse("XYZ-2025-0001").is_err());
        assert!(CaseId::parse("CMP-25-0001").is_err());
        assert!(CaseId::parse("CMP-2025-").is_err());
        assert!(CaseId::parse("CMP-2025-00a1").is_err());
        assert!(CaseId::parse("CMP").is_err());
    }

    #[test]
    fn test_case_id_serde_validates() {
        let ok: Result<CaseId, _> = serde_json::from_str("\"RSK-2026-0007\"");
        assert_eq!(ok.map(|id| id.kind()).ok(), Some(CaseKind::Risk));

        let bad: Result<CaseId, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_actor_id_rejects_blank() {
        assert!(ActorId::new("   ").is_err());
        assert_eq!(ActorId::new(" alice ").map(String::from).ok(), Some("alice".to_string()));
    }

    #[test]
    fn test_command_ids_are_v7() {
        assert_eq!(new_command_id().get_version_num(), 7);
    }
}
