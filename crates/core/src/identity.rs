//! Captain and anonymous-participant identity.
//!
//! A team slot is claimed either by a stable user id (authenticated) or by
//! a claimed display name (anonymous) — never both. Every slot-ownership
//! check pattern-matches on [`CaptainIdentity`] instead of poking at two
//! nullable fields.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length accepted for a claimed captain display name.
pub const MAX_CAPTAIN_NAME_LENGTH: usize = 40;

// ---------------------------------------------------------------------------
// CaptainIdentity
// ---------------------------------------------------------------------------

/// The identity holding (or claiming) a team slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptainIdentity {
    ByUserId { user_id: DbId },
    ByDisplayName { name: String },
}

impl CaptainIdentity {
    /// Build an identity from the two request fields. A user id wins when
    /// present; otherwise a non-empty display name is required.
    pub fn from_parts(
        user_id: Option<DbId>,
        display_name: Option<&str>,
    ) -> Result<CaptainIdentity, CoreError> {
        match (user_id, display_name) {
            (Some(id), _) => Ok(CaptainIdentity::ByUserId { user_id: id }),
            (None, Some(name)) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(CoreError::Validation(
                        "Display name must not be empty".to_string(),
                    ));
                }
                if trimmed.len() > MAX_CAPTAIN_NAME_LENGTH {
                    return Err(CoreError::Validation(format!(
                        "Display name must not exceed {MAX_CAPTAIN_NAME_LENGTH} characters"
                    )));
                }
                Ok(CaptainIdentity::ByDisplayName {
                    name: trimmed.to_string(),
                })
            }
            (None, None) => Err(CoreError::Validation(
                "Either a user id or a display name is required".to_string(),
            )),
        }
    }

    /// Rebuild an identity from the two nullable slot columns, if the slot
    /// is occupied.
    pub fn from_columns(user_id: Option<DbId>, name: Option<&str>) -> Option<CaptainIdentity> {
        match (user_id, name) {
            (Some(id), _) => Some(CaptainIdentity::ByUserId { user_id: id }),
            (None, Some(n)) => Some(CaptainIdentity::ByDisplayName {
                name: n.to_string(),
            }),
            (None, None) => None,
        }
    }

    /// The (user_id, display_name) column pair this identity stores as.
    pub fn as_columns(&self) -> (Option<DbId>, Option<&str>) {
        match self {
            CaptainIdentity::ByUserId { user_id } => (Some(*user_id), None),
            CaptainIdentity::ByDisplayName { name } => (None, Some(name)),
        }
    }

    /// The name to show for this captain, if it carries one.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            CaptainIdentity::ByUserId { .. } => None,
            CaptainIdentity::ByDisplayName { name } => Some(name),
        }
    }
}

// ---------------------------------------------------------------------------
// AnonymousIdentity
// ---------------------------------------------------------------------------

/// The record an anonymous participant persists locally to reconnect.
///
/// Minted on first join, presented on re-join, cleared by the client on
/// leave. The server treats the client-side store as best-effort: an
/// unknown or stale `participant_id` degrades to minting a fresh identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousIdentity {
    pub session_id: DbId,
    pub participant_id: DbId,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn user_id_wins_over_display_name() {
        let id = CaptainIdentity::from_parts(Some(7), Some("smurf")).unwrap();
        assert_matches!(id, CaptainIdentity::ByUserId { user_id: 7 });
    }

    #[test]
    fn display_name_is_trimmed() {
        let id = CaptainIdentity::from_parts(None, Some("  cptn  ")).unwrap();
        assert_eq!(id.display_name(), Some("cptn"));
    }

    #[test]
    fn rejects_empty_identity() {
        assert!(CaptainIdentity::from_parts(None, None).is_err());
        assert!(CaptainIdentity::from_parts(None, Some("   ")).is_err());
    }

    #[test]
    fn rejects_oversized_name() {
        let long = "x".repeat(MAX_CAPTAIN_NAME_LENGTH + 1);
        assert!(CaptainIdentity::from_parts(None, Some(&long)).is_err());
    }

    #[test]
    fn column_round_trip() {
        let id = CaptainIdentity::from_parts(None, Some("cptn")).unwrap();
        let (user_id, name) = id.as_columns();
        assert_eq!(CaptainIdentity::from_columns(user_id, name), Some(id));

        assert_eq!(CaptainIdentity::from_columns(None, None), None);
    }

    #[test]
    fn identities_with_same_scheme_compare_by_value() {
        let a = CaptainIdentity::from_parts(Some(1), None).unwrap();
        let b = CaptainIdentity::from_parts(Some(1), Some("ignored")).unwrap();
        let c = CaptainIdentity::from_parts(Some(2), None).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
