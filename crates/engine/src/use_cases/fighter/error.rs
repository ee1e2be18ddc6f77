//! Fighter mutation errors.

use gangbook_domain::{DomainError, FighterId, GangId};
use gangbook_shared::ErrorKind;

use crate::infrastructure::ports::RepoError;

/// Errors that can occur during fighter mutations.
#[derive(Debug, thiserror::Error)]
pub enum FighterError {
    #[error("Fighter not found: {0}")]
    FighterNotFound(FighterId),
    #[error("Gang not found: {0}")]
    GangNotFound(GangId),
    #[error("Equipment not found: {0}")]
    EquipmentNotFound(String),
    #[error("Advancement not found: {0}")]
    AdvancementNotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Not enough meat: need {required}, have {available}")]
    InsufficientMeat { required: i64, available: i64 },
    #[error("Not enough credits: need {required}, have {available}")]
    InsufficientCredits { required: i64, available: i64 },
    #[error("Not enough XP: need {required}, have {available}")]
    InsufficientXp { required: i64, available: i64 },
    #[error("{0}")]
    InvalidTransition(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl FighterError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classification sent to the client with a `{success: false}` result.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FighterNotFound(_)
            | Self::GangNotFound(_)
            | Self::EquipmentNotFound(_)
            | Self::AdvancementNotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::InsufficientMeat { .. }
            | Self::InsufficientCredits { .. }
            | Self::InsufficientXp { .. }
            | Self::InvalidTransition(_) => ErrorKind::PreconditionFailed,
            Self::Repo(RepoError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Repo(_) => ErrorKind::Store,
        }
    }
}

impl From<DomainError> for FighterError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InsufficientResource {
                resource,
                required,
                available,
            } => match resource {
                "meat" => Self::InsufficientMeat {
                    required,
                    available,
                },
                "credits" => Self::InsufficientCredits {
                    required,
                    available,
                },
                "xp" => Self::InsufficientXp {
                    required,
                    available,
                },
                other => Self::Validation(format!(
                    "Not enough {other}: need {required}, have {available}"
                )),
            },
            DomainError::InvalidStateTransition(msg) => Self::InvalidTransition(msg),
            DomainError::Validation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::Parse(msg) => Self::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_shortfalls_map_to_preconditions() {
        let err = FighterError::from(DomainError::insufficient("meat", 1, 0));
        assert!(matches!(err, FighterError::InsufficientMeat { required: 1, available: 0 }));
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(err.to_string(), "Not enough meat: need 1, have 0");
    }

    #[test]
    fn domain_validation_keeps_message() {
        let err = FighterError::from(DomainError::validation("sell_value cannot be negative"));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "sell_value cannot be negative");
    }

    #[test]
    fn store_errors_classified() {
        let err = FighterError::from(RepoError::database("save_fighter", "locked"));
        assert_eq!(err.kind(), ErrorKind::Store);
        let err = FighterError::from(RepoError::not_found("Gang", "x"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
