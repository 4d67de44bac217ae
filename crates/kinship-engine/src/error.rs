//! Error types for the genealogy engine.

use kinship::{MemberId, ParentRole};
use thiserror::Error;

/// Infrastructure failure reported by a [`MemberStore`](crate::MemberStore).
///
/// A missing record is not a store error: point lookups return `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not serve the read.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt record for member {id}: {reason}")]
    Corrupt {
        /// Member whose record is unreadable.
        id: MemberId,
        /// Decoder message.
        reason: String,
    },
}

/// Result type for store reads.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors returned by the engine's validators and traversals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenealogyError {
    /// The member named by the call does not exist.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// No member qualifies as a default tree root.
    #[error("no root member: the family has no founder")]
    NoRoot,

    /// Assigning the parent would make the member its own ancestor.
    #[error("circular relationship: member {member} cannot take {parent} as a parent")]
    CircularRelationship {
        /// Member receiving the parent.
        member: MemberId,
        /// Proposed parent.
        parent: MemberId,
    },

    /// A traversal reached the generation bound before it could decide.
    #[error("traversal exceeded the limit of {limit} generations")]
    DepthLimitExceeded {
        /// Configured bound.
        limit: usize,
    },

    /// A member was born on or after one of their marriages.
    #[error("member {member} was born on or after marrying {partner}")]
    BirthAfterMarriage {
        /// Member whose birth date conflicts.
        member: MemberId,
        /// Partner on the conflicting link.
        partner: MemberId,
    },

    /// A parent was born on or after the child.
    #[error("{role} {parent} was born on or after the child")]
    ParentBornAfterChild {
        /// The offending parent.
        parent: MemberId,
        /// The child, when it already exists.
        child: Option<MemberId>,
        /// Slot the parent occupies.
        role: ParentRole,
    },

    /// A child was born before its parents' marriage.
    #[error("child born before the marriage of {father} and {mother}")]
    BirthBeforeParentsMarriage {
        /// Father slot.
        father: MemberId,
        /// Mother slot.
        mother: MemberId,
    },

    /// The members share a father or a mother.
    #[error("members {member} and {other} are siblings")]
    Siblings {
        /// First member.
        member: MemberId,
        /// Second member.
        other: MemberId,
    },

    /// One member is an ancestor of the other.
    #[error("member {ancestor} is an ancestor of {descendant}")]
    AncestorDescendant {
        /// The ancestor.
        ancestor: MemberId,
        /// The descendant.
        descendant: MemberId,
    },

    /// One member is a sibling of the other's parent.
    #[error("member {elder} is a sibling of a parent of {younger}")]
    AuntNiece {
        /// Aunt or uncle.
        elder: MemberId,
        /// Niece or nephew.
        younger: MemberId,
    },

    /// One member is a parent of the other's current or former spouse.
    #[error("member {elder} is a parent-in-law of {younger}")]
    InLaw {
        /// Parent-in-law.
        elder: MemberId,
        /// Child-in-law.
        younger: MemberId,
    },

    /// One member is or was married to a parent of the other.
    #[error("member {elder} is a step-parent of {younger}")]
    StepRelation {
        /// Step-parent.
        elder: MemberId,
        /// Step-child.
        younger: MemberId,
    },

    /// A member already holds an active marriage.
    #[error("member {member} is already married to {partner}")]
    AlreadyMarried {
        /// Member with the active link.
        member: MemberId,
        /// Current partner.
        partner: MemberId,
    },

    /// A member was proposed as their own spouse.
    #[error("member {0} cannot be related to itself")]
    SelfRelation(MemberId),

    /// A divorce date falls on or before the marriage date.
    #[error("divorce of {member_a} and {member_b} is not after their marriage")]
    DivorceBeforeMarriage {
        /// First partner.
        member_a: MemberId,
        /// Second partner.
        member_b: MemberId,
    },

    /// A death date falls before the birth date.
    #[error("member {0} cannot die before being born")]
    DeathBeforeBirth(MemberId),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The store failed to serve a read.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type GenealogyResult<T> = std::result::Result<T, GenealogyError>;

/// Stable, inspectable classification of a [`GenealogyError`].
///
/// The presentation layer maps each kind (via [`ErrorKind::code`]) to a
/// localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Member or root absent.
    NotFound,
    /// Parent assignment would create a cycle.
    CircularRelationship,
    /// Traversal bound reached.
    DepthLimitExceeded,
    /// Birth on or after a marriage.
    BirthAfterMarriage,
    /// Parent born on or after child.
    ParentBornAfterChild,
    /// Child born before parents married.
    BirthBeforeParentsMarriage,
    /// Shared father or mother.
    Siblings,
    /// Direct line.
    AncestorDescendant,
    /// Aunt/uncle and niece/nephew.
    AuntNiece,
    /// Parent-in-law and child-in-law.
    InLaw,
    /// Step-parent and step-child.
    StepRelation,
    /// Active marriage held.
    AlreadyMarried,
    /// Member paired with itself.
    SelfRelation,
    /// Divorce not after marriage.
    DivorceBeforeMarriage,
    /// Death before birth.
    DeathBeforeBirth,
    /// Caller cancelled.
    Cancelled,
    /// Store failure.
    Infrastructure,
}

impl ErrorKind {
    /// Returns the snake_case code used as a message key.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::CircularRelationship => "circular_relationship",
            ErrorKind::DepthLimitExceeded => "depth_limit_exceeded",
            ErrorKind::BirthAfterMarriage => "birth_after_marriage",
            ErrorKind::ParentBornAfterChild => "parent_born_after_child",
            ErrorKind::BirthBeforeParentsMarriage => "birth_before_parents_marriage",
            ErrorKind::Siblings => "siblings",
            ErrorKind::AncestorDescendant => "ancestor_descendant",
            ErrorKind::AuntNiece => "aunt_niece",
            ErrorKind::InLaw => "in_law",
            ErrorKind::StepRelation => "step_relation",
            ErrorKind::AlreadyMarried => "already_married",
            ErrorKind::SelfRelation => "self_relation",
            ErrorKind::DivorceBeforeMarriage => "divorce_before_marriage",
            ErrorKind::DeathBeforeBirth => "death_before_birth",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Infrastructure => "infrastructure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl GenealogyError {
    /// Returns the error's kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenealogyError::MemberNotFound(_) | GenealogyError::NoRoot => ErrorKind::NotFound,
            GenealogyError::CircularRelationship { .. } => ErrorKind::CircularRelationship,
            GenealogyError::DepthLimitExceeded { .. } => ErrorKind::DepthLimitExceeded,
            GenealogyError::BirthAfterMarriage { .. } => ErrorKind::BirthAfterMarriage,
            GenealogyError::ParentBornAfterChild { .. } => ErrorKind::ParentBornAfterChild,
            GenealogyError::BirthBeforeParentsMarriage { .. } => {
                ErrorKind::BirthBeforeParentsMarriage
            }
            GenealogyError::Siblings { .. } => ErrorKind::Siblings,
            GenealogyError::AncestorDescendant { .. } => ErrorKind::AncestorDescendant,
            GenealogyError::AuntNiece { .. } => ErrorKind::AuntNiece,
            GenealogyError::InLaw { .. } => ErrorKind::InLaw,
            GenealogyError::StepRelation { .. } => ErrorKind::StepRelation,
            GenealogyError::AlreadyMarried { .. } => ErrorKind::AlreadyMarried,
            GenealogyError::SelfRelation(_) => ErrorKind::SelfRelation,
            GenealogyError::DivorceBeforeMarriage { .. } => ErrorKind::DivorceBeforeMarriage,
            GenealogyError::DeathBeforeBirth(_) => ErrorKind::DeathBeforeBirth,
            GenealogyError::Cancelled => ErrorKind::Cancelled,
            GenealogyError::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// Returns true for domain rejections.
    ///
    /// Store failures, cancellation and missing primary subjects are not
    /// validation outcomes.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::Cancelled | ErrorKind::Infrastructure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_member_not_found() {
        let err = GenealogyError::MemberNotFound(42);
        assert_eq!(err.to_string(), "member not found: 42");
    }

    #[test]
    fn test_error_display_parent_born_after_child() {
        let err = GenealogyError::ParentBornAfterChild {
            parent: 8,
            child: Some(7),
            role: ParentRole::Father,
        };
        assert_eq!(err.to_string(), "father 8 was born on or after the child");
    }

    #[test]
    fn test_error_display_depth_limit() {
        let err = GenealogyError::DepthLimitExceeded { limit: 100 };
        assert_eq!(err.to_string(), "traversal exceeded the limit of 100 generations");
    }

    #[test]
    fn test_error_from_store_error() {
        let err: GenealogyError = StoreError::Unavailable("connection reset".to_string()).into();
        assert!(matches!(err, GenealogyError::Store(_)));
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert!(!err.is_validation());
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(
            GenealogyError::Siblings { member: 10, other: 11 }.kind().code(),
            "siblings"
        );
        assert_eq!(GenealogyError::NoRoot.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorKind::AlreadyMarried.to_string(), "already_married");
    }

    #[test]
    fn test_validation_classification() {
        assert!(GenealogyError::AlreadyMarried { member: 3, partner: 4 }.is_validation());
        assert!(GenealogyError::DepthLimitExceeded { limit: 5 }.is_validation());
        assert!(!GenealogyError::Cancelled.is_validation());
        assert!(!GenealogyError::MemberNotFound(1).is_validation());
    }
}
