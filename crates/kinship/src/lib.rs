//! # kinship
//!
//! Data model for family genealogy graphs.
//!
//! A family is a directed graph of [`Member`]s joined by two kinds of edge:
//!
//! - **Parent edges** - the `father_id` and `mother_id` slots on each member
//! - **Spouse edges** - undirected [`SpousalLink`] records, active until a
//!   divorce date is set
//!
//! The graph algorithms that answer questions about this model (ancestry,
//! marriage eligibility, tree rendering) live in `kinship-engine`.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use kinship::{Gender, Member, SpousalLink};
//!
//! let father = Member::new(1, Gender::Male).with_name("en", "Omar");
//! let mother = Member::new(2, Gender::Female).with_name("en", "Huda");
//! let child = Member::new(3, Gender::Female)
//!     .with_parents(father.id, mother.id)
//!     .with_birth(NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
//!
//! let marriage = SpousalLink::new(father.id, mother.id)
//!     .married_on(NaiveDate::from_ymd_opt(1985, 6, 1).unwrap());
//!
//! assert!(father.is_parent_of(&child));
//! assert!(marriage.is_active());
//! assert_eq!(marriage.partner_of(2), Some(1));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Derives `Serialize`/`Deserialize` for every model type

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod link;
mod member;

pub use error::{KinshipError, KinshipResult};
pub use link::{LinkId, SpousalLink};
pub use member::{Gender, Member, ParentRole};

/// Member identifier.
///
/// Assigned monotonically by the write path, so a lower id is an
/// earlier-created member.
pub type MemberId = u64;
