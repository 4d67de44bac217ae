//! # kinship-engine
//!
//! Graph engine for a multi-generational family tree.
//!
//! This crate answers reachability questions over the parent graph and
//! enforces the structural invariants a family tree must keep: no member is
//! their own ancestor, births follow parents and precede marriages, and
//! marriages respect blood, in-law and step prohibitions. It also renders
//! rooted trees and finds how two members are related.
//!
//! ## Key Features
//!
//! - **Storage agnostic** - implement [`MemberStore`] over any database
//! - **Bounded traversals** - every walk stops at [`MAX_GENERATIONS`]
//!   (configurable) with a distinct `DepthLimitExceeded` outcome
//! - **Stable error kinds** - every rejection maps to an [`ErrorKind`] code
//! - **Cooperative cancellation** - long walks observe a
//!   `tokio_util::sync::CancellationToken`
//!
//! ## Quick Start
//!
//! ```ignore
//! use kinship_engine::{ErrorKind, GenealogyEngine};
//! use kinship_store::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! // ... insert members and spousal links ...
//!
//! let engine = GenealogyEngine::new(&store);
//!
//! match engine.validate_marriage(10, 11) {
//!     Ok(()) => println!("eligible"),
//!     Err(e) if e.kind() == ErrorKind::Siblings => println!("siblings"),
//!     Err(e) => return Err(e.into()),
//! }
//!
//! if let Some(view) = engine.find_relation(4, 5)?.view() {
//!     println!("{} via {:?}", view.kinship, view.path);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       kinship-engine                         │
//! │                                                              │
//! │  GenealogyEngine                                             │
//! │  ├── AncestryOracle        - BFS over father/mother edges    │
//! │  ├── ParentAssignmentGuard - cycle-safe parent changes       │
//! │  ├── BirthDateChecker      - strict date ordering            │
//! │  ├── MarriageEligibility   - ordered prohibition rules       │
//! │  ├── TreeBuilder           - rooted, levelled rendering      │
//! │  └── RelationFinder        - nearest common ancestor + path  │
//! │                                                              │
//! │  Dependencies:                                               │
//! │  ├── kinship       - Member, SpousalLink, MemberId           │
//! │  └── MemberStore   - implemented by the caller               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - `Serialize` for rendered trees and relations

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ancestry;
mod birth;
mod config;
mod engine;
mod error;
mod marriage;
mod parents;
mod relation;
mod traits;
mod tree;

#[cfg(test)]
mod test_utils;

// Public re-exports
pub use ancestry::{AncestorEntry, AncestorWalk, AncestryOracle, Reachability};
pub use birth::BirthDateChecker;
pub use config::{EngineConfig, EngineConfigBuilder, MAX_GENERATIONS};
pub use engine::GenealogyEngine;
pub use error::{ErrorKind, GenealogyError, GenealogyResult, StoreError, StoreResult};
pub use marriage::MarriageEligibility;
pub use parents::ParentAssignmentGuard;
pub use relation::{Kinship, Relation, RelationFinder, RelationView};
pub use traits::MemberStore;
pub use tree::{SiblingNode, SpouseNode, TreeBuilder, TreeNode};

// Re-export the model for convenience
pub use kinship::{Gender, Member, MemberId, ParentRole, SpousalLink};
