//! The store contract the engine reads through.
//!
//! This module defines the [`MemberStore`] trait that any persistence layer
//! must implement for the engine to traverse its family graph.
//!
//! # Architecture Note
//!
//! This crate intentionally does NOT depend on `kinship-store`. The trait is
//! defined here; `kinship-store` provides an in-memory implementation and a
//! caching decorator, and applications implement it over their own database.
//!
//! # Example: Implementing MemberStore
//!
//! ```ignore
//! use kinship::{Member, MemberId, SpousalLink};
//! use kinship_engine::{MemberStore, StoreError, StoreResult};
//!
//! impl MemberStore for PgRepository {
//!     fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
//!         self.find_member(id).map_err(|e| StoreError::Unavailable(e.to_string()))
//!     }
//!
//!     fn list_children(&self, parent_id: MemberId) -> StoreResult<Vec<Member>> {
//!         self.children_of(parent_id).map_err(|e| StoreError::Unavailable(e.to_string()))
//!     }
//!
//!     fn list_spousal_links(&self, member_id: MemberId) -> StoreResult<Vec<SpousalLink>> {
//!         self.spouses_of(member_id).map_err(|e| StoreError::Unavailable(e.to_string()))
//!     }
//!
//!     fn list_founders(&self) -> StoreResult<Vec<Member>> {
//!         self.parentless().map_err(|e| StoreError::Unavailable(e.to_string()))
//!     }
//! }
//! ```

use std::sync::Arc;

use kinship::{Member, MemberId, SpousalLink};

use crate::error::StoreResult;

/// Read accessor over a family graph.
///
/// The engine never writes through this trait. Implementations should serve
/// consistent point-in-time reads for the duration of a call; the engine does
/// no locking of its own.
///
/// # Required Methods
///
/// - [`get_member`](Self::get_member) - Point lookup
/// - [`list_children`](Self::list_children) - Members whose father or mother slot holds the id
/// - [`list_spousal_links`](Self::list_spousal_links) - Every link, active or closed, on a member
/// - [`list_founders`](Self::list_founders) - Members with neither parent slot filled
///
/// [`get_spousal_link`](Self::get_spousal_link) has a default built on
/// `list_spousal_links`; override it when the store can look up a pair
/// directly.
pub trait MemberStore: Send + Sync {
    /// Gets a member by id.
    ///
    /// Returns `Ok(None)` if no such member exists. Soft-deleted members are
    /// still returned.
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>>;

    /// Lists the children of a member, in the store's display order.
    ///
    /// Returns an empty Vec if the member has no children or doesn't exist.
    fn list_children(&self, parent_id: MemberId) -> StoreResult<Vec<Member>>;

    /// Lists every spousal link held by a member.
    fn list_spousal_links(&self, member_id: MemberId) -> StoreResult<Vec<SpousalLink>>;

    /// Gets the link between a specific pair, in either order.
    fn get_spousal_link(&self, a: MemberId, b: MemberId) -> StoreResult<Option<SpousalLink>> {
        Ok(self
            .list_spousal_links(a)?
            .into_iter()
            .find(|link| link.connects(a, b)))
    }

    /// Lists members with no father and no mother on record.
    ///
    /// Used to choose a default tree root.
    fn list_founders(&self) -> StoreResult<Vec<Member>>;
}

impl<S: MemberStore + ?Sized> MemberStore for &S {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        (**self).get_member(id)
    }

    fn list_children(&self, parent_id: MemberId) -> StoreResult<Vec<Member>> {
        (**self).list_children(parent_id)
    }

    fn list_spousal_links(&self, member_id: MemberId) -> StoreResult<Vec<SpousalLink>> {
        (**self).list_spousal_links(member_id)
    }

    fn get_spousal_link(&self, a: MemberId, b: MemberId) -> StoreResult<Option<SpousalLink>> {
        (**self).get_spousal_link(a, b)
    }

    fn list_founders(&self) -> StoreResult<Vec<Member>> {
        (**self).list_founders()
    }
}

impl<S: MemberStore + ?Sized> MemberStore for Arc<S> {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        (**self).get_member(id)
    }

    fn list_children(&self, parent_id: MemberId) -> StoreResult<Vec<Member>> {
        (**self).list_children(parent_id)
    }

    fn list_spousal_links(&self, member_id: MemberId) -> StoreResult<Vec<SpousalLink>> {
        (**self).list_spousal_links(member_id)
    }

    fn get_spousal_link(&self, a: MemberId, b: MemberId) -> StoreResult<Option<SpousalLink>> {
        (**self).get_spousal_link(a, b)
    }

    fn list_founders(&self) -> StoreResult<Vec<Member>> {
        (**self).list_founders()
    }
}
