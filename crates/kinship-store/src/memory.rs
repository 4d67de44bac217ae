//! `HashMap`-backed member store.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use kinship::{LinkId, Member, MemberId, SpousalLink};
use kinship_engine::{MemberStore, StoreResult};
use tracing::{debug, trace};

use crate::error::{MemoryStoreError, MemoryStoreResult};

/// In-memory family store.
///
/// Children are listed by birth date, then id, with undated members last.
/// Founders are listed by id. Soft-deleted members stay visible to every
/// read, so the engine's integrity checks still see them.
///
/// # Example
///
/// ```
/// use kinship::{Gender, Member};
/// use kinship_engine::GenealogyEngine;
/// use kinship_store::InMemoryStore;
///
/// let mut store = InMemoryStore::new();
/// store.insert_member(Member::new(1, Gender::Male));
/// store.insert_member(Member::new(2, Gender::Female).with_father(1));
///
/// let engine = GenealogyEngine::new(&store);
/// assert!(engine.is_ancestor(1, 2).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    members: HashMap<MemberId, Member>,
    links: Vec<SpousalLink>,
    next_link_id: LinkId,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            links: Vec::new(),
            next_link_id: 1,
        }
    }

    /// Inserts or replaces a member, returning the previous record.
    pub fn insert_member(&mut self, member: Member) -> Option<Member> {
        trace!(member = member.id, "insert member");
        self.members.insert(member.id, member)
    }

    /// Removes a member and every link it holds.
    pub fn remove_member(&mut self, id: MemberId) -> Option<Member> {
        let removed = self.members.remove(&id)?;
        let before = self.links.len();
        self.links.retain(|link| !link.involves(id));
        debug!(member = id, links = before - self.links.len(), "member removed");
        Some(removed)
    }

    /// Marks a member as soft-deleted. Returns false if it is not stored.
    pub fn soft_delete(&mut self, id: MemberId, at: NaiveDateTime) -> bool {
        match self.members.get_mut(&id) {
            Some(member) => {
                member.deleted_at = Some(at);
                true
            }
            None => false,
        }
    }

    /// Returns a stored member.
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Iterates over all members in no particular order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// All spousal links in insertion order.
    pub fn links(&self) -> &[SpousalLink] {
        &self.links
    }

    /// Number of stored members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if no member is stored.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Records an undated spousal link between two stored members.
    pub fn link_spouses(&mut self, a: MemberId, b: MemberId) -> MemoryStoreResult<LinkId> {
        self.add_link(SpousalLink::new(a, b))
    }

    /// Records a spousal link, assigning an id if it has none.
    pub fn add_link(&mut self, mut link: SpousalLink) -> MemoryStoreResult<LinkId> {
        if link.member_a == link.member_b {
            return Err(MemoryStoreError::SelfLink(link.member_a));
        }
        for id in [link.member_a, link.member_b] {
            if !self.members.contains_key(&id) {
                return Err(MemoryStoreError::UnknownMember(id));
            }
        }

        let id = match link.id {
            Some(id) => id,
            None => {
                let id = self.next_link_id;
                link.id = Some(id);
                id
            }
        };
        self.next_link_id = self.next_link_id.max(id + 1);

        trace!(link = id, member_a = link.member_a, member_b = link.member_b, "link added");
        self.links.push(link);
        Ok(id)
    }

    /// Records a divorce date on the most recent active link of the pair.
    pub fn divorce(&mut self, a: MemberId, b: MemberId, on: NaiveDate) -> MemoryStoreResult<()> {
        let link = self
            .links
            .iter_mut()
            .rev()
            .find(|link| link.connects(a, b) && link.is_active())
            .ok_or(MemoryStoreError::LinkNotFound(a, b))?;
        link.divorce_date = Some(on);
        Ok(())
    }

    #[cfg(feature = "snapshot")]
    pub(crate) fn from_parts(members: Vec<Member>, links: Vec<SpousalLink>) -> Self {
        let next_link_id = links
            .iter()
            .filter_map(|link| link.id)
            .max()
            .map_or(1, |max| max + 1);
        Self {
            members: members.into_iter().map(|m| (m.id, m)).collect(),
            links,
            next_link_id,
        }
    }
}

impl MemberStore for InMemoryStore {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        Ok(self.members.get(&id).cloned())
    }

    fn list_children(&self, parent_id: MemberId) -> StoreResult<Vec<Member>> {
        let mut children: Vec<Member> = self
            .members
            .values()
            .filter(|m| m.father_id == Some(parent_id) || m.mother_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|m| (m.date_of_birth.is_none(), m.date_of_birth, m.id));
        Ok(children)
    }

    fn list_spousal_links(&self, member_id: MemberId) -> StoreResult<Vec<SpousalLink>> {
        Ok(self
            .links
            .iter()
            .filter(|link| link.involves(member_id))
            .cloned()
            .collect())
    }

    fn get_spousal_link(&self, a: MemberId, b: MemberId) -> StoreResult<Option<SpousalLink>> {
        Ok(self.links.iter().rev().find(|link| link.connects(a, b)).cloned())
    }

    fn list_founders(&self) -> StoreResult<Vec<Member>> {
        let mut founders: Vec<Member> = self
            .members
            .values()
            .filter(|m| m.is_founder())
            .cloned()
            .collect();
        founders.sort_by_key(|m| m.id);
        Ok(founders)
    }
}
