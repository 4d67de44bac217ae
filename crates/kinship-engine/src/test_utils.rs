//! Shared test fixtures and arbitrary generators for property-based testing.

use std::collections::HashMap;

use chrono::NaiveDate;
use kinship::{Gender, Member, MemberId, SpousalLink};
use proptest::prelude::*;
use proptest::sample::Index;

use crate::error::{StoreError, StoreResult};
use crate::traits::MemberStore;

/// In-memory store for unit tests.
#[derive(Debug, Default, Clone)]
pub struct MockStore {
    pub members: HashMap<MemberId, Member>,
    pub links: Vec<SpousalLink>,
    pub unavailable: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, member: Member) -> &mut Self {
        self.members.insert(member.id, member);
        self
    }

    pub fn marry(&mut self, a: MemberId, b: MemberId) -> &mut Self {
        self.links.push(SpousalLink::new(a, b));
        self
    }

    pub fn link(&mut self, link: SpousalLink) -> &mut Self {
        self.links.push(link);
        self
    }
}

impl MemberStore for MockStore {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        if self.unavailable {
            return Err(StoreError::Unavailable("mock store offline".to_string()));
        }
        Ok(self.members.get(&id).cloned())
    }

    fn list_children(&self, parent_id: MemberId) -> StoreResult<Vec<Member>> {
        if self.unavailable {
            return Err(StoreError::Unavailable("mock store offline".to_string()));
        }
        let mut children: Vec<Member> = self
            .members
            .values()
            .filter(|m| m.father_id == Some(parent_id) || m.mother_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|m| m.id);
        Ok(children)
    }

    fn list_spousal_links(&self, member_id: MemberId) -> StoreResult<Vec<SpousalLink>> {
        if self.unavailable {
            return Err(StoreError::Unavailable("mock store offline".to_string()));
        }
        Ok(self
            .links
            .iter()
            .filter(|l| l.involves(member_id))
            .cloned()
            .collect())
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

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn male(id: MemberId) -> Member {
    Member::new(id, Gender::Male)
}

pub fn female(id: MemberId) -> Member {
    Member::new(id, Gender::Female)
}

/// Builds a linear chain `1 <- 2 <- ... <- len` where each member's father
/// is the previous one.
pub fn chain(len: u64) -> MockStore {
    let mut store = MockStore::new();
    store.add(male(1));
    for id in 2..=len {
        store.add(male(id).with_father(id - 1));
    }
    store
}

/// Generates an acyclic family of up to `max` members.
///
/// Parents always have a lower id than their children.
pub fn arb_family(max: usize) -> impl Strategy<Value = MockStore> {
    prop::collection::vec(
        (
            any::<Option<Index>>(),
            any::<Option<Index>>(),
            any::<bool>(),
        ),
        1..max,
    )
    .prop_map(|slots| {
        let mut store = MockStore::new();
        for (pos, (father, mother, is_male)) in slots.into_iter().enumerate() {
            let id = pos as MemberId + 1;
            let mut member = if is_male { male(id) } else { female(id) };
            if pos > 0 {
                member.father_id = father.map(|i| i.index(pos) as MemberId + 1);
                member.mother_id = mother.map(|i| i.index(pos) as MemberId + 1);
            }
            store.add(member);
        }
        store
    })
}
