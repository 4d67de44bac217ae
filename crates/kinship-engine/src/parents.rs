//! Cycle-safe parent assignment.

use kinship::MemberId;
use tracing::debug;

use crate::ancestry::{AncestryOracle, Reachability};
use crate::error::{GenealogyError, GenealogyResult};

/// Rejects parent assignments that would make a member its own ancestor.
pub struct ParentAssignmentGuard<'a> {
    oracle: AncestryOracle<'a>,
}

impl<'a> ParentAssignmentGuard<'a> {
    /// Creates a guard over the given oracle.
    pub fn new(oracle: AncestryOracle<'a>) -> Self {
        Self { oracle }
    }

    /// Validates a proposed father and mother for `member_id`.
    ///
    /// Either slot may be `None` (left empty). Fails with
    /// [`GenealogyError::CircularRelationship`] when the member is proposed
    /// as its own parent or is already an ancestor of a proposed parent, and
    /// with [`GenealogyError::DepthLimitExceeded`] when the ancestry of a
    /// proposed parent is too deep to prove either way.
    pub fn validate_parents(
        &self,
        member_id: MemberId,
        father_id: Option<MemberId>,
        mother_id: Option<MemberId>,
    ) -> GenealogyResult<()> {
        let proposed = [father_id, mother_id];

        for parent in proposed.into_iter().flatten() {
            if parent == member_id {
                debug!(member = member_id, "rejected self-parent assignment");
                return Err(GenealogyError::CircularRelationship {
                    member: member_id,
                    parent,
                });
            }
        }

        for parent in proposed.into_iter().flatten() {
            match self.oracle.probe(member_id, parent)? {
                Reachability::Unreachable => {}
                Reachability::Reachable => {
                    debug!(member = member_id, parent, "rejected cyclic parent assignment");
                    return Err(GenealogyError::CircularRelationship {
                        member: member_id,
                        parent,
                    });
                }
                Reachability::DepthLimited => {
                    return Err(GenealogyError::DepthLimitExceeded {
                        limit: self.oracle.max_depth(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::{arb_family, chain, female, male, MockStore};
    use proptest::prelude::*;

    fn guard(store: &MockStore) -> ParentAssignmentGuard<'_> {
        ParentAssignmentGuard::new(AncestryOracle::new(store))
    }

    #[test]
    fn test_rejects_self_parent() {
        let mut store = MockStore::new();
        store.add(male(1));

        let err = guard(&store).validate_parents(1, Some(1), None).unwrap_err();
        assert_eq!(
            err,
            GenealogyError::CircularRelationship { member: 1, parent: 1 }
        );

        let err = guard(&store).validate_parents(1, None, Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CircularRelationship);
    }

    #[test]
    fn test_rejects_descendant_as_father() {
        // Member 5's father is member 2.
        let mut store = MockStore::new();
        store.add(male(2)).add(male(5).with_father(2));

        let err = guard(&store).validate_parents(2, Some(5), None).unwrap_err();
        assert_eq!(
            err,
            GenealogyError::CircularRelationship { member: 2, parent: 5 }
        );
    }

    #[test]
    fn test_rejects_distant_descendant_as_mother() {
        let mut store = MockStore::new();
        store
            .add(female(1))
            .add(female(2).with_mother(1))
            .add(male(3).with_mother(2))
            .add(female(4).with_father(3));

        let err = guard(&store).validate_parents(1, None, Some(4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CircularRelationship);
    }

    #[test]
    fn test_accepts_unrelated_parents() {
        let mut store = MockStore::new();
        store.add(male(1)).add(female(2)).add(male(3));

        assert!(guard(&store).validate_parents(3, Some(1), Some(2)).is_ok());
        assert!(guard(&store).validate_parents(3, None, None).is_ok());
    }

    #[test]
    fn test_accepts_grandparent_as_parent_slot() {
        // Re-pointing a member to its grandfather keeps the graph acyclic.
        let mut store = MockStore::new();
        store
            .add(male(1))
            .add(male(2).with_father(1))
            .add(male(3).with_father(2));

        assert!(guard(&store).validate_parents(3, Some(1), None).is_ok());
    }

    #[test]
    fn test_unknown_parent_is_not_a_cycle() {
        let store = MockStore::new();
        assert!(guard(&store).validate_parents(1, Some(77), Some(78)).is_ok());
    }

    #[test]
    fn test_depth_limit_is_distinct_from_cycle() {
        let store = chain(30);
        let guard = ParentAssignmentGuard::new(AncestryOracle::new(&store).with_max_depth(10));

        let err = guard.validate_parents(500, Some(30), None).unwrap_err();
        assert_eq!(err, GenealogyError::DepthLimitExceeded { limit: 10 });
    }

    proptest! {
        #[test]
        fn accepted_assignments_keep_graph_acyclic(
            store in arb_family(20),
            member in 1u64..20,
            father in proptest::option::of(1u64..20),
            mother in proptest::option::of(1u64..20),
        ) {
            let result = guard(&store).validate_parents(member, father, mother);

            let mut updated = store.clone();
            if let Some(m) = updated.members.get_mut(&member) {
                m.father_id = father;
                m.mother_id = mother;
            }
            let oracle = AncestryOracle::new(&updated);
            let cyclic = oracle.is_ancestor(member, member).unwrap();

            if updated.members.contains_key(&member) {
                prop_assert_eq!(result.is_ok(), !cyclic);
            } else {
                prop_assert!(!cyclic);
            }
        }
    }
}
