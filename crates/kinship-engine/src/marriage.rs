//! Marriage eligibility rules.
//!
//! Six prohibitions are evaluated in a fixed order and the first violation is
//! reported. Every rule is checked in both directions, so the outcome does
//! not depend on argument order.
//!
//! | # | Rule | Error |
//! |---|------|-------|
//! | 1 | one is an ancestor of the other | [`AncestorDescendant`](GenealogyError::AncestorDescendant) |
//! | 2 | shared father or mother | [`Siblings`](GenealogyError::Siblings) |
//! | 3 | one is a sibling of the other's parent | [`AuntNiece`](GenealogyError::AuntNiece) |
//! | 4 | one is a parent of the other's spouse, current or former | [`InLaw`](GenealogyError::InLaw) |
//! | 5 | one is or was married to the other's parent | [`StepRelation`](GenealogyError::StepRelation) |
//! | 6 | either holds an active marriage | [`AlreadyMarried`](GenealogyError::AlreadyMarried) |

use kinship::{Member, MemberId, SpousalLink};
use tracing::debug;

use crate::ancestry::AncestryOracle;
use crate::error::{GenealogyError, GenealogyResult};

/// One side of a proposed marriage with its one-hop neighbourhood loaded.
struct Party {
    member: Member,
    parents: Vec<Member>,
    links: Vec<SpousalLink>,
    spouses: Vec<Member>,
}

impl Party {
    fn partner_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.links
            .iter()
            .filter_map(|link| link.partner_of(self.member.id))
    }

    fn active_partner(&self) -> Option<MemberId> {
        self.links
            .iter()
            .filter(|link| link.is_active())
            .find_map(|link| link.partner_of(self.member.id))
    }
}

/// Decides whether two members may marry.
pub struct MarriageEligibility<'a> {
    oracle: AncestryOracle<'a>,
}

impl<'a> MarriageEligibility<'a> {
    /// Creates the rule engine over the given oracle.
    pub fn new(oracle: AncestryOracle<'a>) -> Self {
        Self { oracle }
    }

    /// Validates a proposed marriage between `member_a` and `member_b`.
    ///
    /// Both members must exist. The one-hop data for every rule is gathered
    /// before any rule is evaluated; only the first failing rule is
    /// reported.
    pub fn validate_marriage(&self, member_a: MemberId, member_b: MemberId) -> GenealogyResult<()> {
        if member_a == member_b {
            return Err(GenealogyError::SelfRelation(member_a));
        }

        let a = self.load(member_a)?;
        let b = self.load(member_b)?;

        let result = self.evaluate(&a, &b);
        if let Err(ref err) = result {
            debug!(member_a, member_b, kind = %err.kind(), "marriage rejected");
        }
        result
    }

    fn load(&self, id: MemberId) -> GenealogyResult<Party> {
        let store = self.oracle.store();
        let member = store
            .get_member(id)?
            .ok_or(GenealogyError::MemberNotFound(id))?;

        let mut parents = Vec::with_capacity(2);
        for (_, parent_id) in member.parent_ids() {
            if let Some(parent) = store.get_member(parent_id)? {
                parents.push(parent);
            }
        }

        let links = store.list_spousal_links(id)?;
        let mut spouses = Vec::with_capacity(links.len());
        for partner_id in links.iter().filter_map(|link| link.partner_of(id)) {
            if let Some(spouse) = store.get_member(partner_id)? {
                spouses.push(spouse);
            }
        }

        Ok(Party {
            member,
            parents,
            links,
            spouses,
        })
    }

    fn evaluate(&self, a: &Party, b: &Party) -> GenealogyResult<()> {
        let (a_id, b_id) = (a.member.id, b.member.id);

        if self.oracle.is_ancestor(a_id, b_id)? {
            return Err(GenealogyError::AncestorDescendant {
                ancestor: a_id,
                descendant: b_id,
            });
        }
        if self.oracle.is_ancestor(b_id, a_id)? {
            return Err(GenealogyError::AncestorDescendant {
                ancestor: b_id,
                descendant: a_id,
            });
        }

        if a.member.shares_parent_with(&b.member) {
            return Err(GenealogyError::Siblings {
                member: a_id,
                other: b_id,
            });
        }

        for (elder, younger) in [(a, b), (b, a)] {
            if is_sibling_of_parent(elder, younger) {
                return Err(GenealogyError::AuntNiece {
                    elder: elder.member.id,
                    younger: younger.member.id,
                });
            }
        }

        for (elder, younger) in [(a, b), (b, a)] {
            if is_parent_in_law(elder, younger) {
                return Err(GenealogyError::InLaw {
                    elder: elder.member.id,
                    younger: younger.member.id,
                });
            }
        }

        for (elder, younger) in [(a, b), (b, a)] {
            if is_step_parent(elder, younger) {
                return Err(GenealogyError::StepRelation {
                    elder: elder.member.id,
                    younger: younger.member.id,
                });
            }
        }

        for party in [a, b] {
            if let Some(partner) = party.active_partner() {
                return Err(GenealogyError::AlreadyMarried {
                    member: party.member.id,
                    partner,
                });
            }
        }

        Ok(())
    }
}

/// `elder` shares a parent with one of `younger`'s parents.
fn is_sibling_of_parent(elder: &Party, younger: &Party) -> bool {
    younger
        .parents
        .iter()
        .any(|parent| elder.member.shares_parent_with(parent))
}

/// `elder` is a parent of one of `younger`'s current or former spouses.
fn is_parent_in_law(elder: &Party, younger: &Party) -> bool {
    younger
        .spouses
        .iter()
        .any(|spouse| elder.member.is_parent_of(spouse))
}

/// `elder` is or was married to one of `younger`'s parents.
fn is_step_parent(elder: &Party, younger: &Party) -> bool {
    elder.partner_ids().any(|partner| {
        younger.member.father_id == Some(partner) || younger.member.mother_id == Some(partner)
    })
}
