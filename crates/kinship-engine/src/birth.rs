//! Temporal ordering rules between births, marriages, divorces and deaths.
//!
//! All comparisons are strict: wherever one date must come before another,
//! equal dates are rejected. A rule whose inputs are unknown (no stored
//! birth date, a referenced parent that does not exist) does not apply.

use chrono::NaiveDate;
use kinship::{Gender, Member, MemberId, ParentRole};
use tracing::debug;

use crate::error::{GenealogyError, GenealogyResult};
use crate::traits::MemberStore;

/// Checks birth dates against the rest of the tree.
pub struct BirthDateChecker<'a> {
    store: &'a dyn MemberStore,
}

impl<'a> BirthDateChecker<'a> {
    /// Creates a checker reading from the given store.
    pub fn new(store: &'a dyn MemberStore) -> Self {
        Self { store }
    }

    /// Validates a new birth date for an existing member.
    ///
    /// Rules, in order:
    /// 1. born strictly before every recorded marriage
    /// 2. born strictly after each known parent
    /// 3. born strictly before each child with a known birth date
    /// 4. not born after a recorded death
    pub fn validate_birth_date(&self, member_id: MemberId, birth: NaiveDate) -> GenealogyResult<()> {
        let member = self
            .store
            .get_member(member_id)?
            .ok_or(GenealogyError::MemberNotFound(member_id))?;

        for link in self.store.list_spousal_links(member_id)? {
            let Some(married) = link.marriage_date else {
                continue;
            };
            if birth >= married {
                let partner = link.partner_of(member_id).unwrap_or(member_id);
                debug!(member = member_id, partner, %birth, %married, "birth after marriage");
                return Err(GenealogyError::BirthAfterMarriage {
                    member: member_id,
                    partner,
                });
            }
        }

        self.check_parents(birth, Some(member_id), member.father_id, member.mother_id)?;

        for child in self.store.list_children(member_id)? {
            let Some(child_birth) = child.date_of_birth else {
                continue;
            };
            if birth >= child_birth {
                let role = member
                    .parent_role_of(&child)
                    .unwrap_or_else(|| role_for_gender(member.gender));
                debug!(member = member_id, child = child.id, "birth after own child");
                return Err(GenealogyError::ParentBornAfterChild {
                    parent: member_id,
                    child: Some(child.id),
                    role,
                });
            }
        }

        if let Some(death) = member.date_of_death {
            if death < birth {
                return Err(GenealogyError::DeathBeforeBirth(member_id));
            }
        }

        Ok(())
    }

    /// Validates the birth date of a child about to be created.
    ///
    /// Each known parent must be born strictly before the child. When both
    /// parents are given and a link between them records a marriage date,
    /// the child must not be born before it. A missing link is not an error.
    pub fn validate_child_birth_date(
        &self,
        birth: NaiveDate,
        father_id: Option<MemberId>,
        mother_id: Option<MemberId>,
    ) -> GenealogyResult<()> {
        self.check_parents(birth, None, father_id, mother_id)?;

        if let (Some(father), Some(mother)) = (father_id, mother_id) {
            let married = self
                .store
                .get_spousal_link(father, mother)?
                .and_then(|link| link.marriage_date);
            if let Some(married) = married {
                if birth < married {
                    debug!(father, mother, %birth, %married, "child born before parents married");
                    return Err(GenealogyError::BirthBeforeParentsMarriage { father, mother });
                }
            }
        }

        Ok(())
    }

    /// Validates the dates of a marriage about to be recorded.
    ///
    /// Both partners must be born strictly before the marriage date, and a
    /// divorce date must fall strictly after it.
    pub fn validate_marriage_dates(
        &self,
        member_a: MemberId,
        member_b: MemberId,
        marriage: Option<NaiveDate>,
        divorce: Option<NaiveDate>,
    ) -> GenealogyResult<()> {
        let a = self.require(member_a)?;
        let b = self.require(member_b)?;

        if let Some(married) = marriage {
            for (member, partner) in [(&a, &b), (&b, &a)] {
                if member.date_of_birth.is_some_and(|born| born >= married) {
                    return Err(GenealogyError::BirthAfterMarriage {
                        member: member.id,
                        partner: partner.id,
                    });
                }
            }

            if divorce.is_some_and(|divorced| divorced <= married) {
                return Err(GenealogyError::DivorceBeforeMarriage { member_a, member_b });
            }
        }

        Ok(())
    }

    /// Validates a death date against the member's stored birth date.
    ///
    /// Dying on the day of birth is allowed.
    pub fn validate_death_date(&self, member_id: MemberId, death: NaiveDate) -> GenealogyResult<()> {
        let member = self.require(member_id)?;
        match member.date_of_birth {
            Some(born) if death < born => Err(GenealogyError::DeathBeforeBirth(member_id)),
            _ => Ok(()),
        }
    }

    fn require(&self, id: MemberId) -> GenealogyResult<Member> {
        self.store
            .get_member(id)?
            .ok_or(GenealogyError::MemberNotFound(id))
    }

    fn check_parents(
        &self,
        birth: NaiveDate,
        child: Option<MemberId>,
        father_id: Option<MemberId>,
        mother_id: Option<MemberId>,
    ) -> GenealogyResult<()> {
        let slots = [(ParentRole::Father, father_id), (ParentRole::Mother, mother_id)];
        for (role, parent_id) in slots {
            let Some(parent_id) = parent_id else {
                continue;
            };
            let Some(parent) = self.store.get_member(parent_id)? else {
                continue;
            };
            if parent.date_of_birth.is_some_and(|born| born >= birth) {
                debug!(parent = parent_id, %role, %birth, "parent born on or after child");
                return Err(GenealogyError::ParentBornAfterChild {
                    parent: parent_id,
                    child,
                    role,
                });
            }
        }
        Ok(())
    }
}

fn role_for_gender(gender: Gender) -> ParentRole {
    match gender {
        Gender::Male => ParentRole::Father,
        Gender::Female => ParentRole::Mother,
    }
}
