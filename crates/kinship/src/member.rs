//! Members: the nodes of the genealogy graph.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::KinshipError;
use crate::MemberId;

/// Recorded gender of a member.
///
/// Stored and displayed with the single-letter codes `M` and `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gender {
    /// `M`
    #[cfg_attr(feature = "serde", serde(rename = "M"))]
    Male,
    /// `F`
    #[cfg_attr(feature = "serde", serde(rename = "F"))]
    Female,
}

impl Gender {
    /// Returns the single-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gender {
    type Err = KinshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" => Ok(Gender::Male),
            "F" | "f" => Ok(Gender::Female),
            other => Err(KinshipError::InvalidGender(other.to_string())),
        }
    }
}

/// One of the two parent slots on a member.
///
/// The slots are roles, not a claim about the referenced member's gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParentRole {
    /// The `father_id` slot.
    Father,
    /// The `mother_id` slot.
    Mother,
}

impl ParentRole {
    /// Both roles, father first.
    pub const ALL: [ParentRole; 2] = [ParentRole::Father, ParentRole::Mother];
}

impl fmt::Display for ParentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRole::Father => f.write_str("father"),
            ParentRole::Mother => f.write_str("mother"),
        }
    }
}

/// A person in the family graph.
///
/// Parent edges are the `father_id`/`mother_id` slots; spouse edges live in
/// [`SpousalLink`](crate::SpousalLink) records held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// Member identifier.
    pub id: MemberId,
    /// Recorded gender.
    pub gender: Gender,
    /// Date of birth, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub date_of_death: Option<NaiveDate>,
    /// Member in the father slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub father_id: Option<MemberId>,
    /// Member in the mother slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mother_id: Option<MemberId>,
    /// Display names keyed by language code (e.g. `"en"`, `"ar"`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub names: BTreeMap<String, String>,
    /// Free-form nicknames.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nicknames: Vec<String>,
    /// Profession, if recorded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub profession: Option<String>,
    /// Optimistic-concurrency counter maintained by the write path.
    #[cfg_attr(feature = "serde", serde(default = "initial_version"))]
    pub version: u64,
    /// Soft-delete marker.
    #[cfg_attr(feature = "serde", serde(default))]
    pub deleted_at: Option<NaiveDateTime>,
}

/// Version of a member that has never been updated.
const INITIAL_VERSION: u64 = 1;

#[cfg(feature = "serde")]
fn initial_version() -> u64 {
    INITIAL_VERSION
}

impl Member {
    /// Creates a member with no dates, parents or names.
    pub fn new(id: MemberId, gender: Gender) -> Self {
        Self {
            id,
            gender,
            date_of_birth: None,
            date_of_death: None,
            father_id: None,
            mother_id: None,
            names: BTreeMap::new(),
            nicknames: Vec::new(),
            profession: None,
            version: INITIAL_VERSION,
            deleted_at: None,
        }
    }

    /// Sets the date of birth.
    pub fn with_birth(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = Some(date);
        self
    }

    /// Sets the date of death.
    pub fn with_death(mut self, date: NaiveDate) -> Self {
        self.date_of_death = Some(date);
        self
    }

    /// Sets the father slot.
    pub fn with_father(mut self, father_id: MemberId) -> Self {
        self.father_id = Some(father_id);
        self
    }

    /// Sets the mother slot.
    pub fn with_mother(mut self, mother_id: MemberId) -> Self {
        self.mother_id = Some(mother_id);
        self
    }

    /// Sets both parent slots.
    pub fn with_parents(self, father_id: MemberId, mother_id: MemberId) -> Self {
        self.with_father(father_id).with_mother(mother_id)
    }

    /// Adds a display name for a language.
    pub fn with_name(mut self, lang: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(lang.into(), name.into());
        self
    }

    /// Marks the member as soft-deleted.
    pub fn with_deleted_at(mut self, at: NaiveDateTime) -> Self {
        self.deleted_at = Some(at);
        self
    }

    /// Returns the id held in a parent slot.
    pub fn parent(&self, role: ParentRole) -> Option<MemberId> {
        match role {
            ParentRole::Father => self.father_id,
            ParentRole::Mother => self.mother_id,
        }
    }

    /// Iterates over the filled parent slots, father first.
    pub fn parent_ids(&self) -> impl Iterator<Item = (ParentRole, MemberId)> + '_ {
        ParentRole::ALL
            .into_iter()
            .filter_map(move |role| self.parent(role).map(|id| (role, id)))
    }

    /// Returns true if neither parent slot is filled.
    pub fn is_founder(&self) -> bool {
        self.father_id.is_none() && self.mother_id.is_none()
    }

    /// Returns true if the member carries a soft-delete marker.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the slot through which `self` is a parent of `child`.
    pub fn parent_role_of(&self, child: &Member) -> Option<ParentRole> {
        child
            .parent_ids()
            .find(|&(_, id)| id == self.id)
            .map(|(role, _)| role)
    }

    /// Returns true if `self` sits in one of `child`'s parent slots.
    pub fn is_parent_of(&self, child: &Member) -> bool {
        self.parent_role_of(child).is_some()
    }

    /// Returns true if the two members share a father or a mother.
    ///
    /// Half siblings count. A member is never its own sibling.
    pub fn shares_parent_with(&self, other: &Member) -> bool {
        if self.id == other.id {
            return false;
        }
        let same = |a: Option<MemberId>, b: Option<MemberId>| matches!((a, b), (Some(x), Some(y)) if x == y);
        same(self.father_id, other.father_id) || same(self.mother_id, other.mother_id)
    }

    /// Returns true if the two members share both recorded parents.
    pub fn is_full_sibling_of(&self, other: &Member) -> bool {
        self.id != other.id
            && self.father_id.is_some()
            && self.mother_id.is_some()
            && self.father_id == other.father_id
            && self.mother_id == other.mother_id
    }

    /// Returns the display name for `lang`, falling back to any recorded name.
    pub fn display_name(&self, lang: &str) -> Option<&str> {
        self.names
            .get(lang)
            .or_else(|| self.names.values().next())
            .map(String::as_str)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.names.values().next() {
            Some(name) => write!(f, "{} ({})", name, self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_gender_round_trip_codes() {
        assert_eq!("M".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(Gender::Female.to_string(), "F");
    }

    #[test]
    fn test_gender_rejects_unknown_code() {
        let err = "X".parse::<Gender>().unwrap_err();
        assert_eq!(err, KinshipError::InvalidGender("X".to_string()));
    }

    #[test]
    fn test_parent_slots() {
        let m = Member::new(5, Gender::Male).with_father(1);
        assert_eq!(m.parent(ParentRole::Father), Some(1));
        assert_eq!(m.parent(ParentRole::Mother), None);
        assert_eq!(m.parent_ids().collect::<Vec<_>>(), vec![(ParentRole::Father, 1)]);
        assert!(!m.is_founder());
        assert!(Member::new(1, Gender::Male).is_founder());
    }

    #[test]
    fn test_parent_role_of() {
        let father = Member::new(1, Gender::Male);
        let mother = Member::new(2, Gender::Female);
        let child = Member::new(3, Gender::Female).with_parents(1, 2);

        assert_eq!(father.parent_role_of(&child), Some(ParentRole::Father));
        assert_eq!(mother.parent_role_of(&child), Some(ParentRole::Mother));
        assert!(!child.is_parent_of(&father));
    }

    #[test]
    fn test_half_and_full_siblings() {
        let a = Member::new(10, Gender::Male).with_parents(1, 2);
        let b = Member::new(11, Gender::Female).with_parents(1, 2);
        let c = Member::new(12, Gender::Female).with_parents(1, 3);
        let d = Member::new(13, Gender::Female).with_mother(4);

        assert!(a.shares_parent_with(&b));
        assert!(a.is_full_sibling_of(&b));
        assert!(a.shares_parent_with(&c));
        assert!(!a.is_full_sibling_of(&c));
        assert!(!a.shares_parent_with(&d));
        assert!(!a.shares_parent_with(&a));
    }

    #[test]
    fn test_missing_parents_are_not_shared() {
        let a = Member::new(10, Gender::Male);
        let b = Member::new(11, Gender::Male);
        assert!(!a.shares_parent_with(&b));
    }

    #[test]
    fn test_display_name_fallback() {
        let m = Member::new(1, Gender::Male)
            .with_name("ar", "سالم")
            .with_name("en", "Salem");
        assert_eq!(m.display_name("en"), Some("Salem"));
        assert_eq!(m.display_name("fr"), Some("سالم"));
        assert_eq!(Member::new(2, Gender::Male).display_name("en"), None);
    }

    #[test]
    fn test_builders_set_dates() {
        let m = Member::new(1, Gender::Female)
            .with_birth(date(1950, 3, 1))
            .with_death(date(2020, 1, 1));
        assert_eq!(m.date_of_birth, Some(date(1950, 3, 1)));
        assert_eq!(m.date_of_death, Some(date(2020, 1, 1)));
        assert!(!m.is_deleted());
    }
}
