//! Spousal links: the undirected spouse edges of the genealogy graph.

use chrono::NaiveDate;

use crate::MemberId;

/// Surrogate identifier for a stored spousal link.
pub type LinkId = u64;

/// A marriage record between two members.
///
/// The pair is unordered. A link without a divorce date is an active
/// marriage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpousalLink {
    /// Surrogate id assigned by the store, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<LinkId>,
    /// First partner.
    pub member_a: MemberId,
    /// Second partner.
    pub member_b: MemberId,
    /// Date of marriage, if recorded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub marriage_date: Option<NaiveDate>,
    /// Date of divorce, if the marriage has ended.
    #[cfg_attr(feature = "serde", serde(default))]
    pub divorce_date: Option<NaiveDate>,
}

impl SpousalLink {
    /// Creates an active, undated link between two members.
    pub fn new(member_a: MemberId, member_b: MemberId) -> Self {
        Self {
            id: None,
            member_a,
            member_b,
            marriage_date: None,
            divorce_date: None,
        }
    }

    /// Sets the surrogate id.
    pub fn with_id(mut self, id: LinkId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the marriage date.
    pub fn married_on(mut self, date: NaiveDate) -> Self {
        self.marriage_date = Some(date);
        self
    }

    /// Sets the divorce date, closing the link.
    pub fn divorced_on(mut self, date: NaiveDate) -> Self {
        self.divorce_date = Some(date);
        self
    }

    /// Returns true if the link has no divorce date.
    pub fn is_active(&self) -> bool {
        self.divorce_date.is_none()
    }

    /// Returns true if `id` is one of the partners.
    pub fn involves(&self, id: MemberId) -> bool {
        self.member_a == id || self.member_b == id
    }

    /// Returns the other partner, or `None` if `id` is not on this link.
    pub fn partner_of(&self, id: MemberId) -> Option<MemberId> {
        if self.member_a == id {
            Some(self.member_b)
        } else if self.member_b == id {
            Some(self.member_a)
        } else {
            None
        }
    }

    /// Returns true if the link joins `a` and `b`, in either order.
    pub fn connects(&self, a: MemberId, b: MemberId) -> bool {
        (self.member_a == a && self.member_b == b) || (self.member_a == b && self.member_b == a)
    }
}
