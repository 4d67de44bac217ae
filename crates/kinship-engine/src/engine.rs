//! The engine facade.

use chrono::NaiveDate;
use kinship::MemberId;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::ancestry::{AncestorWalk, AncestryOracle};
use crate::birth::BirthDateChecker;
use crate::config::EngineConfig;
use crate::error::{GenealogyError, GenealogyResult};
use crate::marriage::MarriageEligibility;
use crate::parents::ParentAssignmentGuard;
use crate::relation::{Relation, RelationFinder};
use crate::traits::MemberStore;
use crate::tree::{TreeBuilder, TreeNode};

/// Main entry point of the genealogy engine.
///
/// The engine holds no state between calls: every operation reads what it
/// needs from the [`MemberStore`] and builds its collaborators on the spot.
/// It validates mutations but never performs them; the caller must persist
/// under the same transaction it re-validated in.
///
/// # Example
///
/// ```ignore
/// use kinship_engine::{EngineConfig, GenealogyEngine};
///
/// let engine = GenealogyEngine::with_config(&store, EngineConfig::default());
///
/// engine.validate_parents(child_id, Some(father_id), Some(mother_id))?;
/// engine.validate_marriage(groom_id, bride_id)?;
///
/// let tree = engine.build_tree(None)?;
/// println!("{} members over {} generations", tree.size(), tree.depth() + 1);
/// ```
pub struct GenealogyEngine<'a> {
    store: &'a dyn MemberStore,
    config: EngineConfig,
    cancel: CancellationToken,
}

impl<'a> GenealogyEngine<'a> {
    /// Creates an engine with the default configuration.
    pub fn new(store: &'a dyn MemberStore) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Creates an engine with a custom configuration.
    pub fn with_config(store: &'a dyn MemberStore, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Installs a cancellation token observed by every traversal.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &'a dyn MemberStore {
        self.store
    }

    fn oracle(&self) -> AncestryOracle<'a> {
        AncestryOracle::new(self.store)
            .with_max_depth(self.config.max_depth)
            .with_cancellation(self.cancel.clone())
    }

    fn tree_builder(&self) -> TreeBuilder<'a> {
        TreeBuilder::new(self.store)
            .with_config(self.config.clone())
            .with_cancellation(self.cancel.clone())
    }

    /// Returns true if `candidate` is an ancestor of `descendant`.
    ///
    /// Directional only; a depth-limited walk answers `false`.
    #[instrument(skip(self))]
    pub fn is_ancestor(&self, candidate: MemberId, descendant: MemberId) -> GenealogyResult<bool> {
        self.oracle().is_ancestor(candidate, descendant)
    }

    /// Walks every ancestor of `member_id` with its generation distance.
    #[instrument(skip(self))]
    pub fn ancestors(&self, member_id: MemberId) -> GenealogyResult<AncestorWalk> {
        self.oracle().ancestors(member_id)
    }

    /// Checks that a parent assignment would not create a cycle.
    #[instrument(skip(self))]
    pub fn validate_parents(
        &self,
        member_id: MemberId,
        father_id: Option<MemberId>,
        mother_id: Option<MemberId>,
    ) -> GenealogyResult<()> {
        ParentAssignmentGuard::new(self.oracle()).validate_parents(member_id, father_id, mother_id)
    }

    /// Checks a new birth date for an existing member.
    #[instrument(skip(self))]
    pub fn validate_birth_date(&self, member_id: MemberId, birth: NaiveDate) -> GenealogyResult<()> {
        BirthDateChecker::new(self.store).validate_birth_date(member_id, birth)
    }

    /// Checks the birth date of a child about to be created.
    #[instrument(skip(self))]
    pub fn validate_child_birth_date(
        &self,
        birth: NaiveDate,
        father_id: Option<MemberId>,
        mother_id: Option<MemberId>,
    ) -> GenealogyResult<()> {
        BirthDateChecker::new(self.store).validate_child_birth_date(birth, father_id, mother_id)
    }

    /// Checks whether two members may marry.
    #[instrument(skip(self))]
    pub fn validate_marriage(&self, member_a: MemberId, member_b: MemberId) -> GenealogyResult<()> {
        MarriageEligibility::new(self.oracle()).validate_marriage(member_a, member_b)
    }

    /// Checks marriage and divorce dates against both partners' births.
    #[instrument(skip(self))]
    pub fn validate_marriage_dates(
        &self,
        member_a: MemberId,
        member_b: MemberId,
        marriage: Option<NaiveDate>,
        divorce: Option<NaiveDate>,
    ) -> GenealogyResult<()> {
        BirthDateChecker::new(self.store).validate_marriage_dates(member_a, member_b, marriage, divorce)
    }

    /// Checks a death date against the member's stored birth date.
    #[instrument(skip(self))]
    pub fn validate_death_date(&self, member_id: MemberId, death: NaiveDate) -> GenealogyResult<()> {
        BirthDateChecker::new(self.store).validate_death_date(member_id, death)
    }

    /// Runs every check a parent-link mutation needs.
    ///
    /// The cycle guard runs first. Then, if the member has a stored birth
    /// date, the proposed parents' birth dates and marriage date are checked
    /// against it.
    #[instrument(skip(self))]
    pub fn validate_parent_change(
        &self,
        member_id: MemberId,
        father_id: Option<MemberId>,
        mother_id: Option<MemberId>,
    ) -> GenealogyResult<()> {
        self.validate_parents(member_id, father_id, mother_id)?;

        let member = self
            .store
            .get_member(member_id)?
            .ok_or(GenealogyError::MemberNotFound(member_id))?;
        match member.date_of_birth {
            Some(birth) => self.validate_child_birth_date(birth, father_id, mother_id),
            None => Ok(()),
        }
    }

    /// Runs every check a spousal-link creation needs: eligibility, then
    /// the dates.
    #[instrument(skip(self))]
    pub fn validate_spousal_link(
        &self,
        member_a: MemberId,
        member_b: MemberId,
        marriage: Option<NaiveDate>,
        divorce: Option<NaiveDate>,
    ) -> GenealogyResult<()> {
        self.validate_marriage(member_a, member_b)?;
        self.validate_marriage_dates(member_a, member_b, marriage, divorce)
    }

    /// Renders the family tree under `root`, or under the default root.
    #[instrument(skip(self))]
    pub fn build_tree(&self, root: Option<MemberId>) -> GenealogyResult<TreeNode> {
        self.tree_builder().build_tree(root)
    }

    /// Finds how `member_a` relates to `member_b`.
    #[instrument(skip(self))]
    pub fn find_relation(&self, member_a: MemberId, member_b: MemberId) -> GenealogyResult<Relation> {
        RelationFinder::new(self.oracle(), self.tree_builder()).find_relation(member_a, member_b)
    }
}
