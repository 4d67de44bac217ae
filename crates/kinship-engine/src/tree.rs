//! Rooted, generation-levelled views of the family graph.
//!
//! A [`TreeNode`] is built fresh per request and owned by the caller. The
//! output is a tree, not a DAG: a member reachable along two lines of
//! descent (a child of a cousin marriage) is rendered once per line, with
//! its level computed along that line.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use kinship::{Member, MemberId};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::config::EngineConfig;
use crate::error::{GenealogyError, GenealogyResult};
use crate::traits::MemberStore;

/// A spousal partner attached to a tree node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpouseNode {
    /// The partner.
    pub member: Member,
    /// Marriage date on the link.
    pub marriage_date: Option<NaiveDate>,
    /// Divorce date on the link.
    pub divorce_date: Option<NaiveDate>,
    /// Marked when the partner lies on a rendered relation path.
    pub in_path: bool,
}

/// A sibling attached to a tree node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SiblingNode {
    /// The sibling.
    pub member: Member,
    /// Both recorded parents are shared.
    pub full: bool,
    /// Marked when the sibling lies on a rendered relation path.
    pub in_path: bool,
}

/// A member placed in a rendered tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TreeNode {
    /// The member at this position.
    pub member: Member,
    /// Generations below the tree root (root = 0).
    pub level: usize,
    /// Marked when the member lies on a rendered relation path.
    pub in_path: bool,
    /// Children in store order.
    pub children: Vec<TreeNode>,
    /// Spousal partners in store order.
    pub spouses: Vec<SpouseNode>,
    /// Siblings ordered by id.
    pub siblings: Vec<SiblingNode>,
}

impl TreeNode {
    fn leaf(member: Member, level: usize) -> Self {
        Self {
            member,
            level,
            in_path: false,
            children: Vec::new(),
            spouses: Vec::new(),
            siblings: Vec::new(),
        }
    }

    /// The member id at this node.
    pub fn id(&self) -> MemberId {
        self.member.id
    }

    /// Number of nodes in this subtree, counting this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Deepest level reached in this subtree.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(self.level)
    }

    /// Finds the first node for `id` in depth-first order.
    pub fn find(&self, id: MemberId) -> Option<&TreeNode> {
        if self.member.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Iterates over every node depth-first, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Ids of every node marked in-path, depth-first.
    pub fn path_ids(&self) -> Vec<MemberId> {
        self.iter()
            .filter(|node| node.in_path)
            .map(TreeNode::id)
            .collect()
    }

    /// Ids marked in-path anywhere in the tree, including attached spouses
    /// and siblings. Sorted, without duplicates.
    pub fn marked_ids(&self) -> Vec<MemberId> {
        let mut ids: Vec<MemberId> = self
            .iter()
            .flat_map(|node| {
                let own = node.in_path.then_some(node.member.id);
                let spouses = node.spouses.iter().filter(|s| s.in_path).map(|s| s.member.id);
                let siblings = node.siblings.iter().filter(|s| s.in_path).map(|s| s.member.id);
                own.into_iter().chain(spouses).chain(siblings)
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Returns true if `id` appears as a node, an attached spouse or an
    /// attached sibling.
    pub fn contains(&self, id: MemberId) -> bool {
        self.iter().any(|node| {
            node.member.id == id
                || node.spouses.iter().any(|s| s.member.id == id)
                || node.siblings.iter().any(|s| s.member.id == id)
        })
    }

    /// Counts nodes per level.
    pub fn level_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for node in self.iter() {
            *counts.entry(node.level).or_insert(0) += 1;
        }
        counts
    }

    /// Marks the nodes along a line of descent starting at this node.
    ///
    /// `line` must begin with this node's id and list one child per step.
    /// Returns the number of nodes marked; marking stops where the line
    /// leaves the tree.
    pub fn mark_line(&mut self, line: &[MemberId]) -> usize {
        let Some((&first, rest)) = line.split_first() else {
            return 0;
        };
        if first != self.member.id {
            return 0;
        }
        self.in_path = true;
        let Some(&next) = rest.first() else {
            return 1;
        };
        match self.children.iter_mut().find(|child| child.member.id == next) {
            Some(child) => 1 + child.mark_line(rest),
            None => 1,
        }
    }

    /// Marks every node, attached spouse and attached sibling whose id is in
    /// `ids`.
    ///
    /// Returns the number of positions marked.
    pub fn mark_members(&mut self, ids: &[MemberId]) -> usize {
        let mut marked = 0;
        if ids.contains(&self.member.id) {
            self.in_path = true;
            marked += 1;
        }
        for spouse in &mut self.spouses {
            if ids.contains(&spouse.member.id) {
                spouse.in_path = true;
                marked += 1;
            }
        }
        for sibling in &mut self.siblings {
            if ids.contains(&sibling.member.id) {
                sibling.in_path = true;
                marked += 1;
            }
        }
        for child in &mut self.children {
            marked += child.mark_members(ids);
        }
        marked
    }
}

/// Builds rooted trees from the store's child lists.
pub struct TreeBuilder<'a> {
    store: &'a dyn MemberStore,
    config: EngineConfig,
    cancel: CancellationToken,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder with the default configuration.
    pub fn new(store: &'a dyn MemberStore) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs a cancellation token checked between node visits.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds the tree rooted at `root`.
    ///
    /// Without a root, the founder (no father, no mother) with the lowest id
    /// that is not soft-deleted is used. Descending more than
    /// `max_depth` generations fails with
    /// [`GenealogyError::DepthLimitExceeded`].
    pub fn build_tree(&self, root: Option<MemberId>) -> GenealogyResult<TreeNode> {
        let root = match root {
            Some(id) => self
                .store
                .get_member(id)?
                .ok_or(GenealogyError::MemberNotFound(id))?,
            None => self.default_root()?,
        };

        let mut line = HashSet::new();
        self.build_node(root, 0, &mut line)
    }

    fn default_root(&self) -> GenealogyResult<Member> {
        self.store
            .list_founders()?
            .into_iter()
            .filter(|m| !m.is_deleted())
            .min_by_key(|m| m.id)
            .ok_or(GenealogyError::NoRoot)
    }

    fn build_node(
        &self,
        member: Member,
        level: usize,
        line: &mut HashSet<MemberId>,
    ) -> GenealogyResult<TreeNode> {
        if self.cancel.is_cancelled() {
            return Err(GenealogyError::Cancelled);
        }
        if level > self.config.max_depth {
            warn!(member = member.id, limit = self.config.max_depth, "tree exceeds generation bound");
            return Err(GenealogyError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        trace!(member = member.id, level, "rendering node");

        let mut node = TreeNode::leaf(member, level);
        let id = node.member.id;

        if self.config.attach_spouses {
            node.spouses = self.spouses_of(id)?;
        }
        if self.config.attach_siblings {
            node.siblings = siblings_of(self.store, &node.member)?;
        }

        line.insert(id);
        for child in self.store.list_children(id)? {
            if line.contains(&child.id) {
                warn!(member = id, child = child.id, "cyclic parent data, skipping child");
                continue;
            }
            node.children.push(self.build_node(child, level + 1, line)?);
        }
        line.remove(&id);

        Ok(node)
    }

    fn spouses_of(&self, id: MemberId) -> GenealogyResult<Vec<SpouseNode>> {
        let mut spouses = Vec::new();
        for link in self.store.list_spousal_links(id)? {
            let Some(partner_id) = link.partner_of(id) else {
                continue;
            };
            if let Some(member) = self.store.get_member(partner_id)? {
                spouses.push(SpouseNode {
                    member,
                    marriage_date: link.marriage_date,
                    divorce_date: link.divorce_date,
                    in_path: false,
                });
            }
        }
        Ok(spouses)
    }
}

/// Members sharing a father or a mother with `member`, ordered by id.
pub(crate) fn siblings_of(
    store: &dyn MemberStore,
    member: &Member,
) -> GenealogyResult<Vec<SiblingNode>> {
    let mut seen = HashSet::new();
    let mut siblings = Vec::new();
    for (_, parent_id) in member.parent_ids() {
        for candidate in store.list_children(parent_id)? {
            if candidate.id == member.id || !seen.insert(candidate.id) {
                continue;
            }
            if !member.shares_parent_with(&candidate) {
                continue;
            }
            let full = member.is_full_sibling_of(&candidate);
            siblings.push(SiblingNode {
                member: candidate,
                full,
                in_path: false,
            });
        }
    }
    siblings.sort_by_key(|s| s.member.id);
    Ok(siblings)
}
