//! Depth-bounded reachability over parent edges.
//!
//! This module provides the [`AncestryOracle`], the traversal primitive the
//! rest of the engine builds on. Walks go upward from a member through the
//! father and mother slots, one generation per BFS level.

use std::collections::{HashMap, HashSet};

use kinship::MemberId;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::config::MAX_GENERATIONS;
use crate::error::{GenealogyError, GenealogyResult};
use crate::traits::MemberStore;

/// Outcome of a directional reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// The candidate is an ancestor.
    Reachable,
    /// Every branch ended without meeting the candidate.
    Unreachable,
    /// The generation bound was hit with branches still open.
    DepthLimited,
}

/// One ancestor recorded by an [`AncestorWalk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AncestorEntry {
    /// Generations between the origin and this ancestor.
    pub distance: usize,
    /// The member one generation closer to the origin through which this
    /// ancestor was first reached. `None` for the origin itself.
    pub via: Option<MemberId>,
}

/// Result of walking every ancestor of one member.
///
/// The origin is recorded at distance 0. Distances are shortest paths, so an
/// ancestor reachable through several lines (cousin marriages) appears once.
#[derive(Debug, Clone)]
pub struct AncestorWalk {
    origin: MemberId,
    entries: HashMap<MemberId, AncestorEntry>,
    truncated: bool,
}

impl AncestorWalk {
    /// The member the walk started from.
    pub fn origin(&self) -> MemberId {
        self.origin
    }

    /// Distance to `id`, or `None` if it is not an ancestor-or-self.
    pub fn distance(&self, id: MemberId) -> Option<usize> {
        self.entries.get(&id).map(|e| e.distance)
    }

    /// Returns true if `id` is the origin or one of its ancestors.
    pub fn contains(&self, id: MemberId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of ancestors found, excluding the origin.
    pub fn len(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Returns true if no ancestors were found.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the walk stopped at the generation bound.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Iterates over `(ancestor, distance)` pairs, excluding the origin.
    pub fn ancestors(&self) -> impl Iterator<Item = (MemberId, usize)> + '_ {
        self.entries
            .iter()
            .filter(|(&id, _)| id != self.origin)
            .map(|(&id, e)| (id, e.distance))
    }

    /// Iterates over every recorded member including the origin.
    pub fn entries(&self) -> impl Iterator<Item = (MemberId, AncestorEntry)> + '_ {
        self.entries.iter().map(|(&id, &e)| (id, e))
    }

    /// The line from `ancestor` down to the origin, both ends included.
    ///
    /// Returns an empty Vec if `ancestor` was not reached.
    pub fn line_from(&self, ancestor: MemberId) -> Vec<MemberId> {
        let mut line = Vec::new();
        let mut cursor = Some(ancestor);
        while let Some(id) = cursor {
            let Some(entry) = self.entries.get(&id) else {
                return Vec::new();
            };
            line.push(id);
            cursor = entry.via;
        }
        line
    }

    /// The most distant ancestor, lowest id on ties. The origin if it has
    /// no recorded ancestors.
    pub fn farthest(&self) -> MemberId {
        self.entries
            .iter()
            .max_by(|(a_id, a), (b_id, b)| a.distance.cmp(&b.distance).then(b_id.cmp(a_id)))
            .map(|(&id, _)| id)
            .unwrap_or(self.origin)
    }
}

/// Answers "is A an ancestor of B?" over the parent-edge subgraph.
///
/// Walks are breadth-first with a visited set, so shared ancestors are
/// expanded once, and stop after `max_depth` generations. A member that
/// cannot be found ends its branch; it is not an error.
///
/// # Example
///
/// ```ignore
/// use kinship_engine::AncestryOracle;
///
/// let oracle = AncestryOracle::new(&store);
/// assert!(oracle.is_ancestor(grandfather_id, grandchild_id)?);
/// ```
#[derive(Clone)]
pub struct AncestryOracle<'a> {
    store: &'a dyn MemberStore,
    max_depth: usize,
    cancel: CancellationToken,
}

impl<'a> AncestryOracle<'a> {
    /// Creates an oracle bounded at [`MAX_GENERATIONS`].
    pub fn new(store: &'a dyn MemberStore) -> Self {
        Self {
            store,
            max_depth: MAX_GENERATIONS,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the generation bound. Zero is clamped to one.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Installs a cancellation token checked between member visits.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The store this oracle reads from.
    pub fn store(&self) -> &'a dyn MemberStore {
        self.store
    }

    /// The generation bound.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The installed cancellation token.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn checkpoint(&self) -> GenealogyResult<()> {
        if self.cancel.is_cancelled() {
            Err(GenealogyError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Returns true if `candidate` is a strict ancestor of `descendant`.
    ///
    /// A walk that hits the generation bound answers `false`. Run the query
    /// in both directions for an undirected answer.
    pub fn is_ancestor(&self, candidate: MemberId, descendant: MemberId) -> GenealogyResult<bool> {
        Ok(self.probe(candidate, descendant)? == Reachability::Reachable)
    }

    /// Like [`is_ancestor`](Self::is_ancestor) but distinguishes "not found"
    /// from "bound reached before deciding".
    pub fn probe(&self, candidate: MemberId, descendant: MemberId) -> GenealogyResult<Reachability> {
        let mut visited: HashSet<MemberId> = HashSet::with_capacity(64);
        visited.insert(descendant);
        let mut frontier = vec![descendant];
        let mut depth = 0;

        while !frontier.is_empty() {
            if depth >= self.max_depth {
                warn!(
                    candidate,
                    descendant,
                    limit = self.max_depth,
                    "ancestry probe reached the generation bound"
                );
                return Ok(Reachability::DepthLimited);
            }

            let mut next = Vec::with_capacity(frontier.len() * 2);
            for id in frontier {
                self.checkpoint()?;
                let Some(member) = self.store.get_member(id)? else {
                    warn!(member = id, "dangling reference ends this branch");
                    continue;
                };
                for (_, parent) in member.parent_ids() {
                    if parent == candidate {
                        return Ok(Reachability::Reachable);
                    }
                    if visited.insert(parent) {
                        next.push(parent);
                    }
                }
            }

            frontier = next;
            depth += 1;
        }

        Ok(Reachability::Unreachable)
    }

    /// Walks every ancestor of `origin` up to the generation bound.
    ///
    /// Parents are expanded father first, so the recorded `via` links are
    /// deterministic for a given store.
    pub fn ancestors(&self, origin: MemberId) -> GenealogyResult<AncestorWalk> {
        let mut entries = HashMap::with_capacity(64);
        entries.insert(
            origin,
            AncestorEntry {
                distance: 0,
                via: None,
            },
        );
        let mut frontier = vec![origin];
        let mut depth = 0;
        let mut truncated = false;

        while !frontier.is_empty() {
            if depth >= self.max_depth {
                warn!(origin, limit = self.max_depth, "ancestor walk truncated");
                truncated = true;
                break;
            }

            let mut next = Vec::with_capacity(frontier.len() * 2);
            for id in frontier {
                self.checkpoint()?;
                let Some(member) = self.store.get_member(id)? else {
                    warn!(origin, member = id, "dangling reference ends this branch");
                    continue;
                };
                for (_, parent) in member.parent_ids() {
                    if entries.contains_key(&parent) {
                        continue;
                    }
                    trace!(origin, ancestor = parent, distance = depth + 1, "ancestor reached");
                    entries.insert(
                        parent,
                        AncestorEntry {
                            distance: depth + 1,
                            via: Some(id),
                        },
                    );
                    next.push(parent);
                }
            }

            frontier = next;
            depth += 1;
        }

        Ok(AncestorWalk {
            origin,
            entries,
            truncated,
        })
    }
}
