//! Relationship discovery between two members.
//!
//! The finder intersects the two ancestor walks, renders the subtree under
//! the nearest common ancestor, and marks the line connecting the pair. When
//! the pair shares no blood line it falls back to the spousal links.

use std::collections::HashSet;
use std::fmt;

use kinship::MemberId;
use tracing::debug;

use crate::ancestry::{AncestorWalk, AncestryOracle};
use crate::error::{GenealogyError, GenealogyResult};
use crate::tree::{TreeBuilder, TreeNode};

/// How the first member of a query relates to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Kinship {
    /// Both ids name the same member.
    Same,
    /// The first member is an ancestor of the second.
    Ancestor {
        /// 1 = parent, 2 = grandparent.
        generations: usize,
    },
    /// The first member is a descendant of the second.
    Descendant {
        /// 1 = child, 2 = grandchild.
        generations: usize,
    },
    /// The pair shares at least one parent.
    Sibling,
    /// The first member is a sibling of one of the second's ancestors.
    PiblingOf {
        /// 1 = aunt or uncle, 2 = great-aunt or great-uncle.
        generations: usize,
    },
    /// The second member is a sibling of one of the first's ancestors.
    NiblingOf {
        /// 1 = niece or nephew, 2 = grand-niece or grand-nephew.
        generations: usize,
    },
    /// The pair descends from a common ancestor through different children.
    Cousin {
        /// 1 = first cousin.
        degree: usize,
        /// Generational offset between the pair.
        removed: usize,
    },
    /// The pair is joined by a spousal link.
    Spouse,
    /// The pair is connected through the spousal link of `via`.
    InLaw {
        /// The spouse that bridges the two families.
        via: MemberId,
    },
}

impl Kinship {
    /// Classifies a blood relation from each member's distance to the
    /// nearest common ancestor.
    pub fn from_distances(from_a: usize, from_b: usize) -> Self {
        match (from_a, from_b) {
            (0, 0) => Kinship::Same,
            (0, n) => Kinship::Ancestor { generations: n },
            (n, 0) => Kinship::Descendant { generations: n },
            (1, 1) => Kinship::Sibling,
            (1, n) => Kinship::PiblingOf { generations: n - 1 },
            (n, 1) => Kinship::NiblingOf { generations: n - 1 },
            (a, b) => Kinship::Cousin {
                degree: a.min(b) - 1,
                removed: a.abs_diff(b),
            },
        }
    }

    /// Returns true for relations traced through parent edges only.
    pub fn is_blood(&self) -> bool {
        !matches!(self, Kinship::Spouse | Kinship::InLaw { .. })
    }

    /// English phrase for logs, e.g. "second cousin once removed".
    pub fn label(&self) -> String {
        match *self {
            Kinship::Same => "same member".to_string(),
            Kinship::Ancestor { generations } => lineal(generations, "parent", "grandparent"),
            Kinship::Descendant { generations } => lineal(generations, "child", "grandchild"),
            Kinship::Sibling => "sibling".to_string(),
            Kinship::PiblingOf { generations } => {
                format!("{}aunt or uncle", "great-".repeat(generations.saturating_sub(1)))
            }
            Kinship::NiblingOf { generations } => match generations {
                0 | 1 => "niece or nephew".to_string(),
                n => format!("{}grand-niece or grand-nephew", "great-".repeat(n.saturating_sub(2))),
            },
            Kinship::Cousin { degree, removed } => {
                let mut label = format!("{} cousin", ordinal(degree));
                match removed {
                    0 => {}
                    1 => label.push_str(" once removed"),
                    2 => label.push_str(" twice removed"),
                    n => label.push_str(&format!(" {n} times removed")),
                }
                label
            }
            Kinship::Spouse => "spouse".to_string(),
            Kinship::InLaw { via } => format!("in-law through member {via}"),
        }
    }
}

impl fmt::Display for Kinship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn lineal(generations: usize, first: &str, second: &str) -> String {
    match generations {
        0 | 1 => first.to_string(),
        n => format!("{}{second}", "great-".repeat(n - 2)),
    }
}

fn ordinal(n: usize) -> String {
    match n {
        1 => "first".to_string(),
        2 => "second".to_string(),
        3 => "third".to_string(),
        n => {
            let suffix = match (n % 10, n % 100) {
                (_, 11..=13) => "th",
                (1, _) => "st",
                (2, _) => "nd",
                (3, _) => "rd",
                _ => "th",
            };
            format!("{n}{suffix}")
        }
    }
}

/// A rendered relation between two members.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RelationView {
    /// Tree with the connecting members marked `in_path`.
    pub tree: TreeNode,
    /// How the first member relates to the second.
    pub kinship: Kinship,
    /// Nearest common ancestor, absent for spousal connections.
    pub common_ancestor: Option<MemberId>,
    /// Member ids from the first member to the second.
    pub path: Vec<MemberId>,
}

/// Result of a relation query. No connection is a result, not an error.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Relation {
    /// The pair is connected.
    Related(Box<RelationView>),
    /// No blood line or spousal bridge joins the pair.
    Unrelated,
}

impl Relation {
    /// Returns true if a connection was found.
    pub fn is_related(&self) -> bool {
        matches!(self, Relation::Related(_))
    }

    /// The rendered relation, if any.
    pub fn view(&self) -> Option<&RelationView> {
        match self {
            Relation::Related(view) => Some(view),
            Relation::Unrelated => None,
        }
    }

    /// Consumes the result, returning the rendered relation if any.
    pub fn into_view(self) -> Option<RelationView> {
        match self {
            Relation::Related(view) => Some(*view),
            Relation::Unrelated => None,
        }
    }
}

/// Finds and renders the relation between two members.
pub struct RelationFinder<'a> {
    oracle: AncestryOracle<'a>,
    builder: TreeBuilder<'a>,
}

impl<'a> RelationFinder<'a> {
    /// Creates a finder. Both collaborators should share a store and
    /// cancellation token.
    pub fn new(oracle: AncestryOracle<'a>, builder: TreeBuilder<'a>) -> Self {
        Self { oracle, builder }
    }

    /// Finds the relation of `member_a` to `member_b`.
    ///
    /// Both members must exist. Among the common ancestors the one with the
    /// smallest combined distance wins, then the lowest id.
    pub fn find_relation(
        &self,
        member_a: MemberId,
        member_b: MemberId,
    ) -> GenealogyResult<Relation> {
        let store = self.oracle.store();
        for id in [member_a, member_b] {
            if store.get_member(id)?.is_none() {
                return Err(GenealogyError::MemberNotFound(id));
            }
        }

        let walk_a = self.oracle.ancestors(member_a)?;
        let walk_b = self.oracle.ancestors(member_b)?;

        if let Some((ancestor, from_a, from_b)) = nearest_common(&walk_a, &walk_b) {
            let kinship = Kinship::from_distances(from_a, from_b);
            debug!(member_a, member_b, ancestor, %kinship, "blood relation found");
            return self.render_blood(&walk_a, &walk_b, ancestor, kinship);
        }

        match self.spousal_bridge(&walk_a, &walk_b)? {
            Some(bridge) => {
                debug!(member_a, member_b, kinship = %bridge.kinship, "spousal relation found");
                self.render_spousal(bridge)
            }
            None => {
                debug!(member_a, member_b, "no relation");
                Ok(Relation::Unrelated)
            }
        }
    }

    fn render_blood(
        &self,
        walk_a: &AncestorWalk,
        walk_b: &AncestorWalk,
        ancestor: MemberId,
        kinship: Kinship,
    ) -> GenealogyResult<Relation> {
        let line_a = walk_a.line_from(ancestor);
        let line_b = walk_b.line_from(ancestor);

        let mut tree = self.builder.build_tree(Some(ancestor))?;
        tree.mark_line(&line_a);
        tree.mark_line(&line_b);

        let mut path: Vec<MemberId> = line_a.iter().rev().copied().collect();
        path.extend(line_b.iter().skip(1));

        Ok(Relation::Related(Box::new(RelationView {
            tree,
            kinship,
            common_ancestor: Some(ancestor),
            path,
        })))
    }

    /// Looks for a direct link, then for the spousal link between a blood
    /// relative of each member that needs the fewest bridging members.
    /// Remaining ties go to the lowest ids.
    fn spousal_bridge(
        &self,
        walk_a: &AncestorWalk,
        walk_b: &AncestorWalk,
    ) -> GenealogyResult<Option<Bridge>> {
        let (member_a, member_b) = (walk_a.origin(), walk_b.origin());
        let store = self.oracle.store();
        if store.get_spousal_link(member_a, member_b)?.is_some() {
            return Ok(Some(Bridge {
                kinship: Kinship::Spouse,
                path: vec![member_a, member_b],
            }));
        }

        let clan_a = self.blood_relatives(walk_a)?;
        let clan_b = self.blood_relatives(walk_b)?;

        let mut candidates = Vec::new();
        for &relative in &clan_a {
            self.oracle.checkpoint()?;
            for link in store.list_spousal_links(relative)? {
                let Some(partner) = link.partner_of(relative) else {
                    continue;
                };
                if clan_b.contains(&partner) {
                    let hops = usize::from(relative != member_a) + usize::from(partner != member_b);
                    candidates.push((hops, relative, partner));
                }
            }
        }

        Ok(candidates.into_iter().min().map(|(_, relative, partner)| {
            let via = if partner != member_b { partner } else { relative };
            let mut path = vec![member_a];
            if relative != member_a {
                path.push(relative);
            }
            if partner != member_b {
                path.push(partner);
            }
            path.push(member_b);
            Bridge {
                kinship: Kinship::InLaw { via },
                path,
            }
        }))
    }

    /// The walk's ancestors-or-self and all of their descendants, down to
    /// the generation bound.
    fn blood_relatives(&self, walk: &AncestorWalk) -> GenealogyResult<HashSet<MemberId>> {
        let store = self.oracle.store();
        let mut clan: HashSet<MemberId> = walk.entries().map(|(id, _)| id).collect();
        let mut frontier: Vec<MemberId> = clan.iter().copied().collect();

        for _ in 0..self.oracle.max_depth() {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for id in frontier {
                self.oracle.checkpoint()?;
                for child in store.list_children(id)? {
                    if clan.insert(child.id) {
                        next.push(child.id);
                    }
                }
            }
            frontier = next;
        }

        Ok(clan)
    }

    /// Renders the candidate tree holding the most path members, the
    /// smallest on ties. Candidates are rooted at the top-most ancestor of
    /// each member on the path.
    fn render_spousal(&self, bridge: Bridge) -> GenealogyResult<Relation> {
        let Bridge { kinship, path } = bridge;

        let mut roots = Vec::with_capacity(path.len() + 1);
        for &id in &path {
            roots.push(self.oracle.ancestors(id)?.farthest());
        }
        roots.push(path[0]);

        let mut seen = HashSet::new();
        let mut best: Option<(usize, TreeNode)> = None;
        for root in roots {
            if !seen.insert(root) {
                continue;
            }
            let tree = match self.builder.build_tree(Some(root)) {
                Ok(tree) => tree,
                Err(GenealogyError::MemberNotFound(_)) => continue,
                Err(err) => return Err(err),
            };
            let covered = path.iter().filter(|&&id| tree.contains(id)).count();
            let better = match &best {
                None => true,
                Some((best_covered, best_tree)) => {
                    covered > *best_covered
                        || (covered == *best_covered && tree.size() < best_tree.size())
                }
            };
            if better {
                best = Some((covered, tree));
            }
        }

        let (covered, mut tree) = best.ok_or(GenealogyError::MemberNotFound(path[0]))?;
        if covered < path.len() {
            debug!(root = tree.id(), covered, path = ?path, "no single tree holds the whole path");
        }
        tree.mark_members(&path);

        Ok(Relation::Related(Box::new(RelationView {
            tree,
            kinship,
            common_ancestor: None,
            path,
        })))
    }
}

/// A spousal connection and the members it passes through.
struct Bridge {
    kinship: Kinship,
    path: Vec<MemberId>,
}

/// The common ancestor-or-self with the smallest combined distance, lowest
/// id on ties, with each side's distance to it.
fn nearest_common(
    walk_a: &AncestorWalk,
    walk_b: &AncestorWalk,
) -> Option<(MemberId, usize, usize)> {
    walk_a
        .entries()
        .filter_map(|(id, entry)| {
            walk_b
                .distance(id)
                .map(|from_b| (id, entry.distance, from_b))
        })
        .min_by_key(|&(id, from_a, from_b)| (from_a + from_b, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{chain, female, male, MockStore};
    use kinship::SpousalLink;
    use tokio_util::sync::CancellationToken;

    fn find(store: &MockStore, a: MemberId, b: MemberId) -> GenealogyResult<Relation> {
        RelationFinder::new(AncestryOracle::new(store), TreeBuilder::new(store)).find_relation(a, b)
    }

    /// ```text
    ///      1
    ///     / \
    ///    2   3
    ///    |   |
    ///    4   5
    ///    |
    ///    6
    /// ```
    fn cousins() -> MockStore {
        let mut store = MockStore::new();
        store
            .add(male(1))
            .add(male(2).with_father(1))
            .add(female(3).with_father(1))
            .add(male(4).with_father(2))
            .add(female(5).with_mother(3))
            .add(male(6).with_father(4));
        store
    }

    #[test]
    fn test_first_cousins_rendered_under_grandparent() {
        let store = cousins();
        let view = find(&store, 4, 5).unwrap().into_view().unwrap();

        assert_eq!(view.tree.id(), 1);
        assert_eq!(view.common_ancestor, Some(1));
        assert_eq!(view.path, vec![4, 2, 1, 3, 5]);
        assert_eq!(view.kinship, Kinship::Cousin { degree: 1, removed: 0 });

        let mut marked = view.tree.path_ids();
        marked.sort_unstable();
        assert_eq!(marked, vec![1, 2, 3, 4, 5]);
        assert!(!view.tree.find(6).unwrap().in_path);
    }

    #[test]
    fn test_cousin_once_removed() {
        let store = cousins();
        let view = find(&store, 6, 5).unwrap().into_view().unwrap();
        assert_eq!(view.kinship, Kinship::Cousin { degree: 1, removed: 1 });
        assert_eq!(view.path, vec![6, 4, 2, 1, 3, 5]);
    }

    #[test]
    fn test_direct_line() {
        let store = cousins();

        let view = find(&store, 1, 6).unwrap().into_view().unwrap();
        assert_eq!(view.kinship, Kinship::Ancestor { generations: 3 });
        assert_eq!(view.path, vec![1, 2, 4, 6]);

        let view = find(&store, 6, 1).unwrap().into_view().unwrap();
        assert_eq!(view.kinship, Kinship::Descendant { generations: 3 });
        assert_eq!(view.path, vec![6, 4, 2, 1]);
    }

    #[test]
    fn test_siblings_and_aunt() {
        let store = cousins();
        assert_eq!(
            find(&store, 2, 3).unwrap().view().unwrap().kinship,
            Kinship::Sibling
        );
        assert_eq!(
            find(&store, 3, 4).unwrap().view().unwrap().kinship,
            Kinship::PiblingOf { generations: 1 }
        );
        assert_eq!(
            find(&store, 6, 3).unwrap().view().unwrap().kinship,
            Kinship::NiblingOf { generations: 2 }
        );
    }

    #[test]
    fn test_same_member() {
        let store = cousins();
        let view = find(&store, 4, 4).unwrap().into_view().unwrap();
        assert_eq!(view.kinship, Kinship::Same);
        assert_eq!(view.path, vec![4]);
        assert_eq!(view.tree.id(), 4);
    }

    #[test]
    fn test_tie_break_lowest_id() {
        let mut store = MockStore::new();
        store
            .add(female(2))
            .add(male(1))
            .add(male(3).with_parents(1, 2))
            .add(female(4).with_parents(1, 2));

        let view = find(&store, 3, 4).unwrap().into_view().unwrap();
        assert_eq!(view.common_ancestor, Some(1));
        assert_eq!(view.path, vec![3, 1, 4]);
    }

    #[test]
    fn test_spouses_without_blood() {
        let mut store = MockStore::new();
        store
            .add(male(1))
            .add(female(2))
            .add(male(3).with_father(1))
            .marry(3, 2);

        let view = find(&store, 3, 2).unwrap().into_view().unwrap();
        assert_eq!(view.kinship, Kinship::Spouse);
        assert_eq!(view.path, vec![3, 2]);
        assert!(view.common_ancestor.is_none());
        // The bride's single-node tree holds the groom as a spouse.
        assert_eq!(view.tree.id(), 2);
        assert_eq!(view.tree.path_ids(), vec![2]);
        assert!(view.tree.spouses[0].in_path);
        assert_eq!(view.tree.marked_ids(), vec![2, 3]);
    }

    /// ```text
    ///      1
    ///     / \
    ///   20   21        10 x 20
    /// ```
    fn married_into() -> MockStore {
        let mut store = MockStore::new();
        store
            .add(male(1))
            .add(male(10))
            .add(female(20).with_father(1))
            .add(male(21).with_father(1))
            .link(SpousalLink::new(10, 20));
        store
    }

    #[test]
    fn test_in_law_through_spouse() {
        let store = married_into();
        let view = find(&store, 10, 21).unwrap().into_view().unwrap();

        assert_eq!(view.kinship, Kinship::InLaw { via: 20 });
        assert_eq!(view.path, vec![10, 20, 21]);
        assert_eq!(view.tree.id(), 1);
        assert_eq!(view.tree.marked_ids(), vec![10, 20, 21]);

        let mut nodes = view.tree.path_ids();
        nodes.sort_unstable();
        assert_eq!(nodes, vec![20, 21]);
        assert!(view.tree.find(20).unwrap().spouses[0].in_path);
        assert!(!view.tree.in_path);
    }

    #[test]
    fn test_in_law_from_the_other_side() {
        let store = married_into();
        let view = find(&store, 21, 10).unwrap().into_view().unwrap();

        assert_eq!(view.kinship, Kinship::InLaw { via: 20 });
        assert_eq!(view.path, vec![21, 20, 10]);
        assert_eq!(view.tree.id(), 1);
        assert_eq!(view.tree.marked_ids(), vec![10, 20, 21]);
    }

    #[test]
    fn test_in_law_to_spouses_parent() {
        let store = married_into();
        let view = find(&store, 10, 1).unwrap().into_view().unwrap();

        assert_eq!(view.kinship, Kinship::InLaw { via: 20 });
        assert_eq!(view.path, vec![10, 20, 1]);
        assert_eq!(view.tree.id(), 1);
        assert_eq!(view.tree.marked_ids(), vec![1, 10, 20]);
    }

    /// ```text
    ///     1          10
    ///    / \        /  \
    ///   2   3 x 11     12
    /// ```
    #[test]
    fn test_co_in_laws_through_siblings_marriage() {
        let mut store = MockStore::new();
        store
            .add(male(1))
            .add(male(10))
            .add(female(2).with_father(1))
            .add(female(3).with_father(1))
            .add(male(11).with_father(10))
            .add(male(12).with_father(10))
            .marry(3, 11);

        let view = find(&store, 2, 12).unwrap().into_view().unwrap();
        assert_eq!(view.kinship, Kinship::InLaw { via: 11 });
        assert_eq!(view.path, vec![2, 3, 11, 12]);

        // Neither family tree holds both ends; the first of the equally
        // covering trees is kept.
        assert_eq!(view.tree.id(), 1);
        assert_eq!(view.tree.marked_ids(), vec![2, 3, 11]);

        let view = find(&store, 12, 2).unwrap().into_view().unwrap();
        assert_eq!(view.kinship, Kinship::InLaw { via: 3 });
        assert_eq!(view.path, vec![12, 11, 3, 2]);
        assert_eq!(view.tree.id(), 10);
    }

    #[test]
    fn test_unrelated_is_not_an_error() {
        let mut store = MockStore::new();
        store.add(male(1)).add(female(2));
        let relation = find(&store, 1, 2).unwrap();
        assert_eq!(relation, Relation::Unrelated);
        assert!(!relation.is_related());
    }

    #[test]
    fn test_missing_member() {
        let store = cousins();
        assert_eq!(find(&store, 4, 99).unwrap_err(), GenealogyError::MemberNotFound(99));
        assert_eq!(find(&store, 98, 4).unwrap_err(), GenealogyError::MemberNotFound(98));
    }

    #[test]
    fn test_common_ancestor_beyond_depth_bound() {
        let store = chain(20);
        let oracle = AncestryOracle::new(&store).with_max_depth(5);
        let finder = RelationFinder::new(oracle, TreeBuilder::new(&store));
        assert_eq!(finder.find_relation(1, 20).unwrap(), Relation::Unrelated);
    }

    #[test]
    fn test_cancelled() {
        let store = cousins();
        let token = CancellationToken::new();
        token.cancel();
        let finder = RelationFinder::new(
            AncestryOracle::new(&store).with_cancellation(token.clone()),
            TreeBuilder::new(&store).with_cancellation(token),
        );
        assert_eq!(finder.find_relation(4, 5).unwrap_err(), GenealogyError::Cancelled);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Kinship::Ancestor { generations: 1 }.label(), "parent");
        assert_eq!(Kinship::Ancestor { generations: 2 }.label(), "grandparent");
        assert_eq!(Kinship::Ancestor { generations: 4 }.label(), "great-great-grandparent");
        assert_eq!(Kinship::Descendant { generations: 3 }.label(), "great-grandchild");
        assert_eq!(Kinship::PiblingOf { generations: 2 }.label(), "great-aunt or uncle");
        assert_eq!(Kinship::NiblingOf { generations: 2 }.label(), "grand-niece or grand-nephew");
        assert_eq!(
            Kinship::Cousin { degree: 2, removed: 1 }.to_string(),
            "second cousin once removed"
        );
        assert_eq!(
            Kinship::Cousin { degree: 11, removed: 3 }.label(),
            "11th cousin 3 times removed"
        );
        assert_eq!(Kinship::Cousin { degree: 22, removed: 0 }.label(), "22nd cousin");
    }

    #[test]
    fn test_from_distances() {
        assert_eq!(Kinship::from_distances(0, 0), Kinship::Same);
        assert_eq!(Kinship::from_distances(1, 1), Kinship::Sibling);
        assert_eq!(Kinship::from_distances(3, 3), Kinship::Cousin { degree: 2, removed: 0 });
        assert_eq!(Kinship::from_distances(2, 4), Kinship::Cousin { degree: 1, removed: 2 });
        assert!(Kinship::from_distances(2, 2).is_blood());
        assert!(!Kinship::Spouse.is_blood());
    }
}
