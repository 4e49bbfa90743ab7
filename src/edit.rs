use crate::{Alignment, Error, Result, Tree};
use derive_more::{Deref, From};
use itertools::Itertools;
use std::fmt::{self, Display};
use std::mem;

/// A single operation on a [Tree].
///
/// Indices refer to the preorder of the tree as it is right before the edit is applied.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Edit<L> {
    /// Replace the label of a node.
    Relabel { index: usize, label: L },

    /// Remove a node, splicing its children into its parent in its place.
    Delete { index: usize },

    /// Add a node as the child of `parent` at `position`, adopting the `children` siblings that
    /// used to start at `position`.
    ///
    /// A missing parent refers to the top level, i.e. the new node becomes a root.
    Insert {
        parent: Option<usize>,
        position: usize,
        label: L,
        children: usize,
    },
}

impl<L: Display> Display for Edit<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::Relabel { index, label } => write!(f, "rep({index}, {label})"),
            Edit::Delete { index } => write!(f, "del({index})"),
            Edit::Insert {
                parent: Some(parent),
                position,
                label,
                children,
            } => write!(f, "ins({parent}, {position}, {label}, {children})"),
            Edit::Insert {
                parent: None,
                position,
                label,
                children,
            } => write!(f, "ins(-, {position}, {label}, {children})"),
        }
    }
}

/// A sequence of [Edit]s, meant to be applied in order.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{Edit, EditScript, Tree};
///
/// let x = Tree::node('a', [Tree::leaf('b'), Tree::leaf('c')]);
/// let script = EditScript::from(vec![
///     Edit::Insert { parent: Some(0), position: 0, label: 'd', children: 1 },
///     Edit::Relabel { index: 2, label: 'e' },
/// ]);
///
/// assert_eq!(script.to_string(), "[ins(0, 0, d, 1), rep(2, e)]");
/// assert_eq!(script.apply(&x)?.to_string(), "a(d(e), c)");
/// # Ok::<(), tree_alignment::Error>(())
/// ```
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deref, From)]
pub struct EditScript<L>(#[deref(forward)] Vec<Edit<L>>);

impl<L: Display> Display for EditScript<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().format(", "))
    }
}

impl<L: Clone> EditScript<L> {
    /// Applies every [Edit] in order, returning the resulting tree and leaving `tree` untouched.
    pub fn apply(&self, tree: &Tree<L>) -> Result<Tree<L>> {
        let mut workspace = Workspace::new(tree);

        for (step, edit) in self.0.iter().enumerate() {
            workspace.apply(step, edit)?;
        }

        workspace.into_tree()
    }
}

impl<L> EditScript<L> {
    pub fn into_edits(self) -> Vec<Edit<L>> {
        self.0
    }
}

/// A mutable copy of a tree, possibly split into several trees while edits are underway.
///
/// Nodes are addressed by arena slots that never move; deleted nodes simply become unreachable.
struct Workspace<L> {
    labels: Vec<L>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl<L: Clone> Workspace<L> {
    fn new(tree: &Tree<L>) -> Self {
        Workspace {
            labels: tree.labels().to_vec(),
            parents: (0..tree.len()).map(|i| tree.parent(i)).collect(),
            children: (0..tree.len()).map(|i| tree.children(i).to_vec()).collect(),
            roots: if tree.is_empty() { Vec::new() } else { vec![0] },
        }
    }

    /// The arena slots of all reachable nodes in preorder.
    fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.labels.len());
        let mut stack: Vec<_> = self.roots.iter().rev().copied().collect();

        while let Some(slot) = stack.pop() {
            order.push(slot);
            stack.extend(self.children[slot].iter().rev());
        }

        order
    }

    fn resolve(&self, step: usize, index: usize) -> Result<usize> {
        let order = self.preorder();
        order.get(index).copied().ok_or(Error::MissingNode {
            step,
            index,
            len: order.len(),
        })
    }

    fn siblings(&mut self, parent: Option<usize>) -> &mut Vec<usize> {
        match parent {
            Some(p) => &mut self.children[p],
            None => &mut self.roots,
        }
    }

    fn apply(&mut self, step: usize, edit: &Edit<L>) -> Result<()> {
        match edit {
            Edit::Relabel { index, label } => {
                let slot = self.resolve(step, *index)?;
                self.labels[slot] = label.clone();
            }

            Edit::Delete { index } => {
                let slot = self.resolve(step, *index)?;
                let parent = self.parents[slot];
                let orphans = mem::take(&mut self.children[slot]);

                for &o in &orphans {
                    self.parents[o] = parent;
                }

                let siblings = self.siblings(parent);
                if let Some(position) = siblings.iter().position(|&s| s == slot) {
                    siblings.splice(position..=position, orphans);
                }
            }

            Edit::Insert {
                parent,
                position,
                label,
                children,
            } => {
                let parent = match parent {
                    Some(p) => Some(self.resolve(step, *p)?),
                    None => None,
                };

                let slot = self.labels.len();
                let (position, end) = (*position, position.saturating_add(*children));
                let siblings = self.siblings(parent);

                if end > siblings.len() {
                    return Err(Error::AdoptionOutOfRange {
                        step,
                        position,
                        end,
                        available: siblings.len(),
                    });
                }

                let adopted: Vec<_> = siblings.splice(position..end, [slot]).collect();
                for &a in &adopted {
                    self.parents[a] = Some(slot);
                }

                self.labels.push(label.clone());
                self.parents.push(parent);
                self.children.push(adopted);
            }
        }

        Ok(())
    }

    fn into_tree(self) -> Result<Tree<L>> {
        if self.roots.len() > 1 {
            return Err(Error::Forest {
                roots: self.roots.len(),
            });
        }

        let order = self.preorder();
        let mut remap = vec![0; self.labels.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }

        let children = order
            .iter()
            .map(|&old| self.children[old].iter().map(|&c| remap[c]).collect())
            .collect();

        let mut labels: Vec<_> = self.labels.into_iter().map(Some).collect();
        let labels = order.iter().filter_map(|&old| labels[old].take()).collect();

        Tree::new(labels, children)
    }
}

/// Converts an [Alignment] between `x` and `y` into an [EditScript] that turns `x` into `y`.
///
/// Relabelings come first, followed by deletions from the last node backwards, so that no
/// deletion shifts the nodes later ones refer to. Insertions come last, in preorder of `y`, each
/// placed relative to the nodes of `y` that are already present.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{alignment_to_script, backtrace, Tree, UnitCost};
///
/// let x = Tree::node('a', [Tree::node('b', [Tree::leaf('c'), Tree::leaf('d')]), Tree::leaf('e')]);
/// let y = Tree::node('a', [Tree::node('c', [Tree::leaf('d')])]);
///
/// let alignment = backtrace(&x, &y, &UnitCost)?;
/// let script = alignment_to_script(&alignment, &x, &y)?;
///
/// assert_eq!(script.to_string(), "[rep(1, c), del(4), del(2)]");
/// assert_eq!(script.apply(&x)?, y);
/// # Ok::<(), tree_alignment::Error>(())
/// ```
pub fn alignment_to_script<L>(
    alignment: &Alignment,
    x: &Tree<L>,
    y: &Tree<L>,
) -> Result<EditScript<L>>
where
    L: Clone + PartialEq,
{
    let invalid = |reason: String| Error::InvalidAlignment { reason };

    let mut left = vec![None; x.len()];
    let mut right = vec![None; y.len()];

    for pair in alignment.iter() {
        if pair.left.is_none() && pair.right.is_none() {
            return Err(invalid("a pair has neither side".into()));
        }

        if let Some(i) = pair.left {
            let slot = left
                .get_mut(i)
                .ok_or_else(|| invalid(format!("left-hand node {i} does not exist")))?;

            if slot.replace(pair.right).is_some() {
                return Err(invalid(format!("left-hand node {i} is aligned twice")));
            }
        }

        if let Some(j) = pair.right {
            let slot = right
                .get_mut(j)
                .ok_or_else(|| invalid(format!("right-hand node {j} does not exist")))?;

            if slot.replace(pair.left).is_some() {
                return Err(invalid(format!("right-hand node {j} is aligned twice")));
            }
        }
    }

    if let Some(i) = left.iter().position(Option::is_none) {
        return Err(invalid(format!("left-hand node {i} is not aligned")));
    }

    if let Some(j) = right.iter().position(Option::is_none) {
        return Err(invalid(format!("right-hand node {j} is not aligned")));
    }

    let matched_x: Vec<_> = left.iter().map(|p| matches!(p, Some(Some(_)))).collect();
    let matched_y: Vec<_> = right.iter().map(|p| matches!(p, Some(Some(_)))).collect();

    // Matched nodes must keep their relative order and their closest matched ancestors.
    let mut last: Option<usize> = None;
    for (i, partner) in left.iter().enumerate() {
        if let Some(Some(j)) = *partner {
            if last.is_some_and(|l| j <= l) {
                return Err(invalid(format!("the pair ({i}, {j}) crosses another pair")));
            }

            let a = closest_present_ancestor(x, &matched_x, i);
            let b = closest_present_ancestor(y, &matched_y, j);
            if a.and_then(|a| left[a].flatten()) != b {
                return Err(invalid(format!("the pair ({i}, {j}) breaks ancestry")));
            }

            last = Some(j);
        }
    }

    let mut edits = Vec::new();

    for (i, partner) in left.iter().enumerate() {
        if let Some(Some(j)) = *partner {
            if x.label(i) != y.label(j) {
                let label = y.label(j).clone();
                edits.push(Edit::Relabel { index: i, label });
            }
        }
    }

    for (i, partner) in left.iter().enumerate().rev() {
        if let Some(None) = partner {
            edits.push(Edit::Delete { index: i });
        }
    }

    // After the deletions, the tree is `y` restricted to the matched nodes.
    let mut present = matched_y;

    for k in 0..y.len() {
        if present[k] {
            continue;
        }

        // Every ancestor of `k` precedes it in preorder, so it is present by now.
        let parent = y.parent(k);
        let scope = match parent {
            Some(p) => p + 1..p + y.subtree_size(p),
            None => 0..y.len(),
        };

        let end = k + y.subtree_size(k);
        let (mut position, mut children) = (0, 0);
        for s in scope.filter(|&s| present[s]) {
            if closest_present_ancestor(y, &present, s) == parent {
                if s < k {
                    position += 1;
                } else if s < end {
                    children += 1;
                }
            }
        }

        edits.push(Edit::Insert {
            parent: parent.map(|p| present[..p].iter().filter(|&&b| b).count()),
            position,
            label: y.label(k).clone(),
            children,
        });

        present[k] = true;
    }

    Ok(edits.into())
}

fn closest_present_ancestor<L>(t: &Tree<L>, present: &[bool], mut node: usize) -> Option<usize> {
    while let Some(p) = t.parent(node) {
        if present[p] {
            return Some(p);
        }

        node = p;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backtrace, example, Letter, Pair, UnitCost};
    use assert_matches::assert_matches;
    use test_strategy::proptest;

    fn weighted(a: Option<&Letter>, b: Option<&Letter>) -> f64 {
        match (a, b) {
            (Some(a), Some(b)) if a == b => 0.,
            (Some(Letter::A), Some(_)) => f64::INFINITY,
            (Some(_), Some(_)) => 1.2,
            (None, Some(_)) => 0.8,
            _ => 1.,
        }
    }

    fn abc() -> Tree<char> {
        Tree::node('a', [Tree::leaf('b'), Tree::leaf('c')])
    }

    #[test]
    fn relabeling_a_node() {
        let script = EditScript::from(vec![Edit::Relabel { index: 1, label: 'd' }]);
        assert_eq!(script.apply(&abc()).unwrap().to_string(), "a(d, c)");
    }

    #[test]
    fn inserting_a_node_adopting_a_child() {
        let script = EditScript::from(vec![Edit::Insert {
            parent: Some(0),
            position: 0,
            label: 'd',
            children: 1,
        }]);

        assert_eq!(script.apply(&abc()).unwrap().to_string(), "a(d(b), c)");
    }

    #[test]
    fn deleting_a_node_hands_its_children_to_its_parent() {
        let x = Tree::node('a', [Tree::node('d', [Tree::leaf('b')]), Tree::leaf('c')]);
        let script = EditScript::from(vec![Edit::Delete { index: 1 }]);
        assert_eq!(script.apply(&x), Ok(abc()));
    }

    #[test]
    fn inserting_a_new_root() {
        let script = EditScript::from(vec![Edit::Insert {
            parent: None,
            position: 0,
            label: 'r',
            children: 1,
        }]);

        assert_eq!(script.to_string(), "[ins(-, 0, r, 1)]");
        assert_eq!(script.apply(&abc()).unwrap().to_string(), "r(a(b, c))");
    }

    #[test]
    fn inserting_into_the_empty_tree() {
        let script = EditScript::from(vec![Edit::Insert {
            parent: None,
            position: 0,
            label: 'r',
            children: 0,
        }]);

        assert_eq!(script.apply(&Tree::empty()), Ok(Tree::leaf('r')));
    }

    #[test]
    fn applying_leaves_the_input_untouched() {
        let x = abc();
        let script = EditScript::from(vec![Edit::Delete { index: 2 }]);
        assert_eq!(script.apply(&x).unwrap().to_string(), "a(b)");
        assert_eq!(x, abc());
    }

    #[test]
    fn stale_indices_are_rejected() {
        let script = EditScript::from(vec![
            Edit::Delete { index: 1 },
            Edit::Delete { index: 2 },
        ]);

        assert_matches!(
            script.apply(&abc()),
            Err(Error::MissingNode {
                step: 1,
                index: 2,
                len: 2
            })
        );
    }

    #[test]
    fn adopting_too_many_children_is_rejected() {
        let script = EditScript::from(vec![Edit::Insert {
            parent: Some(0),
            position: 1,
            label: 'd',
            children: 2,
        }]);

        assert_matches!(
            script.apply(&abc()),
            Err(Error::AdoptionOutOfRange {
                step: 0,
                position: 1,
                end: 3,
                available: 2
            })
        );
    }

    #[test]
    fn adopting_past_the_end_of_the_address_space_is_rejected() {
        let script = EditScript::from(vec![Edit::Insert {
            parent: Some(0),
            position: usize::MAX,
            label: 'd',
            children: 1,
        }]);

        assert_matches!(
            script.apply(&Tree::node('a', [Tree::leaf('b')])),
            Err(Error::AdoptionOutOfRange {
                step: 0,
                position: usize::MAX,
                end: usize::MAX,
                available: 1
            })
        );
    }

    #[test]
    fn deleting_a_root_with_several_children_leaves_a_forest() {
        let script = EditScript::from(vec![Edit::Delete { index: 0 }]);
        assert_matches!(script.apply(&abc()), Err(Error::Forest { roots: 2 }));
    }

    #[test]
    fn script_of_the_example() {
        let (x, y) = example();
        let alignment = backtrace(&x, &y, &UnitCost).unwrap();
        let script = alignment_to_script(&alignment, &x, &y).unwrap();

        assert_eq!(script.to_string(), "[rep(1, c), del(4), del(2)]");
        assert_eq!(script.apply(&x), Ok(y));
    }

    #[test]
    fn insertions_wrap_existing_subtrees() {
        let x = Tree::node('a', [Tree::leaf('b'), Tree::leaf('c'), Tree::leaf('d')]);
        let e = Tree::node('e', [Tree::leaf('c'), Tree::leaf('d')]);
        let y = Tree::node('r', [Tree::node('a', [Tree::leaf('b'), e])]);

        let alignment = backtrace(&x, &y, &UnitCost).unwrap();
        let script = alignment_to_script(&alignment, &x, &y).unwrap();

        assert_eq!(script.to_string(), "[ins(-, 0, r, 1), ins(1, 1, e, 2)]");
        assert_eq!(script.apply(&x), Ok(y));
    }

    #[test]
    fn incomplete_alignments_are_rejected() {
        let (x, y) = example();
        let alignment = Alignment::new(vec![Pair::matched(0, 0, 0.)], 0.);
        assert_matches!(
            alignment_to_script(&alignment, &x, &y),
            Err(Error::InvalidAlignment { .. })
        );

        let alignment = Alignment::new(vec![Pair::matched(0, 0, 0.), Pair::deleted(0, 1.)], 1.);
        assert_matches!(
            alignment_to_script(&alignment, &x, &y),
            Err(Error::InvalidAlignment { .. })
        );
    }

    #[test]
    fn swapping_siblings_is_rejected() {
        let y = Tree::node('a', [Tree::leaf('c'), Tree::leaf('b')]);
        let alignment = Alignment::new(
            vec![
                Pair::matched(2, 1, 0.),
                Pair::matched(1, 2, 0.),
                Pair::matched(0, 0, 0.),
            ],
            0.,
        );

        assert_matches!(
            alignment_to_script(&alignment, &abc(), &y),
            Err(Error::InvalidAlignment { .. })
        );
    }

    #[test]
    fn flattening_ancestry_is_rejected() {
        let x = Tree::node('a', [Tree::node('b', [Tree::leaf('c')])]);
        let y = Tree::node('a', [Tree::leaf('b'), Tree::leaf('c')]);
        let alignment = Alignment::new(
            vec![
                Pair::matched(2, 2, 0.),
                Pair::matched(1, 1, 0.),
                Pair::matched(0, 0, 0.),
            ],
            0.,
        );

        assert_matches!(
            alignment_to_script(&alignment, &x, &y),
            Err(Error::InvalidAlignment { .. })
        );
    }

    #[proptest]
    fn applying_the_script_yields_the_right_hand_side(x: Tree<Letter>, y: Tree<Letter>) {
        let alignment = backtrace(&x, &y, &weighted).unwrap();
        let script = alignment.to_script(&x, &y).unwrap();
        assert_eq!(script.apply(&x), Ok(y));
    }

    #[proptest]
    fn applying_the_script_from_or_to_the_empty_tree(t: Tree<Letter>) {
        let empty = Tree::empty();

        let alignment = backtrace(&empty, &t, &UnitCost).unwrap();
        let script = alignment.to_script(&empty, &t).unwrap();
        assert_eq!(script.len(), t.len());
        assert_eq!(script.apply(&empty), Ok(t.clone()));

        let alignment = backtrace(&t, &empty, &UnitCost).unwrap();
        let script = alignment.to_script(&t, &empty).unwrap();
        assert_eq!(script.apply(&t), Ok(empty));
    }

    #[proptest]
    fn under_unit_cost_the_script_is_as_long_as_the_distance(x: Tree<Letter>, y: Tree<Letter>) {
        let alignment = backtrace(&x, &y, &UnitCost).unwrap();
        let script = alignment.to_script(&x, &y).unwrap();
        assert_eq!(script.len() as f64, alignment.cost());
    }
}
