use crate::{Error, Result};
use itertools::Itertools;
use std::fmt::{self, Display};

/// An ordered tree whose nodes carry labels of type `L`.
///
/// Nodes are identified by their index in preorder, the root being `0`. Labels may repeat, node
/// identity is positional.
///
/// # Example
///
/// ```rust
/// use tree_alignment::Tree;
///
/// let t = Tree::new(vec!['a', 'b', 'c'], vec![vec![1, 2], vec![], vec![]])?;
/// assert_eq!(t, Tree::node('a', [Tree::leaf('b'), Tree::leaf('c')]));
/// assert_eq!(t.to_string(), "a(b, c)");
/// # Ok::<(), tree_alignment::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tree<L> {
    labels: Vec<L>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    sizes: Vec<usize>,
    leftmost: Vec<usize>,
}

impl<L> Default for Tree<L> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<L> Tree<L> {
    /// Builds a [Tree] from labels in preorder and the ordered children of every node.
    pub fn new(labels: Vec<L>, children: Vec<Vec<usize>>) -> Result<Self> {
        let n = labels.len();

        if children.len() != n {
            return Err(Error::Arity {
                nodes: n,
                lists: children.len(),
            });
        }

        let mut parents = vec![None; n];
        for (node, kids) in children.iter().enumerate() {
            for &child in kids {
                if child >= n {
                    return Err(Error::DanglingChild { node, child });
                } else if child == 0 {
                    return Err(Error::Cycle { node });
                } else if parents[child].replace(node).is_some() {
                    return Err(Error::MultipleParents { child });
                }
            }
        }

        // Every reachable node has a single parent and the root has none, so this terminates.
        let mut expected = 0;
        let mut stack = if n > 0 { vec![0] } else { Vec::new() };
        while let Some(found) = stack.pop() {
            if found != expected {
                return Err(Error::NotPreorder { expected, found });
            }

            expected += 1;
            stack.extend(children[found].iter().rev());
        }

        if expected < n {
            return Err(Error::Unreachable { node: expected });
        }

        Ok(Self::derive(labels, children, parents))
    }

    /// The tree without any nodes.
    pub fn empty() -> Self {
        Self::derive(Vec::new(), Vec::new(), Vec::new())
    }

    /// A tree made of a single node.
    pub fn leaf(label: L) -> Self {
        Self::derive(vec![label], vec![Vec::new()], vec![None])
    }

    /// A tree whose root is labeled `label` and whose children are the roots of `subtrees`.
    ///
    /// Empty subtrees are skipped.
    pub fn node<I: IntoIterator<Item = Self>>(label: L, subtrees: I) -> Self {
        let mut labels = vec![label];
        let mut children = vec![Vec::new()];
        let mut parents = vec![None];

        for subtree in subtrees {
            let offset = labels.len();
            if subtree.is_empty() {
                continue;
            }

            children[0].push(offset);
            parents.extend(
                subtree
                    .parents
                    .iter()
                    .map(|p| Some(p.map_or(0, |p| p + offset))),
            );
            children.extend(
                subtree
                    .children
                    .into_iter()
                    .map(|kids| kids.into_iter().map(|c| c + offset).collect()),
            );
            labels.extend(subtree.labels);
        }

        Self::derive(labels, children, parents)
    }

    fn derive(labels: Vec<L>, children: Vec<Vec<usize>>, parents: Vec<Option<usize>>) -> Self {
        let n = labels.len();
        let mut sizes = vec![1; n];
        let mut leftmost: Vec<usize> = (0..n).collect();

        // Children always come after their parent in preorder.
        for i in (0..n).rev() {
            sizes[i] += children[i].iter().map(|&c| sizes[c]).sum::<usize>();
            if let Some(&first) = children[i].first() {
                leftmost[i] = leftmost[first];
            }
        }

        Tree {
            labels,
            children,
            parents,
            sizes,
            leftmost,
        }
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether this is the empty tree.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The labels of all nodes in preorder.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// The label of node `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn label(&self, i: usize) -> &L {
        &self.labels[i]
    }

    /// The children of node `i`, from left to right.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn children(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    /// The parent of node `i`, unless `i` is the root.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn parent(&self, i: usize) -> Option<usize> {
        self.parents[i]
    }

    /// The number of nodes in the subtree rooted at `i`, including `i` itself.
    ///
    /// The subtree spans the preorder indices `i..i + subtree_size(i)`.
    pub fn subtree_size(&self, i: usize) -> usize {
        self.sizes[i]
    }

    /// The leaf reached from `i` by always descending into the first child.
    pub fn leftmost_leaf(&self, i: usize) -> usize {
        self.leftmost[i]
    }

    /// Whether `i` is the root or any but the first child of its parent.
    pub fn is_keyroot(&self, i: usize) -> bool {
        match self.parents[i] {
            None => true,
            Some(p) => self.children[p][0] != i,
        }
    }

    /// All keyroots in preorder.
    pub fn keyroots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&i| self.is_keyroot(i))
    }
}

impl<L: Display> Display for Tree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Token {
            Open { node: usize, first: bool },
            Close,
        }

        let mut stack = Vec::new();
        if !self.is_empty() {
            stack.push(Token::Open {
                node: 0,
                first: true,
            });
        }

        while let Some(token) = stack.pop() {
            match token {
                Token::Close => f.write_str(")")?,
                Token::Open { node, first } => {
                    if !first {
                        f.write_str(", ")?;
                    }

                    write!(f, "{}", self.labels[node])?;
                    if let Some((&head, tail)) = self.children[node].split_first() {
                        f.write_str("(")?;
                        stack.push(Token::Close);
                        stack.extend(tail.iter().rev().map(|&c| Token::Open {
                            node: c,
                            first: false,
                        }));
                        stack.push(Token::Open {
                            node: head,
                            first: true,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// The postorder view of a [Tree] the forest distance is computed on.
///
/// Positions are postorder numbers, so every subtree is the contiguous range
/// `leftmost[i]..=i`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Postorder {
    /// Maps postorder positions to preorder indices.
    pub(crate) nodes: Box<[usize]>,
    pub(crate) leftmost: Box<[usize]>,
    /// Sorted in increasing postorder.
    pub(crate) keyroots: Box<[usize]>,
}

impl Postorder {
    pub(crate) fn new<L>(tree: &Tree<L>) -> Self {
        let n = tree.len();
        let mut depth = vec![0; n];
        let mut position = vec![0; n];
        let mut nodes = vec![0; n];

        for i in 0..n {
            if let Some(p) = tree.parent(i) {
                depth[i] = depth[p] + 1;
            }

            // Nodes before `i` in postorder are its proper descendants plus the nodes preceding
            // it in preorder that are not its ancestors.
            position[i] = i - depth[i] + tree.subtree_size(i) - 1;
            nodes[position[i]] = i;
        }

        let leftmost = nodes
            .iter()
            .map(|&i| position[tree.leftmost_leaf(i)])
            .collect();

        let keyroots = tree.keyroots().map(|i| position[i]).sorted().collect();

        Postorder {
            nodes: nodes.into(),
            leftmost,
            keyroots,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}


#[cfg(test)]
pub(crate) use tests::{example, Letter, Size};
