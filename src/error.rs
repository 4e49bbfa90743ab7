use thiserror::Error;

/// Shorthand for results whose error is this crate's [Error].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while building trees, computing distances or applying edits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The number of child lists differs from the number of labels.
    #[error("expected {nodes} child lists, found {lists}")]
    Arity { nodes: usize, lists: usize },

    /// A child index points past the end of the tree.
    #[error("node {node} refers to child {child}, which does not exist")]
    DanglingChild { node: usize, child: usize },

    /// A node is listed as the child of more than one parent.
    #[error("node {child} is claimed by more than one parent")]
    MultipleParents { child: usize },

    /// The root is listed as somebody's child.
    #[error("the root is listed as a child of node {node}")]
    Cycle { node: usize },

    /// A node cannot be reached from the root.
    #[error("node {node} is not reachable from the root")]
    Unreachable { node: usize },

    /// The node indices do not follow the preorder of the adjacency.
    #[error("expected node {expected} in preorder, found node {found}")]
    NotPreorder { expected: usize, found: usize },

    /// The cost function returned a negative value or NaN.
    #[error("cost {cost} of aligning {left:?} with {right:?} is not a non-negative number")]
    NegativeCost {
        cost: f64,
        left: Option<usize>,
        right: Option<usize>,
    },

    /// The dynamic programming table would exceed the configured limit.
    #[error("comparing these trees requires {cells} table cells, the limit is {limit}")]
    TooLarge { cells: usize, limit: usize },

    /// The backtrace could not reproduce a value of the forest distance table.
    #[error("no co-optimal edit reproduces the forest distance at ({left}, {right})")]
    Inconsistent { left: usize, right: usize },

    /// The alignment does not cover both trees exactly once.
    #[error("invalid alignment: {reason}")]
    InvalidAlignment { reason: String },

    /// An edit refers to a node that does not exist at the time it is applied.
    #[error("edit #{step} refers to node {index}, but the tree has {len} nodes")]
    MissingNode {
        step: usize,
        index: usize,
        len: usize,
    },

    /// An insertion adopts more children than its parent has.
    #[error("edit #{step} adopts children {position}..{end}, but the parent has {available}")]
    AdoptionOutOfRange {
        step: usize,
        position: usize,
        end: usize,
        available: usize,
    },

    /// Applying the edits left more than one root behind.
    #[error("the edits produce a forest of {roots} trees")]
    Forest { roots: usize },
}
