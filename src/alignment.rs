use crate::{alignment_to_script, Delta, EditScript, Result, Tree};
use derive_more::Deref;
use itertools::Itertools;
use std::fmt::Display;

/// A correspondence between a node of the left-hand side and a node of the right-hand side.
///
/// Either side may be absent: `(Some(i), None)` deletes `i`, `(None, Some(j))` inserts `j`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pair {
    pub left: Option<usize>,
    pub right: Option<usize>,

    /// What the cost function charges for this pair.
    pub cost: f64,
}

impl Pair {
    pub fn matched(left: usize, right: usize, cost: f64) -> Self {
        Pair {
            left: Some(left),
            right: Some(right),
            cost,
        }
    }

    pub fn deleted(left: usize, cost: f64) -> Self {
        Pair {
            left: Some(left),
            right: None,
            cost,
        }
    }

    pub fn inserted(right: usize, cost: f64) -> Self {
        Pair {
            left: None,
            right: Some(right),
            cost,
        }
    }

    fn render<L: Display>(&self, x: &[L], y: &[L]) -> String {
        fn side<L: Display>(nodes: &[L], i: Option<usize>) -> String {
            match i.and_then(|i| Some((i, nodes.get(i)?))) {
                Some((i, label)) => format!("{label} [{i}]"),
                None => match i {
                    Some(i) => format!("? [{i}]"),
                    None => "-".into(),
                },
            }
        }

        format!("{} vs. {}", side(x, self.left), side(y, self.right))
    }
}

/// A co-optimal alignment between the nodes of two sequences or trees, along with its total cost.
///
/// Every node of either side appears in exactly one [Pair]. Tree alignments never cross: matched
/// pairs preserve ancestry and the left-to-right order of siblings. Pairs are listed in postorder
/// of both sides, i.e. every node comes after its descendants and before its right siblings.
#[derive(Debug, Clone, PartialEq, Deref)]
pub struct Alignment {
    #[deref(forward)]
    pairs: Vec<Pair>,
    cost: f64,
}

impl Alignment {
    pub fn new(pairs: Vec<Pair>, cost: f64) -> Self {
        Alignment { pairs, cost }
    }

    /// The total cost of this alignment, which is the distance between both sides.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Whether this alignment is admissible, i.e. its cost is finite.
    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite()
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }

    /// Renders one line per [Pair], labeling nodes with `x` and `y`.
    ///
    /// ```rust
    /// use tree_alignment::{Alignment, Pair};
    ///
    /// let alignment = Alignment::new(vec![Pair::deleted(0, 1.), Pair::matched(1, 0, 0.)], 1.);
    /// assert_eq!(alignment.render(&['a', 'b'], &['b']), "a [0] vs. -\nb [1] vs. b [0]");
    /// ```
    pub fn render<L: Display>(&self, x: &[L], y: &[L]) -> String {
        self.pairs.iter().map(|p| p.render(x, y)).join("\n")
    }

    /// Like [render][Alignment::render], but appends what `delta` charges for each [Pair].
    pub fn render_with<L, D>(&self, x: &[L], y: &[L], delta: &D) -> String
    where
        L: Display,
        D: Delta<L> + ?Sized,
    {
        self.pairs
            .iter()
            .map(|p| {
                let a = p.left.and_then(|i| x.get(i));
                let b = p.right.and_then(|j| y.get(j));
                format!("{}: {}", p.render(x, y), delta.cost(a, b))
            })
            .join("\n")
    }

    /// Converts this alignment between `x` and `y` into an [EditScript] that turns `x` into `y`.
    pub fn to_script<L>(&self, x: &Tree<L>, y: &Tree<L>) -> Result<EditScript<L>>
    where
        L: Clone + PartialEq,
    {
        alignment_to_script(self, x, y)
    }
}
