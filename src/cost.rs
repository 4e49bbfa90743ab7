use crate::{Error, Result};
use rayon::prelude::*;

/// A measure for the cost of aligning two nodes.
///
/// `None` stands for the absent counterpart: `cost(Some(a), None)` is the cost of deleting `a`,
/// `cost(None, Some(b))` the cost of inserting `b`. `cost(None, None)` is never asked for.
///
/// Costs must be non-negative. [f64::INFINITY] forbids the corresponding alignment. Since partial
/// results are cached and computed in parallel, implementations must be pure.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{distance, Tree};
///
/// // Relabeling is forbidden, so nodes may only be deleted and inserted.
/// fn strict(a: Option<&char>, b: Option<&char>) -> f64 {
///     match (a, b) {
///         (Some(a), Some(b)) if a != b => f64::INFINITY,
///         (Some(_), Some(_)) => 0.,
///         _ => 1.,
///     }
/// }
///
/// let x = Tree::node('a', [Tree::leaf('b')]);
/// let y = Tree::node('a', [Tree::leaf('c')]);
/// assert_eq!(distance(&x, &y, &strict)?, 2.);
/// # Ok::<(), tree_alignment::Error>(())
/// ```
pub trait Delta<L: ?Sized>: Sync {
    /// Returns the cost of aligning `a` with `b`.
    fn cost(&self, a: Option<&L>, b: Option<&L>) -> f64;
}

impl<L: ?Sized, F> Delta<L> for F
where
    F: Fn(Option<&L>, Option<&L>) -> f64 + Sync,
{
    #[inline]
    fn cost(&self, a: Option<&L>, b: Option<&L>) -> f64 {
        self(a, b)
    }
}

/// The default [Delta]: every insertion, deletion and relabeling to a different label costs `1`.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UnitCost;

impl<L: ?Sized + PartialEq> Delta<L> for UnitCost {
    #[inline]
    fn cost(&self, a: Option<&L>, b: Option<&L>) -> f64 {
        match (a, b) {
            (Some(a), Some(b)) if a == b => 0.,
            _ => 1.,
        }
    }
}

fn check(cost: f64, left: Option<usize>, right: Option<usize>) -> Result<f64> {
    // Also rejects NaN. Adding zero turns `-0.` into `0.`.
    if cost >= 0. {
        Ok(cost + 0.)
    } else {
        Err(Error::NegativeCost { cost, left, right })
    }
}

/// Every cost a comparison between two label sequences may ask for, computed up front.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CostMatrix {
    rep: Box<[f64]>,
    del: Box<[f64]>,
    ins: Box<[f64]>,
    cols: usize,
}

impl CostMatrix {
    pub(crate) fn new<L: Sync, D: Delta<L> + ?Sized>(x: &[L], y: &[L], delta: &D) -> Result<Self> {
        let cols = y.len();

        let rep = (0..x.len() * cols)
            .into_par_iter()
            .map(|k| {
                let (i, j) = (k / cols, k % cols);
                check(delta.cost(Some(&x[i]), Some(&y[j])), Some(i), Some(j))
            })
            .collect::<Result<_>>()?;

        let del = x
            .iter()
            .enumerate()
            .map(|(i, a)| check(delta.cost(Some(a), None), Some(i), None))
            .collect::<Result<_>>()?;

        let ins = y
            .iter()
            .enumerate()
            .map(|(j, b)| check(delta.cost(None, Some(b)), None, Some(j)))
            .collect::<Result<_>>()?;

        Ok(CostMatrix {
            rep,
            del,
            ins,
            cols,
        })
    }

    /// Reorders rows and columns, so that row `i` of the result is row `rows[i]` of `self`.
    pub(crate) fn permute(&self, rows: &[usize], cols: &[usize]) -> Self {
        CostMatrix {
            rep: rows
                .iter()
                .flat_map(|&i| cols.iter().map(move |&j| self.rep(i, j)))
                .collect(),
            del: rows.iter().map(|&i| self.del[i]).collect(),
            ins: cols.iter().map(|&j| self.ins[j]).collect(),
            cols: cols.len(),
        }
    }

    #[inline]
    pub(crate) fn rep(&self, i: usize, j: usize) -> f64 {
        self.rep[i * self.cols + j]
    }

    #[inline]
    pub(crate) fn del(&self, i: usize) -> f64 {
        self.del[i]
    }

    #[inline]
    pub(crate) fn ins(&self, j: usize) -> f64 {
        self.ins[j]
    }

    pub(crate) fn deletions(&self) -> &[f64] {
        &self.del
    }

    pub(crate) fn insertions(&self) -> &[f64] {
        &self.ins
    }
}
