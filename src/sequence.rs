//! Alignment of flat label sequences under an arbitrary [Delta].
//!
//! With [UnitCost][crate::UnitCost] this is the [Levenshtein distance][levenshtein].
//!
//! [levenshtein]: https://en.wikipedia.org/wiki/Levenshtein_distance

use crate::{approx_eq, Alignment, CostMatrix, Delta, Error, Pair, Result, TOLERANCE};
use arrayvec::ArrayVec;
use derive_more::{Add, From};
use pathfinding::{num_traits::Zero, prelude::*};
use std::{cmp::Ordering, collections::HashMap};

#[derive(Debug, Default, Copy, Clone, From, Add)]
struct Weight(f64);

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Weight {}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Zero for Weight {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// The cheapest way to reach every cell of the edit grid, where cell `(i, j)` stands for having
/// consumed the first `i` labels of `x` and the first `j` labels of `y`.
struct Grid {
    costs: CostMatrix,
    reached: HashMap<(usize, usize), ((usize, usize), Weight)>,
    end: (usize, usize),
}

impl Grid {
    fn new<L, D>(x: &[L], y: &[L], delta: &D) -> Result<Self>
    where
        L: Sync,
        D: Delta<L> + ?Sized,
    {
        let costs = CostMatrix::new(x, y, delta)?;
        let (m, n) = (x.len(), y.len());

        let reached = dijkstra_all(&(0, 0), |&(i, j)| {
            let mut successors = ArrayVec::<_, 3>::new();

            if i < m && j < n {
                successors.push(((i + 1, j + 1), costs.rep(i, j)));
            }

            if i < m {
                successors.push(((i + 1, j), costs.del(i)));
            }

            if j < n {
                successors.push(((i, j + 1), costs.ins(j)));
            }

            // Forbidden steps are not edges at all.
            successors.retain(|(_, c)| c.is_finite());
            successors.into_iter().map(|(next, c)| (next, Weight(c)))
        })
        .into_iter()
        .collect();

        Ok(Grid {
            costs,
            reached,
            end: (m, n),
        })
    }

    fn cost_to(&self, cell: (usize, usize)) -> f64 {
        if cell == (0, 0) {
            return 0.;
        }

        self.reached
            .get(&cell)
            .map_or(f64::INFINITY, |&(_, Weight(c))| c)
    }

    /// The ways into cell `(i, j)`, in order of preference among co-optimal ones.
    fn options(&self, (i, j): (usize, usize)) -> ArrayVec<((usize, usize), Pair), 3> {
        let mut options = ArrayVec::new();

        if i > 0 && j > 0 {
            let pair = Pair::matched(i - 1, j - 1, self.costs.rep(i - 1, j - 1));
            options.push(((i - 1, j - 1), pair));
        }

        if i > 0 {
            options.push(((i - 1, j), Pair::deleted(i - 1, self.costs.del(i - 1))));
        }

        if j > 0 {
            options.push(((i, j - 1), Pair::inserted(j - 1, self.costs.ins(j - 1))));
        }

        options
    }
}

/// Finds the lowest total cost of the edits that transform `x` into `y`.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{sequence, UnitCost};
///
/// let x: Vec<_> = "kitten".chars().collect();
/// let y: Vec<_> = "sitting".chars().collect();
/// assert_eq!(sequence::distance(&x, &y, &UnitCost)?, 3.);
/// # Ok::<(), tree_alignment::Error>(())
/// ```
pub fn distance<L, D>(x: &[L], y: &[L], delta: &D) -> Result<f64>
where
    L: Sync,
    D: Delta<L> + ?Sized,
{
    let grid = Grid::new(x, y, delta)?;
    Ok(grid.cost_to(grid.end))
}

/// Finds a co-optimal [Alignment] between `x` and `y`.
///
/// Pairs are listed from left to right. Walking back from the last labels, aligning both is
/// preferred to deleting from `x`, which is preferred to inserting from `y`, among edits whose
/// costs agree within [TOLERANCE]. If no alignment is feasible, the result deletes every label of
/// `x` and then inserts every label of `y`.
pub fn backtrace<L, D>(x: &[L], y: &[L], delta: &D) -> Result<Alignment>
where
    L: Sync,
    D: Delta<L> + ?Sized,
{
    let grid = Grid::new(x, y, delta)?;
    let distance = grid.cost_to(grid.end);

    if distance.is_infinite() {
        let deletions = (0..x.len()).map(|i| Pair::deleted(i, grid.costs.del(i)));
        let insertions = (0..y.len()).map(|j| Pair::inserted(j, grid.costs.ins(j)));
        return Ok(Alignment::new(deletions.chain(insertions).collect(), distance));
    }

    let mut pairs = Vec::with_capacity(x.len() + y.len());
    let mut cell = grid.end;

    while cell != (0, 0) {
        let target = grid.cost_to(cell);
        let (prev, pair) = grid
            .options(cell)
            .into_iter()
            .find(|&(prev, pair)| approx_eq(grid.cost_to(prev) + pair.cost, target, TOLERANCE))
            .ok_or(Error::Inconsistent {
                left: cell.0.saturating_sub(1),
                right: cell.1.saturating_sub(1),
            })?;

        pairs.push(pair);
        cell = prev;
    }

    pairs.reverse();
    Ok(Alignment::new(pairs, distance))
}
