use crate::{Delta, Result, Ted, Tree};
use rayon::prelude::*;

impl Ted {
    /// Computes the distance between every tree of `xs` and every tree of `ys` in parallel.
    ///
    /// Entry `[a][b]` of the result is the distance between `xs[a]` and `ys[b]`. The first error
    /// encountered, if any, is returned instead.
    pub fn pairwise<L, D>(
        &self,
        xs: &[Tree<L>],
        ys: &[Tree<L>],
        delta: &D,
    ) -> Result<Vec<Vec<f64>>>
    where
        L: Sync,
        D: Delta<L> + ?Sized,
    {
        let _span = tracing::debug_span!("pairwise", m = xs.len(), n = ys.len()).entered();

        xs.par_iter()
            .map(|x| {
                ys.par_iter()
                    .map(|y| self.distance(x, y, delta))
                    .collect::<Result<_>>()
            })
            .collect()
    }
}

/// Computes the distance between every tree of `xs` and every tree of `ys` in parallel.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{pairwise_distances, Tree, UnitCost};
///
/// let trees = [Tree::leaf('a'), Tree::node('a', [Tree::leaf('b')]), Tree::empty()];
/// let distances = pairwise_distances(&trees, &trees, &UnitCost)?;
///
/// assert_eq!(distances[0], [0., 1., 1.]);
/// assert_eq!(distances[1], [1., 0., 2.]);
/// assert_eq!(distances[2], [1., 2., 0.]);
/// # Ok::<(), tree_alignment::Error>(())
/// ```
pub fn pairwise_distances<L, D>(
    xs: &[Tree<L>],
    ys: &[Tree<L>],
    delta: &D,
) -> Result<Vec<Vec<f64>>>
where
    L: Sync,
    D: Delta<L> + ?Sized,
{
    Ted::default().pairwise(xs, ys, delta)
}
