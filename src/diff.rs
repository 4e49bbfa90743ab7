use crate::{align, Alignment, Config, Delta, Error, ForestDistance, Result, Tree};

/// The tree edit distance engine.
///
/// The free functions [distance] and [backtrace] use the default [Config].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Ted {
    config: Config,
}

impl Ted {
    pub fn new(config: Config) -> Self {
        Ted { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn tables<L, D>(&self, x: &Tree<L>, y: &Tree<L>, delta: &D) -> Result<ForestDistance>
    where
        L: Sync,
        D: Delta<L> + ?Sized,
    {
        let cells = x.len() * y.len();

        if let Some(limit) = self.config.max_cells {
            if cells > limit {
                return Err(Error::TooLarge { cells, limit });
            }
        }

        if cells > self.config.warn_cells {
            tracing::warn!(cells, m = x.len(), n = y.len(), "large tree edit distance table");
        }

        ForestDistance::new(x, y, delta)
    }

    /// Finds the lowest total cost of the edits that transform `x` into `y`.
    ///
    /// The distance is [f64::INFINITY] if `delta` forbids every way of doing so.
    pub fn distance<L, D>(&self, x: &Tree<L>, y: &Tree<L>, delta: &D) -> Result<f64>
    where
        L: Sync,
        D: Delta<L> + ?Sized,
    {
        let _span = tracing::debug_span!("distance", m = x.len(), n = y.len()).entered();
        let d = self.tables(x, y, delta)?.distance();
        tracing::debug!(distance = d);
        Ok(d)
    }

    /// Finds a co-optimal [Alignment] between the nodes of `x` and `y`.
    ///
    /// Ties between co-optimal edits are broken deterministically, so the same inputs always
    /// produce the same alignment.
    pub fn backtrace<L, D>(&self, x: &Tree<L>, y: &Tree<L>, delta: &D) -> Result<Alignment>
    where
        L: Sync,
        D: Delta<L> + ?Sized,
    {
        let _span = tracing::debug_span!("backtrace", m = x.len(), n = y.len()).entered();
        let fd = self.tables(x, y, delta)?;
        let alignment = align(&fd, self.config.tolerance)?;
        tracing::debug!(distance = alignment.cost(), pairs = alignment.len());
        Ok(alignment)
    }
}

/// Finds the lowest total cost of the edits that transform `x` into `y`.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{distance, Tree, UnitCost};
///
/// let x = Tree::node('a', [Tree::node('b', [Tree::leaf('c'), Tree::leaf('d')]), Tree::leaf('e')]);
/// let y = Tree::node('a', [Tree::node('c', [Tree::leaf('d')])]);
///
/// assert_eq!(distance(&x, &y, &UnitCost)?, 3.);
/// # Ok::<(), tree_alignment::Error>(())
/// ```
pub fn distance<L, D>(x: &Tree<L>, y: &Tree<L>, delta: &D) -> Result<f64>
where
    L: Sync,
    D: Delta<L> + ?Sized,
{
    Ted::default().distance(x, y, delta)
}

/// Finds a co-optimal [Alignment] between the nodes of `x` and `y`.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{backtrace, Tree, UnitCost};
///
/// let x = Tree::node('a', [Tree::node('b', [Tree::leaf('c'), Tree::leaf('d')]), Tree::leaf('e')]);
/// let y = Tree::node('a', [Tree::node('c', [Tree::leaf('d')])]);
///
/// let alignment = backtrace(&x, &y, &UnitCost)?;
/// assert_eq!(
///     alignment.render(x.labels(), y.labels()),
///     "c [2] vs. -\n\
///      d [3] vs. d [2]\n\
///      b [1] vs. c [1]\n\
///      e [4] vs. -\n\
///      a [0] vs. a [0]"
/// );
/// # Ok::<(), tree_alignment::Error>(())
/// ```
pub fn backtrace<L, D>(x: &Tree<L>, y: &Tree<L>, delta: &D) -> Result<Alignment>
where
    L: Sync,
    D: Delta<L> + ?Sized,
{
    Ted::default().backtrace(x, y, delta)
}
