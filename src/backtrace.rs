use crate::{Alignment, Error, ForestDistance, Pair, Result, Step};
use std::mem;

enum Item {
    Pair(Pair),
    /// The alignment of a pair of subtrees, spliced in once every subtree is resolved.
    Nested(usize),
}

#[inline]
pub(crate) fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    a == b || (a - b).abs() < tolerance
}

/// Recovers a co-optimal [Alignment] from the tables of `fd`.
///
/// Among co-optimal edits, aligning the rightmost nodes is preferred to deleting the left-hand one,
/// which is preferred to inserting the right-hand one.
pub(crate) fn align(fd: &ForestDistance, tolerance: f64) -> Result<Alignment> {
    let (m, n) = (fd.x.len(), fd.y.len());
    let distance = fd.distance();

    if m == 0 || n == 0 || distance.is_infinite() {
        let deletions = (0..m).map(|a| Pair::deleted(fd.x.nodes[a], fd.costs.del(a)));
        let insertions = (0..n).map(|b| Pair::inserted(fd.y.nodes[b], fd.costs.ins(b)));
        return Ok(Alignment::new(deletions.chain(insertions).collect(), distance));
    }

    // Each segment lists its items from right to left.
    let mut segments = vec![Vec::new()];
    let mut pending = vec![(0, m - 1, n - 1)];

    while let Some((id, i, j)) = pending.pop() {
        tracing::trace!(i, j, "tracing back subtrees");
        let f = fd.forest(i, j);
        let (mut p, mut q) = (i - f.li + 1, j - f.lj + 1);

        while p > 0 || q > 0 {
            let (a, b) = ((f.li + p).wrapping_sub(1), (f.lj + q).wrapping_sub(1));

            let step = match (p, q) {
                (_, 0) => Step::Delete,
                (0, _) => Step::Insert,
                (p, q) => fd
                    .options(&f, p, q)
                    .into_iter()
                    .find(|&(_, c)| approx_eq(c, f[(p, q)], tolerance))
                    .map(|(s, _)| s)
                    .ok_or(Error::Inconsistent {
                        left: fd.x.nodes[a],
                        right: fd.y.nodes[b],
                    })?,
            };

            match step {
                Step::Match => {
                    let pair = Pair::matched(fd.x.nodes[a], fd.y.nodes[b], fd.costs.rep(a, b));
                    segments[id].push(Item::Pair(pair));
                    p -= 1;
                    q -= 1;
                }

                Step::Subtree => {
                    let nested = segments.len();
                    segments.push(Vec::new());
                    segments[id].push(Item::Nested(nested));
                    pending.push((nested, a, b));
                    p = fd.x.leftmost[a] - f.li;
                    q = fd.y.leftmost[b] - f.lj;
                }

                Step::Delete => {
                    let pair = Pair::deleted(fd.x.nodes[a], fd.costs.del(a));
                    segments[id].push(Item::Pair(pair));
                    p -= 1;
                }

                Step::Insert => {
                    let pair = Pair::inserted(fd.y.nodes[b], fd.costs.ins(b));
                    segments[id].push(Item::Pair(pair));
                    q -= 1;
                }
            }
        }
    }

    let mut pairs = Vec::with_capacity(m + n);
    let mut stack = vec![mem::take(&mut segments[0]).into_iter()];
    while let Some(items) = stack.last_mut() {
        match items.next() {
            Some(Item::Pair(pair)) => pairs.push(pair),
            Some(Item::Nested(k)) => stack.push(mem::take(&mut segments[k]).into_iter()),
            None => drop(stack.pop()),
        }
    }

    pairs.reverse();
    Ok(Alignment::new(pairs, distance))
}
