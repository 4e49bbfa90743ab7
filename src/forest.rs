use crate::{CostMatrix, Delta, Postorder, Result, Tree};
use std::ops::{Index, IndexMut};

/// The ways the rightmost nodes of two forests may be aligned.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Step {
    /// Both nodes are on the leftmost paths of their forests and are aligned with one another.
    Match,
    /// Both nodes root whole subtrees, whose distance was computed for an earlier pair of keyroots.
    Subtree,
    Delete,
    Insert,
}

/// The forest distances between all prefixes of `li..=i` and `lj..=j`.
///
/// Entry `(p, q)` holds the distance between the first `p` nodes of the left-hand range and
/// the first `q` nodes of the right-hand range.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Forest {
    pub(crate) li: usize,
    pub(crate) lj: usize,
    cols: usize,
    cells: Box<[f64]>,
}

impl Index<(usize, usize)> for Forest {
    type Output = f64;

    #[inline]
    fn index(&self, (p, q): (usize, usize)) -> &f64 {
        &self.cells[p * self.cols + q]
    }
}

impl IndexMut<(usize, usize)> for Forest {
    #[inline]
    fn index_mut(&mut self, (p, q): (usize, usize)) -> &mut f64 {
        &mut self.cells[p * self.cols + q]
    }
}

/// The tree distances between every pair of subtrees of two trees.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ForestDistance {
    pub(crate) x: Postorder,
    pub(crate) y: Postorder,
    pub(crate) costs: CostMatrix,
    td: Box<[f64]>,
}

impl ForestDistance {
    pub(crate) fn new<L: Sync, D: Delta<L> + ?Sized>(
        x: &Tree<L>,
        y: &Tree<L>,
        delta: &D,
    ) -> Result<Self> {
        let (px, py) = (Postorder::new(x), Postorder::new(y));
        let costs = CostMatrix::new(x.labels(), y.labels(), delta)?.permute(&px.nodes, &py.nodes);

        let mut this = ForestDistance {
            td: vec![f64::INFINITY; px.len() * py.len()].into(),
            x: px,
            y: py,
            costs,
        };

        this.fill();
        Ok(this)
    }

    fn fill(&mut self) {
        for &i in self.x.keyroots.iter() {
            for &j in self.y.keyroots.iter() {
                tracing::trace!(i, j, "filling forest table");
                let f = self.forest(i, j);

                for a in f.li..=i {
                    for b in f.lj..=j {
                        if self.x.leftmost[a] == f.li && self.y.leftmost[b] == f.lj {
                            let cols = self.y.len();
                            self.td[a * cols + b] = f[(a - f.li + 1, b - f.lj + 1)];
                        }
                    }
                }
            }
        }
    }

    /// The tree distance between the subtrees rooted at postorder positions `a` and `b`.
    #[inline]
    pub(crate) fn td(&self, a: usize, b: usize) -> f64 {
        self.td[a * self.y.len() + b]
    }

    /// The distance between the whole trees.
    pub(crate) fn distance(&self) -> f64 {
        match (self.x.len(), self.y.len()) {
            (0, _) => self.costs.insertions().iter().sum(),
            (_, 0) => self.costs.deletions().iter().sum(),
            (m, n) => self.td(m - 1, n - 1),
        }
    }

    /// Computes the forest distances for the subtrees rooted at postorder positions `i` and `j`.
    ///
    /// Every tree distance between proper subtrees off the leftmost paths must already be known.
    pub(crate) fn forest(&self, i: usize, j: usize) -> Forest {
        let (li, lj) = (self.x.leftmost[i], self.y.leftmost[j]);
        let (rows, cols) = (i - li + 2, j - lj + 2);

        let mut f = Forest {
            li,
            lj,
            cols,
            cells: vec![0.; rows * cols].into(),
        };

        for p in 0..rows {
            for q in 0..cols {
                let value = match (p, q) {
                    (0, 0) => 0.,
                    (p, 0) => f[(p - 1, 0)] + self.costs.del(li + p - 1),
                    (0, q) => f[(0, q - 1)] + self.costs.ins(lj + q - 1),
                    (p, q) => self
                        .options(&f, p, q)
                        .into_iter()
                        .fold(f64::INFINITY, |min, (_, c)| min.min(c)),
                };

                f[(p, q)] = value;
            }
        }

        f
    }

    /// The cost of each way to reach entry `(p, q)` of `f`, with `p` and `q` both positive.
    ///
    /// The order of the options is the order of preference among co-optimal ones.
    #[inline]
    pub(crate) fn options(&self, f: &Forest, p: usize, q: usize) -> [(Step, f64); 3] {
        let (a, b) = (f.li + p - 1, f.lj + q - 1);
        let (la, lb) = (self.x.leftmost[a], self.y.leftmost[b]);

        let align = if la == f.li && lb == f.lj {
            (Step::Match, f[(p - 1, q - 1)] + self.costs.rep(a, b))
        } else {
            (Step::Subtree, f[(la - f.li, lb - f.lj)] + self.td(a, b))
        };

        [
            align,
            (Step::Delete, f[(p - 1, q)] + self.costs.del(a)),
            (Step::Insert, f[(p, q - 1)] + self.costs.ins(b)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{example, Letter, Size, UnitCost};
    use std::collections::HashMap;
    use test_strategy::proptest;

    fn weighted(a: Option<&Letter>, b: Option<&Letter>) -> f64 {
        match (a, b) {
            (Some(a), Some(b)) if a == b => 0.,
            (Some(_), Some(_)) => 1.5,
            (Some(Letter::A), None) | (None, Some(Letter::A)) => 0.5,
            _ => 1.,
        }
    }

    /// The textbook recursion over forests, given as sequences of preorder roots.
    struct Naive<'a, D> {
        x: &'a Tree<Letter>,
        y: &'a Tree<Letter>,
        delta: &'a D,
        memo: HashMap<(Vec<usize>, Vec<usize>), f64>,
    }

    impl<D: Delta<Letter>> Naive<'_, D> {
        fn distance(&mut self, f: Vec<usize>, g: Vec<usize>) -> f64 {
            if let Some(&d) = self.memo.get(&(f.clone(), g.clone())) {
                return d;
            }

            let (x, y, delta) = (self.x, self.y, self.delta);
            let d = match (f.split_last(), g.split_last()) {
                (None, None) => 0.,
                (Some((&v, rest)), None) => {
                    let mut h = rest.to_vec();
                    h.extend(x.children(v));
                    self.distance(h, g.clone()) + delta.cost(Some(x.label(v)), None)
                }
                (None, Some((&w, rest))) => {
                    let mut h = rest.to_vec();
                    h.extend(y.children(w));
                    self.distance(f.clone(), h) + delta.cost(None, Some(y.label(w)))
                }
                (Some((&v, fr)), Some((&w, gr))) => {
                    let (a, b) = (x.label(v), y.label(w));

                    let mut fv = fr.to_vec();
                    fv.extend(x.children(v));
                    let mut gw = gr.to_vec();
                    gw.extend(y.children(w));

                    let del = self.distance(fv, g.clone()) + delta.cost(Some(a), None);
                    let ins = self.distance(f.clone(), gw) + delta.cost(None, Some(b));
                    let rep = self.distance(x.children(v).to_vec(), y.children(w).to_vec())
                        + self.distance(fr.to_vec(), gr.to_vec())
                        + delta.cost(Some(a), Some(b));

                    del.min(ins).min(rep)
                }
            };

            self.memo.insert((f, g), d);
            d
        }
    }

    fn roots<L>(t: &Tree<L>) -> Vec<usize> {
        if t.is_empty() {
            Vec::new()
        } else {
            vec![0]
        }
    }

    #[test]
    fn distance_of_the_example_is_three() {
        let (x, y) = example();
        let fd = ForestDistance::new(&x, &y, &UnitCost).unwrap();
        assert_eq!(fd.distance(), 3.);
    }

    #[test]
    fn distance_to_the_empty_tree_sums_deletions() {
        let (x, _) = example();
        let empty = Tree::empty();
        assert_eq!(ForestDistance::new(&x, &empty, &UnitCost).unwrap().distance(), 5.);
        assert_eq!(ForestDistance::new(&empty, &x, &UnitCost).unwrap().distance(), 5.);
        assert_eq!(ForestDistance::new(&empty, &empty, &UnitCost).unwrap().distance(), 0.);
    }

    #[test]
    fn tree_distances_between_subtrees_of_the_example() {
        let (x, y) = example();
        let fd = ForestDistance::new(&x, &y, &UnitCost).unwrap();

        // b(c, d) vs c(d)
        assert_eq!(fd.td(2, 1), 2.);
        // e vs d
        assert_eq!(fd.td(3, 0), 1.);
        // d vs c(d)
        assert_eq!(fd.td(1, 1), 1.);
    }

    #[proptest]
    fn distance_between_identical_trees_is_zero(t: Tree<Letter>) {
        let fd = ForestDistance::new(&t, &t, &UnitCost).unwrap();
        assert_eq!(fd.distance(), 0.);
    }

    #[proptest]
    fn distance_is_at_most_deleting_and_inserting_everything(x: Tree<Letter>, y: Tree<Letter>) {
        let fd = ForestDistance::new(&x, &y, &weighted).unwrap();
        let bound: f64 = x.labels().iter().map(|l| weighted(Some(l), None)).sum::<f64>()
            + y.labels().iter().map(|l| weighted(None, Some(l))).sum::<f64>();

        assert!(fd.distance() <= bound);
    }

    #[proptest]
    fn distance_agrees_with_the_naive_recursion(
        #[any(Size::from((2, 3)))] x: Tree<Letter>,
        #[any(Size::from((2, 3)))] y: Tree<Letter>,
    ) {
        let fd = ForestDistance::new(&x, &y, &weighted).unwrap();

        let mut naive = Naive {
            x: &x,
            y: &y,
            delta: &weighted,
            memo: HashMap::new(),
        };

        let expected = naive.distance(roots(&x), roots(&y));
        assert!((fd.distance() - expected).abs() < 1e-9);
    }
}
