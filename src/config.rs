/// The absolute tolerance below which two costs are considered equal during backtracing.
pub const TOLERANCE: f64 = 1e-5;

/// Tunables of the tree edit distance engine.
///
/// # Example
///
/// ```rust
/// use tree_alignment::{Config, Ted};
///
/// let ted = Ted::new(Config::default().with_max_cells(1 << 20));
/// # let _ = ted;
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Costs closer than this are treated as equal when choosing between co-optimal edits.
    pub tolerance: f64,

    /// A warning is logged when the distance table would hold more cells than this.
    pub warn_cells: usize,

    /// Comparisons whose distance table would hold more cells than this are rejected.
    pub max_cells: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tolerance: TOLERANCE,
            warn_cells: 1 << 24,
            max_cells: None,
        }
    }
}

impl Config {
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Config { tolerance, ..self }
    }

    pub fn with_warn_cells(self, warn_cells: usize) -> Self {
        Config { warn_cells, ..self }
    }

    pub fn with_max_cells(self, max_cells: usize) -> Self {
        Config {
            max_cells: Some(max_cells),
            ..self
        }
    }
}
