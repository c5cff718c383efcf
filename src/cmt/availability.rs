use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-level, per-index "withheld" flags held by the block producer.
///
/// `withheld[level][index] == true` means the symbol will not be released.
/// Levels or indices missing from the table are available, so the default
/// (empty) pattern withholds nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidePattern {
    withheld: Vec<Vec<bool>>,
}

impl HidePattern {
    pub fn new(withheld: Vec<Vec<bool>>) -> Self {
        Self { withheld }
    }

    /// A pattern withholding exactly the given `(level, index)` pairs.
    pub fn withholding(positions: &[(usize, usize)]) -> Self {
        let mut withheld: Vec<Vec<bool>> = Vec::new();
        for &(level, index) in positions {
            if withheld.len() <= level {
                withheld.resize(level + 1, Vec::new());
            }
            let row = &mut withheld[level];
            if row.len() <= index {
                row.resize(index + 1, false);
            }
            row[index] = true;
        }
        Self { withheld }
    }

    /// Withholds each symbol of a tree with the given level lengths
    /// independently with probability `fraction`.
    pub fn random<R: Rng + ?Sized>(level_lens: &[usize], fraction: f64, rng: &mut R) -> Self {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let withheld = level_lens
            .iter()
            .map(|&len| (0..len).map(|_| rng.gen_bool(fraction)).collect())
            .collect();
        Self { withheld }
    }

    pub fn is_withheld(&self, level: usize, index: usize) -> bool {
        self.withheld
            .get(level)
            .and_then(|row| row.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub fn withheld_count(&self) -> usize {
        self.withheld.iter().flatten().filter(|&&hidden| hidden).count()
    }

    /// The raw table, one row per level.
    pub fn as_table(&self) -> &[Vec<bool>] {
        &self.withheld
    }
}

impl From<Vec<Vec<bool>>> for HidePattern {
    fn from(withheld: Vec<Vec<bool>>) -> Self {
        Self::new(withheld)
    }
}
