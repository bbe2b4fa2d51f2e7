use std::{fmt, str::FromStr};

use super::AllocError;

/// Placement strategy used to pick a free block for an
/// allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Lowest-offset free block that is large enough.
    FirstFit,
    /// Free block leaving the least space after the
    /// allocation.
    BestFit,
    /// Free block leaving the most space after the
    /// allocation.
    WorstFit,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::FirstFit, Strategy::BestFit, Strategy::WorstFit];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::FirstFit => "First-Fit",
            Strategy::BestFit => "Best-Fit",
            Strategy::WorstFit => "Worst-Fit",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Names are compared against the canonical ones with
        // '_' and ' ' treated as '-', so "best_fit" and
        // "Best Fit" both select best-fit.
        let normalized = s.trim().replace(['_', ' '], "-");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| AllocError::UnknownStrategy(s.to_owned()))
    }
}
