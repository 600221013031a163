//! Termination outcome of the fixed-point solvers
//!
//! Both the photosynthesis/conductance solver and the leaf energy balance stop
//! silently at their iteration caps. The outcome is reported alongside the
//! result so a stricter caller can reject approximations, but reaching the cap
//! is never an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a bounded fixed-point iteration terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// Successive estimates fell within tolerance after `iterations` passes
    Converged { iterations: u32 },
    /// The loop stopped at its cap; the last estimate was returned as-is
    IterationCapReached { iterations: u32 },
}

impl Convergence {
    /// Build the outcome from the iteration count and the final tolerance test
    #[must_use]
    pub(crate) fn from_loop(iterations: u32, converged: bool) -> Self {
        if converged {
            Convergence::Converged { iterations }
        } else {
            Convergence::IterationCapReached { iterations }
        }
    }

    #[must_use]
    pub fn is_converged(self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    /// Number of passes the solver performed
    #[must_use]
    pub fn iterations(self) -> u32 {
        match self {
            Convergence::Converged { iterations }
            | Convergence::IterationCapReached { iterations } => iterations,
        }
    }
}

impl fmt::Display for Convergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convergence::Converged { iterations } => {
                write!(f, "converged after {} iterations", iterations)
            }
            Convergence::IterationCapReached { iterations } => {
                write!(f, "stopped at iteration cap ({})", iterations)
            }
        }
    }
}
