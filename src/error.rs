//! Error types.

use thiserror::Error;

/// A fatal, non-recoverable engine error.
///
/// Per `spec.md` §7, these signal a programmer error (malformed input after CNF conversion, a
/// corrupted invariant) rather than an ordinary unsatisfiability result. The engine does not
/// attempt to roll back its checkpoint when one of these is raised, since its internal state is
/// already inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The clause ingester (C5) encountered a formula shape it cannot handle after CNF
    /// conversion, or some other internal invariant did not hold.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}
