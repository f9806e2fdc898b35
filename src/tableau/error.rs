//! # Error reporting for tableau operations
//!
//! Everything in here is fatal to the operation that produced it: the engine
//! is a deterministic state machine and never retries internally. Callers
//! decide whether to abandon the search, choose a different pivot, or report
//! infeasibility.
use thiserror::Error;

/// A violation of the basis exchange contract.
///
/// Indicates a logic error in the calling algorithm rather than a runtime
/// condition to recover from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum BasisError {
    /// The label that should leave the basis is not currently basic.
    #[error("label {0} is not in the basis")]
    NotBasic(usize),
    /// The label that should enter the basis is already basic.
    #[error("label {0} is already in the basis")]
    AlreadyBasic(usize),
}

/// Failure of a pivoting operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum TableauError {
    /// A pivot was requested at a position where `can_pivot` does not hold:
    /// the pivot element is (numerically) zero or the entering label is
    /// blocked or already basic.
    #[error("bad pivot at row {row} for entering label {label}")]
    BadPivot {
        /// Row of the variable that was to leave the basis.
        row: usize,
        /// Label of the variable that was to enter the basis.
        label: usize,
    },
    /// The tracked denominator of an exact tableau became zero.
    ///
    /// Unreachable as long as the pivot invariants hold; surfacing it means
    /// the scaled-integer bookkeeping is inconsistent.
    #[error("bad denominator in tableau")]
    BadDenominator,
    /// The basis matrix could not be factorized because it is (numerically)
    /// singular.
    #[error("basis matrix is singular")]
    Singular,
    /// The underlying basis exchange was invalid.
    #[error(transparent)]
    Basis(#[from] BasisError),
}
