//! # Pivoting tableaus
//!
//! The tableau engine underlying the equilibrium solvers. A tableau maintains
//! the basic/nonbasic partition of a linear system `A x = b`, executes basis
//! exchanges and reconstructs the solution belonging to the current basis.
//!
//! There are two implementations of the same pivoting contract with different
//! numerics. The [`FloatTableau`] factorizes the basis matrix and updates the
//! factorization incrementally per pivot, trading rounding error for speed;
//! the [`ExactTableau`] keeps the entire tableau as scaled integers with a
//! tracked denominator and never rounds. The contract is expressed as the
//! [`BaseTableau`] trait so that calling algorithms dispatch at compile time.
use std::fmt::Debug;
use std::ops::Neg;

use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::data::linear_algebra::{DenseMatrix, DenseVector};
use crate::tableau::basis::Basis;
use crate::tableau::bfs::Bfs;
use crate::tableau::error::{BasisError, TableauError};

pub mod basis;
pub mod bfs;
pub mod error;
pub mod exact;
pub mod floating;

pub use exact::ExactTableau;
pub use floating::FloatTableau;

/// Scalars a tableau can compute with.
///
/// The single distinction that matters here is whether the representation is
/// exact: inexact scalars classify values against small thresholds, exact
/// scalars against zero itself.
pub trait TableauValue: Zero + One + Neg<Output = Self> + Clone + PartialOrd + Debug {
    /// The tolerance of magnitude `10^-magnitude`, or the additive identity
    /// for representations without rounding error.
    fn tolerance(magnitude: i32) -> Self;
}

impl TableauValue for f64 {
    fn tolerance(magnitude: i32) -> Self {
        10_f64.powi(-magnitude)
    }
}

impl TableauValue for BigRational {
    fn tolerance(_magnitude: i32) -> Self {
        Self::zero()
    }
}

/// The pivoting contract satisfied by every tableau representation.
///
/// A tableau is a passive state machine: an external algorithm decides which
/// variable should enter the basis and which should leave, the tableau tests
/// and executes the exchange and keeps all derived state consistent. After
/// any successful pivot, `A_B · basis_vector() = b` holds for the matrix
/// `A_B` of currently basic columns, exactly or within tolerance depending on
/// the implementation.
pub trait BaseTableau {
    /// Scalar type of solution values.
    type Value: TableauValue;

    /// Number of rows, which equals the number of basic variables.
    fn nr_rows(&self) -> usize;

    /// Size of the label space: structural columns followed by the unit
    /// columns that seeded the initial basis.
    fn nr_labels(&self) -> usize;

    /// Whether `row` addresses a row of this tableau.
    fn is_row_index(&self, row: usize) -> bool {
        row < self.nr_rows()
    }

    /// Whether `label` addresses a variable of this tableau.
    fn is_label(&self, label: usize) -> bool {
        label < self.nr_labels()
    }

    /// Whether the variable with this label is currently basic.
    fn is_basic(&self, label: usize) -> bool;

    /// The label of the basic variable occupying a row.
    fn label_at(&self, row: usize) -> usize;

    /// The row occupied by a basic label, `None` for nonbasic labels.
    fn position_of(&self, label: usize) -> Option<usize>;

    /// Bar a label from entering the basis.
    fn mark(&mut self, label: usize);

    /// Allow a previously marked label to enter the basis again.
    fn unmark(&mut self, label: usize);

    /// Whether a label is barred from entering the basis.
    fn is_blocked(&self, label: usize) -> bool;

    /// Whether pivoting `in_label` into the position of row `out_row` is
    /// admissible: the pivot element is nonzero (within tolerance for inexact
    /// representations) and the entering label is neither basic nor blocked.
    fn can_pivot(&self, out_row: usize, in_label: usize) -> bool;

    /// Execute a basis exchange.
    ///
    /// Brings the variable `in_label` into the basis at the position of row
    /// `out_row` and updates all derived state, reestablishing the solution
    /// consistency invariant.
    ///
    /// # Errors
    ///
    /// `TableauError::BadPivot` when called while [`BaseTableau::can_pivot`]
    /// does not hold. The tableau is left unchanged; the violation is a logic
    /// error in the calling algorithm.
    fn pivot(&mut self, out_row: usize, in_label: usize) -> Result<(), TableauError>;

    /// Pivot a basic variable out by label rather than by row.
    ///
    /// The form used by complementarity algorithms, which track the label
    /// that has to leave rather than its position.
    fn comp_pivot(&mut self, out_label: usize, in_label: usize) -> Result<(), TableauError> {
        let row = self.position_of(out_label).ok_or(BasisError::NotBasic(out_label))?;
        self.pivot(row, in_label)
    }

    /// Rebuild all derived state from the original problem data and the
    /// current basis, discarding any accumulated representation drift.
    ///
    /// Idempotent: consecutive calls produce equivalent state.
    ///
    /// # Errors
    ///
    /// `TableauError::Singular` when the basis matrix cannot be refactorized.
    fn refactor(&mut self) -> Result<(), TableauError>;

    /// The number of pivots executed since construction.
    fn nr_pivots(&self) -> u64;

    /// The values of the basic variables, one per row.
    fn basis_vector(&self) -> &DenseVector<Self::Value>;

    /// A sparse snapshot of the current basic solution.
    ///
    /// Contains the basic variables only; nonbasic variables are implicitly
    /// zero. Read-only, never mutates the tableau.
    fn bfs(&self) -> Bfs<Self::Value> {
        Bfs::new(
            (0..self.nr_rows()).map(|row| (self.label_at(row), self.basis_vector()[row].clone())),
        )
    }

    /// Whether the current solution satisfies all sign constraints.
    fn is_feasible(&self) -> bool;

    /// Whether the current basis is the lexicographic minimum among the bases
    /// representing this solution.
    ///
    /// Relevant for degenerate solutions only, where multiple bases yield the
    /// same values; the canonical column order makes the preferred basis
    /// unique, which is what prevents cycling.
    fn is_lex_min(&self) -> bool;
}

/// The representation-independent part of a tableau.
///
/// Holds the borrowed problem data, the basis and everything derived from it
/// that does not depend on how pivots are carried out numerically. The two
/// tableau implementations embed this and keep it consistent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TableauState<'a, F> {
    /// The constraint matrix, `m` by `n`.
    a: &'a DenseMatrix<F>,
    /// The right-hand side, length `m`.
    b: &'a DenseVector<F>,
    /// Row to label bijection.
    basis: Basis,
    /// Value of the basic variable in each row.
    solution: DenseVector<F>,
    /// Number of pivots since construction.
    npivots: u64,
    /// Tolerance for classifying a value as zero.
    eps1: F,
    /// Tolerance for sign tests.
    eps2: F,
    /// Labels whose value must vanish for the underlying problem to be
    /// feasible.
    artificial: Vec<usize>,
}

impl<'a, F: TableauValue> TableauState<'a, F> {
    /// Set up state with the unit columns `n..n + m` basic.
    ///
    /// # Arguments
    ///
    /// * `a`: Constraint matrix, borrowed for the lifetime of the tableau.
    /// * `b`: Right-hand side of length `a.nr_rows()`.
    /// * `extra_artificial`: Structural labels that are artificial in the
    ///   caller's formulation, on top of the seeded unit columns.
    pub(in crate::tableau) fn new(
        a: &'a DenseMatrix<F>,
        b: &'a DenseVector<F>,
        extra_artificial: Vec<usize>,
    ) -> Self {
        let m = a.nr_rows();
        let n = a.nr_columns();
        debug_assert_eq!(b.len(), m);
        debug_assert!(extra_artificial.iter().all(|&label| label < n));

        let mut artificial: Vec<usize> = (n..n + m).collect();
        artificial.extend(extra_artificial);

        Self {
            a,
            b,
            basis: Basis::new((n..n + m).collect(), n + m),
            solution: DenseVector::constant(F::zero(), m),
            npivots: 0,
            eps1: F::tolerance(8),
            eps2: F::tolerance(8),
            artificial,
        }
    }

    /// The number of rows of the problem.
    pub fn nr_rows(&self) -> usize {
        self.a.nr_rows()
    }

    /// The number of structural columns of the problem.
    pub fn nr_structural(&self) -> usize {
        self.a.nr_columns()
    }

    /// Size of the label space: structural columns plus unit columns.
    pub fn nr_labels(&self) -> usize {
        self.nr_structural() + self.nr_rows()
    }

    /// The borrowed constraint matrix.
    pub fn matrix(&self) -> &'a DenseMatrix<F> {
        self.a
    }

    /// The borrowed right-hand side.
    pub fn constraint_vector(&self) -> &'a DenseVector<F> {
        self.b
    }

    /// The current basis.
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// The labels that have to reach zero for the problem to be feasible.
    pub fn artificial_labels(&self) -> &[usize] {
        &self.artificial
    }

    /// Override the classification tolerances.
    ///
    /// `eps1` classifies a value as zero, `eps2` is the slack allowed in sign
    /// tests. Irrelevant for exact representations, where both are zero.
    pub fn set_epsilon(&mut self, eps1: F, eps2: F) {
        self.eps1 = eps1;
        self.eps2 = eps2;
    }

    /// For unit labels, the row their column carries the one in.
    pub(in crate::tableau) fn unit_row_of(&self, label: usize) -> Option<usize> {
        debug_assert!(label < self.nr_labels());

        label.checked_sub(self.nr_structural())
    }

    /// The column of the problem belonging to a label, against the original
    /// (unit) basis.
    pub(in crate::tableau) fn original_column(&self, label: usize) -> Vec<F> {
        debug_assert!(label < self.nr_labels());

        match self.unit_row_of(label) {
            Some(row) => {
                let mut column = vec![F::zero(); self.nr_rows()];
                column[row] = F::one();
                column
            },
            None => self.a.column(label),
        }
    }

    /// Position of a label in the canonical lexicographic column order.
    ///
    /// Unit columns order before structural ones, in descending row order;
    /// structural columns follow in ascending label order. Keys are unique,
    /// making the order total.
    pub(in crate::tableau) fn lex_key(&self, label: usize) -> i64 {
        debug_assert!(label < self.nr_labels());

        match self.unit_row_of(label) {
            Some(row) => -(row as i64) - 1,
            None => label as i64 + 1,
        }
    }

    /// The current zero-classification tolerance.
    pub(in crate::tableau) fn zero_tolerance(&self) -> F {
        self.eps1.clone()
    }

    pub(in crate::tableau) fn eq_zero(&self, value: &F) -> bool {
        let minus = -self.eps1.clone();
        *value <= self.eps1 && *value >= minus
    }

    pub(in crate::tableau) fn lt_zero(&self, value: &F) -> bool {
        *value < -self.eps2.clone()
    }

    pub(in crate::tableau) fn gt_zero(&self, value: &F) -> bool {
        *value > self.eps2
    }

    pub(in crate::tableau) fn ge_zero(&self, value: &F) -> bool {
        !self.lt_zero(value)
    }

    #[allow(dead_code)]
    pub(in crate::tableau) fn le_zero(&self, value: &F) -> bool {
        !self.gt_zero(value)
    }

    /// Whether all basic values satisfy their sign constraint.
    pub(in crate::tableau) fn solution_is_feasible(&self) -> bool {
        self.solution.iter().all(|value| self.ge_zero(value))
    }

    /// Whether every artificial label is out of the basis or at value zero.
    pub(in crate::tableau) fn artificials_cleared(&self) -> bool {
        self.artificial.iter().all(|&label| {
            match self.basis.position_of(label) {
                Some(row) => self.eq_zero(&self.solution[row]),
                None => true,
            }
        })
    }

    pub(in crate::tableau) fn basis_mut(&mut self) -> &mut Basis {
        &mut self.basis
    }

    pub(in crate::tableau) fn replace_basis(&mut self, labels: Vec<usize>) {
        debug_assert_eq!(labels.len(), self.nr_rows());

        self.basis = Basis::new(labels, self.nr_labels());
    }

    pub(in crate::tableau) fn solution(&self) -> &DenseVector<F> {
        &self.solution
    }

    pub(in crate::tableau) fn set_solution(&mut self, solution: DenseVector<F>) {
        debug_assert_eq!(solution.len(), self.nr_rows());

        self.solution = solution;
    }

    pub(in crate::tableau) fn nr_pivots(&self) -> u64 {
        self.npivots
    }

    pub(in crate::tableau) fn count_pivot(&mut self) {
        self.npivots += 1;
    }
}
