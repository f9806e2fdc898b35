//! # Exact tableau
//!
//! Tableau over exact arithmetic. The problem data is scaled by the least
//! common multiple of its denominators into an integer matrix, and every
//! pivot uses the classical fraction-free update: multiply the non-pivot rows
//! by the pivot element, subtract the matching multiple of the pivot row and
//! divide by the previous denominator. All divisions are exact, so the whole
//! tableau stays integer and a single tracked denominator relates the stored
//! entries to their true rational values. No rounding ever occurs and,
//! unlike the floating representation, nothing drifts: refactorization exists
//! only to rebuild after a wholesale basis replacement.
use log::{debug, trace};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::data::linear_algebra::{DenseMatrix, DenseVector};
use crate::tableau::{BaseTableau, TableauState};
use crate::tableau::basis::Basis;
use crate::tableau::error::TableauError;

/// Divide, requiring that no remainder is lost.
///
/// The fraction-free pivot formula guarantees divisibility; a nonzero
/// remainder would mean the invariants are broken.
fn exact_div(value: BigInt, divisor: &BigInt) -> BigInt {
    debug_assert!(value.is_multiple_of(divisor), "inexact division of {} by {}", value, divisor);

    value / divisor
}

/// Tableau computing with scaled arbitrary precision integers.
///
/// The stored entry at `(i, j)` equals the true tableau entry times `denom`,
/// which itself equals the determinant (up to sign) of the current basic
/// submatrix of the scaled problem.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExactTableau<'a> {
    state: TableauState<'a, BigRational>,
    /// The integer image of the augmented problem, unit columns first.
    tabdat: DenseMatrix<BigInt>,
    /// The integer image of the right-hand side.
    coeff: DenseVector<BigInt>,
    /// Scale between the caller's rational data and the integer image: the
    /// least common multiple of all denominators in `A` and `b`.
    totdenom: BigInt,
    /// Denominator shared by all entries of `tabdat` and `coeff`.
    denom: BigInt,
}

impl<'a> ExactTableau<'a> {
    /// Create a tableau with the unit columns basic.
    ///
    /// The unit columns receive the labels `a.nr_columns()..a.nr_columns() +
    /// a.nr_rows()` and are recorded as artificial.
    pub fn new(a: &'a DenseMatrix<BigRational>, b: &'a DenseVector<BigRational>) -> Self {
        Self::with_artificials(a, Vec::new(), b)
    }

    /// Create a tableau that treats the given structural labels as artificial
    /// as well.
    pub fn with_artificials(
        a: &'a DenseMatrix<BigRational>,
        artificial: Vec<usize>,
        b: &'a DenseVector<BigRational>,
    ) -> Self {
        let state = TableauState::new(a, b, artificial);
        let totdenom = Self::common_denominator(a, b);
        let (tabdat, coeff) = Self::scaled_data(a, b, &totdenom);

        let mut tableau = Self {
            state,
            tabdat,
            coeff,
            totdenom,
            denom: BigInt::one(),
        };
        tableau.update_solution();
        tableau
    }

    /// Create a tableau starting from an explicit basis.
    ///
    /// # Errors
    ///
    /// `TableauError::Singular` when the selected columns do not form a
    /// basis.
    pub fn with_basis(
        a: &'a DenseMatrix<BigRational>,
        b: &'a DenseVector<BigRational>,
        basis: Vec<usize>,
    ) -> Result<Self, TableauError> {
        let mut tableau = Self::new(a, b);
        tableau.set_basis(basis)?;
        Ok(tableau)
    }

    /// Replace the entire basis and rebuild the scaled tableau for it.
    ///
    /// Blocking marks are reset.
    ///
    /// # Errors
    ///
    /// `TableauError::Singular` when the selected columns do not form a
    /// basis; the tableau must not be used further in that case.
    pub fn set_basis(&mut self, basis: Vec<usize>) -> Result<(), TableauError> {
        self.state.replace_basis(basis);
        self.refactor()
    }

    /// The least common multiple of all denominators in the problem data.
    fn common_denominator(a: &DenseMatrix<BigRational>, b: &DenseVector<BigRational>) -> BigInt {
        let mut totdenom = BigInt::one();
        for i in 0..a.nr_rows() {
            for value in a.row(i) {
                totdenom = totdenom.lcm(value.denom());
            }
            totdenom = totdenom.lcm(b[i].denom());
        }

        totdenom
    }

    /// The integer image of the augmented problem `[I | totdenom * A]` and of
    /// `totdenom * b`.
    fn scaled_data(
        a: &DenseMatrix<BigRational>,
        b: &DenseVector<BigRational>,
        totdenom: &BigInt,
    ) -> (DenseMatrix<BigInt>, DenseVector<BigInt>) {
        let m = a.nr_rows();
        let n = a.nr_columns();

        let scale = |value: &BigRational| -> BigInt {
            exact_div(value.numer() * totdenom, value.denom())
        };

        let rows = (0..m)
            .map(|i| {
                let mut row = Vec::with_capacity(m + n);
                row.extend((0..m).map(|j| if i == j { BigInt::one() } else { BigInt::zero() }));
                row.extend(a.row(i).map(scale));
                row
            })
            .collect();
        let coeff = b.iter().map(scale).collect();

        (DenseMatrix::from_data(rows), DenseVector::new(coeff))
    }

    /// The internal column of a label.
    ///
    /// The caller's label space lists the structural columns first; the dense
    /// internal ordering puts the unit columns of the initial basis in the
    /// leading block instead.
    fn remap(&self, label: usize) -> usize {
        debug_assert!(label < self.state.nr_labels());

        match self.state.unit_row_of(label) {
            Some(row) => row,
            None => self.state.nr_rows() + label,
        }
    }

    /// Whether the variable basic in a row is one of the unit columns.
    fn is_unit_basic(&self, row: usize) -> bool {
        self.state.unit_row_of(self.state.basis().label_at(row)).is_some()
    }

    /// The true rational value of a stored numerator in a row.
    ///
    /// Undoes the scaling: the unit columns of the augmented problem were not
    /// multiplied by `totdenom`, so values in rows where a unit column is
    /// basic carry an extra factor compared to structural ones, as do entries
    /// of scaled (structural) columns.
    fn reconstruct(&self, numerator: &BigInt, row: usize, column_scaled: bool) -> BigRational {
        let mut numer = numerator.clone();
        let mut denom = self.denom.clone();
        if !self.is_unit_basic(row) {
            numer *= &self.totdenom;
        }
        if column_scaled {
            denom *= &self.totdenom;
        }

        BigRational::new(numer, denom)
    }

    /// Fraction-free elimination on position (`pivot_row`, `column`).
    ///
    /// Every non-pivot row is multiplied by the pivot element, the matching
    /// multiple of the pivot row is subtracted and the previous denominator
    /// divided out; the pivot row itself stays untouched and the pivot
    /// element becomes the new denominator.
    fn eliminate(&mut self, pivot_row: usize, column: usize) -> Result<(), TableauError> {
        let pivot = self.tabdat[(pivot_row, column)].clone();
        if pivot.is_zero() {
            return Err(TableauError::BadDenominator);
        }

        let width = self.state.nr_labels();
        for i in 0..self.state.nr_rows() {
            if i == pivot_row {
                continue;
            }
            let factor = self.tabdat[(i, column)].clone();
            for j in 0..width {
                let value = &self.tabdat[(i, j)] * &pivot - &factor * &self.tabdat[(pivot_row, j)];
                self.tabdat[(i, j)] = exact_div(value, &self.denom);
            }
            let value = &self.coeff[i] * &pivot - &factor * &self.coeff[pivot_row];
            self.coeff[i] = exact_div(value, &self.denom);
        }
        self.denom = pivot;

        Ok(())
    }

    fn update_solution(&mut self) {
        let solution = (0..self.state.nr_rows())
            .map(|row| self.reconstruct(&self.coeff[row], row, true))
            .collect();
        self.state.set_solution(DenseVector::new(solution));
    }

    /// The current basis.
    pub fn basis(&self) -> &Basis {
        self.state.basis()
    }

    /// Whether every artificial variable is nonbasic or at value zero.
    pub fn artificials_cleared(&self) -> bool {
        self.state.artificials_cleared()
    }

    /// The scale between the caller's data and the internal integer image.
    pub fn tot_denom(&self) -> &BigInt {
        &self.totdenom
    }

    /// The column of the original problem belonging to a label.
    pub fn get_column(&self, label: usize) -> DenseVector<BigRational> {
        DenseVector::new(self.state.original_column(label))
    }

    /// The column of a label with respect to the current basis,
    /// reconstructed as rationals from the integer image.
    pub fn solve_column(&self, label: usize) -> DenseVector<BigRational> {
        debug_assert!(label < self.state.nr_labels());

        let column = self.remap(label);
        let scaled = self.state.unit_row_of(label).is_none();
        let values = (0..self.state.nr_rows())
            .map(|row| self.reconstruct(&self.tabdat[(row, column)], row, scaled))
            .collect();

        DenseVector::new(values)
    }
}

impl<'a> BaseTableau for ExactTableau<'a> {
    type Value = BigRational;

    fn nr_rows(&self) -> usize {
        self.state.nr_rows()
    }

    fn nr_labels(&self) -> usize {
        self.state.nr_labels()
    }

    fn is_basic(&self, label: usize) -> bool {
        self.state.basis().is_basic(label)
    }

    fn label_at(&self, row: usize) -> usize {
        self.state.basis().label_at(row)
    }

    fn position_of(&self, label: usize) -> Option<usize> {
        self.state.basis().position_of(label)
    }

    fn mark(&mut self, label: usize) {
        self.state.basis_mut().mark(label);
    }

    fn unmark(&mut self, label: usize) {
        self.state.basis_mut().unmark(label);
    }

    fn is_blocked(&self, label: usize) -> bool {
        self.state.basis().is_blocked(label)
    }

    fn can_pivot(&self, out_row: usize, in_label: usize) -> bool {
        if !self.is_row_index(out_row) || !self.is_label(in_label) {
            return false;
        }
        let basis = self.state.basis();
        if basis.is_basic(in_label) || basis.is_blocked(in_label) {
            return false;
        }

        !self.tabdat[(out_row, self.remap(in_label))].is_zero()
    }

    fn pivot(&mut self, out_row: usize, in_label: usize) -> Result<(), TableauError> {
        if !self.can_pivot(out_row, in_label) {
            return Err(TableauError::BadPivot { row: out_row, label: in_label });
        }

        self.eliminate(out_row, self.remap(in_label))?;
        let out_label = self.state.basis().label_at(out_row);
        self.state.basis_mut().exchange(out_label, in_label)?;
        self.state.count_pivot();
        self.update_solution();
        trace!(
            "pivot {}: label {} replaced label {} in row {}, denominator {}",
            self.state.nr_pivots(), in_label, out_label, out_row, self.denom,
        );

        Ok(())
    }

    fn refactor(&mut self) -> Result<(), TableauError> {
        let (tabdat, coeff) = Self::scaled_data(
            self.state.matrix(),
            self.state.constraint_vector(),
            &self.totdenom,
        );
        self.tabdat = tabdat;
        self.coeff = coeff;
        self.denom = BigInt::one();

        // Replay the current basis. Each basic label goes to some still-free
        // row with a nonzero entry in its column; for a nonsingular basis
        // such a row always remains. The target rows recorded in the basis
        // are restored by a row permutation afterwards.
        let m = self.state.nr_rows();
        let targets = self.state.basis().basic_labels().enumerate().collect::<Vec<_>>();
        let mut landed = vec![0; m];
        let mut free = vec![true; m];
        for &(target, label) in &targets {
            let column = self.remap(label);
            let row = (0..m)
                .find(|&row| free[row] && !self.tabdat[(row, column)].is_zero())
                .ok_or(TableauError::Singular)?;
            self.eliminate(row, column)?;
            free[row] = false;
            landed[target] = row;
        }

        if landed.iter().enumerate().any(|(target, &row)| target != row) {
            let rows = (0..m)
                .map(|target| self.tabdat.row(landed[target]).cloned().collect())
                .collect();
            self.tabdat = DenseMatrix::from_data(rows);
            let coeff = (0..m).map(|target| self.coeff[landed[target]].clone()).collect();
            self.coeff = DenseVector::new(coeff);
        }

        self.update_solution();
        debug!("rebuilt exact tableau after {} pivots", self.state.nr_pivots());

        Ok(())
    }

    fn nr_pivots(&self) -> u64 {
        self.state.nr_pivots()
    }

    fn basis_vector(&self) -> &DenseVector<BigRational> {
        self.state.solution()
    }

    fn is_feasible(&self) -> bool {
        self.state.solution_is_feasible()
    }

    fn is_lex_min(&self) -> bool {
        let degenerate = (0..self.nr_rows())
            .filter(|&row| self.state.solution()[row].is_zero())
            .map(|row| (row, self.state.lex_key(self.label_at(row))))
            .collect::<Vec<_>>();
        if degenerate.is_empty() {
            return true;
        }

        let denom_negative = self.denom.is_negative();
        for label in 0..self.nr_labels() {
            if self.state.basis().is_basic(label) {
                continue;
            }
            let key = self.state.lex_key(label);
            let column = self.remap(label);
            let negative_entry = degenerate.iter()
                .filter(|&&(_, basic_key)| key < basic_key)
                .map(|&(row, _)| &self.tabdat[(row, column)])
                .any(|entry| !entry.is_zero() && entry.is_negative() != denom_negative);
            if negative_entry {
                return false;
            }
        }

        true
    }
}
