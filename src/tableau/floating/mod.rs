//! # Floating tableau
//!
//! Tableau over `f64` arithmetic. The basis matrix is kept factorized; each
//! pivot appends a product-form update to the factorization, so solving for
//! the current solution stays cheap. Updates accumulate rounding error, which
//! is why the factorization is periodically rebuilt from the original problem
//! data, either on demand or automatically after a configurable number of
//! pivots.
use log::{debug, trace};

use crate::data::linear_algebra::{DenseMatrix, DenseVector};
use crate::tableau::{BaseTableau, TableauState};
use crate::tableau::basis::Basis;
use crate::tableau::error::TableauError;
use crate::tableau::floating::lu::LuDecomposition;

mod lu;

/// Tableau computing with floating point numbers and a factorized basis.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatTableau<'a> {
    state: TableauState<'a, f64>,
    /// Factorization of the current basis matrix.
    lu: LuDecomposition,
    /// Automatic refactorization threshold; `0` leaves the cadence to the
    /// caller.
    refactor_every: u64,
}

impl<'a> FloatTableau<'a> {
    /// Create a tableau with the unit columns basic.
    ///
    /// The unit columns receive the labels `a.nr_columns()..a.nr_columns() +
    /// a.nr_rows()` and are recorded as artificial.
    ///
    /// # Arguments
    ///
    /// * `a`: Constraint matrix, borrowed for the lifetime of the tableau.
    /// * `b`: Right-hand side of length `a.nr_rows()`.
    pub fn new(a: &'a DenseMatrix<f64>, b: &'a DenseVector<f64>) -> Self {
        Self::with_artificials(a, Vec::new(), b)
    }

    /// Create a tableau that treats the given structural labels as artificial
    /// as well.
    ///
    /// # Arguments
    ///
    /// * `a`: Constraint matrix.
    /// * `artificial`: Structural labels that are artificial in the caller's
    ///   formulation.
    /// * `b`: Right-hand side.
    pub fn with_artificials(
        a: &'a DenseMatrix<f64>,
        artificial: Vec<usize>,
        b: &'a DenseVector<f64>,
    ) -> Self {
        let mut state = TableauState::new(a, b, artificial);
        state.set_solution(b.clone());

        Self {
            state,
            lu: LuDecomposition::identity(a.nr_rows()),
            refactor_every: 0,
        }
    }

    /// Create a tableau starting from an explicit basis.
    ///
    /// # Arguments
    ///
    /// * `basis`: One label per row.
    ///
    /// # Errors
    ///
    /// `TableauError::Singular` when the selected columns do not form a
    /// basis.
    pub fn with_basis(
        a: &'a DenseMatrix<f64>,
        b: &'a DenseVector<f64>,
        basis: Vec<usize>,
    ) -> Result<Self, TableauError> {
        let mut tableau = Self::new(a, b);
        tableau.set_basis(basis)?;
        Ok(tableau)
    }

    /// Replace the entire basis and refactorize.
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

    /// Refactorize automatically after every `every` pivots.
    ///
    /// Passing `0` disables automatic refactorization; the caller is then
    /// expected to invoke [`BaseTableau::refactor`] itself, as the eta file
    /// and its rounding error grow without bound otherwise.
    pub fn set_refactor(&mut self, every: u64) {
        self.refactor_every = every;
    }

    /// Override the zero-classification and sign-test tolerances.
    pub fn set_epsilon(&mut self, eps1: f64, eps2: f64) {
        self.state.set_epsilon(eps1, eps2);
    }

    /// The current basis.
    pub fn basis(&self) -> &Basis {
        self.state.basis()
    }

    /// Whether every artificial variable is nonbasic or at value zero.
    ///
    /// Only when this holds does the current solution say anything about the
    /// underlying problem.
    pub fn artificials_cleared(&self) -> bool {
        self.state.artificials_cleared()
    }

    /// The column of the original problem belonging to a label.
    pub fn get_column(&self, label: usize) -> DenseVector<f64> {
        DenseVector::new(self.state.original_column(label))
    }

    /// Solve `B x = rhs` for the current basis matrix `B`.
    pub fn solve(&self, rhs: &DenseVector<f64>) -> DenseVector<f64> {
        DenseVector::new(self.lu.solve(&rhs.data))
    }

    /// Solve `y B = c` for the current basis matrix `B`.
    pub fn solve_transpose(&self, c: &DenseVector<f64>) -> DenseVector<f64> {
        DenseVector::new(self.lu.solve_transpose(&c.data))
    }

    /// The column of a label with respect to the current basis.
    pub fn solve_column(&self, label: usize) -> DenseVector<f64> {
        debug_assert!(label < self.state.nr_labels());

        self.solve(&self.get_column(label))
    }

    fn update_solution(&mut self) {
        let solution = self.lu.solve(&self.state.constraint_vector().data);
        self.state.set_solution(DenseVector::new(solution));
    }
}

impl<'a> BaseTableau for FloatTableau<'a> {
    type Value = f64;

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

        let column = self.lu.solve(&self.state.original_column(in_label));
        !self.state.eq_zero(&column[out_row])
    }

    fn pivot(&mut self, out_row: usize, in_label: usize) -> Result<(), TableauError> {
        if !self.can_pivot(out_row, in_label) {
            return Err(TableauError::BadPivot { row: out_row, label: in_label });
        }

        let column = self.lu.solve(&self.state.original_column(in_label));
        let out_label = self.state.basis().label_at(out_row);
        self.state.basis_mut().exchange(out_label, in_label)?;
        self.lu.update(column, out_row);
        self.state.count_pivot();
        self.update_solution();
        trace!(
            "pivot {}: label {} replaced label {} in row {}",
            self.state.nr_pivots(), in_label, out_label, out_row,
        );

        if self.refactor_every > 0 && self.lu.nr_updates() as u64 >= self.refactor_every {
            self.refactor()?;
        }

        Ok(())
    }

    fn refactor(&mut self) -> Result<(), TableauError> {
        let columns = self.state.basis()
            .basic_labels()
            .map(|label| self.state.original_column(label))
            .collect();
        self.lu = LuDecomposition::decompose(columns, self.state.zero_tolerance())?;
        self.update_solution();
        debug!("refactorized after {} pivots", self.state.nr_pivots());

        Ok(())
    }

    fn nr_pivots(&self) -> u64 {
        self.state.nr_pivots()
    }

    fn basis_vector(&self) -> &DenseVector<f64> {
        self.state.solution()
    }

    fn is_feasible(&self) -> bool {
        self.state.solution_is_feasible()
    }

    fn is_lex_min(&self) -> bool {
        let degenerate = (0..self.nr_rows())
            .filter(|&row| self.state.eq_zero(&self.state.solution()[row]))
            .map(|row| (row, self.state.lex_key(self.label_at(row))))
            .collect::<Vec<_>>();
        if degenerate.is_empty() {
            return true;
        }

        for label in 0..self.nr_labels() {
            if self.state.basis().is_basic(label) {
                continue;
            }
            let key = self.state.lex_key(label);
            let rows = degenerate.iter()
                .filter(|&&(_, basic_key)| key < basic_key)
                .map(|&(row, _)| row)
                .collect::<Vec<_>>();
            if rows.is_empty() {
                continue;
            }

            let column = self.lu.solve(&self.state.original_column(label));
            if rows.into_iter().any(|row| self.state.lt_zero(&column[row])) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_algebra::{DenseMatrix, DenseVector};
    use crate::tableau::{BaseTableau, FloatTableau};
    use crate::tableau::error::TableauError;

    fn problem() -> (DenseMatrix<f64>, DenseVector<f64>) {
        (
            DenseMatrix::from_data(vec![
                vec![1_f64, 1_f64],
                vec![1_f64, -1_f64],
            ]),
            DenseVector::new(vec![4_f64, 0_f64]),
        )
    }

    fn assert_close(solution: &DenseVector<f64>, expected: &[f64]) {
        assert_eq!(solution.len(), expected.len());
        for (value, expected) in solution.iter().zip(expected) {
            assert!((value - expected).abs() < 1e-9, "{} != {}", value, expected);
        }
    }

    #[test]
    fn initial_state() {
        let (a, b) = problem();
        let tableau = FloatTableau::new(&a, &b);

        assert_eq!(tableau.nr_rows(), 2);
        assert_eq!(tableau.nr_labels(), 4);
        assert!(tableau.is_basic(2) && tableau.is_basic(3));
        assert_close(tableau.basis_vector(), &[4_f64, 0_f64]);
        assert!(!tableau.artificials_cleared());
        assert_eq!(tableau.nr_pivots(), 0);
    }

    #[test]
    fn pivot_to_structural_basis() {
        let (a, b) = problem();
        let mut tableau = FloatTableau::new(&a, &b);

        assert!(tableau.can_pivot(0, 0));
        tableau.pivot(0, 0).unwrap();
        tableau.pivot(1, 1).unwrap();

        // x + y = 4, x - y = 0.
        assert_close(tableau.basis_vector(), &[2_f64, 2_f64]);
        assert_eq!(tableau.nr_pivots(), 2);
        assert!(tableau.is_feasible());
        assert!(tableau.artificials_cleared());

        let bfs = tableau.bfs();
        assert!((bfs.get(0).unwrap() - 2_f64).abs() < 1e-9);
        assert!((bfs.get(1).unwrap() - 2_f64).abs() < 1e-9);
        assert_eq!(bfs.get(2), None);
    }

    #[test]
    fn pivot_is_reversible() {
        let (a, b) = problem();
        let mut tableau = FloatTableau::new(&a, &b);

        tableau.pivot(0, 0).unwrap();
        tableau.pivot(0, 2).unwrap();

        assert_close(tableau.basis_vector(), &[4_f64, 0_f64]);
        assert!(tableau.is_basic(2) && tableau.is_basic(3));
    }

    #[test]
    fn blocked_label_cannot_enter() {
        let (a, b) = problem();
        let mut tableau = FloatTableau::new(&a, &b);

        tableau.mark(0);
        assert!(!tableau.can_pivot(0, 0));
        assert_eq!(
            tableau.pivot(0, 0),
            Err(TableauError::BadPivot { row: 0, label: 0 }),
        );

        tableau.unmark(0);
        assert!(tableau.can_pivot(0, 0));
    }

    #[test]
    fn pivot_on_zero_element_is_rejected() {
        let a = DenseMatrix::from_data(vec![
            vec![1_f64, 0_f64],
            vec![0_f64, 1_f64],
        ]);
        let b = DenseVector::new(vec![1_f64, 1_f64]);
        let mut tableau = FloatTableau::new(&a, &b);

        // Column 1 has a zero in row 0.
        assert!(!tableau.can_pivot(0, 1));
        assert!(tableau.pivot(0, 1).is_err());
    }

    #[test]
    fn refactor_is_idempotent() {
        let (a, b) = problem();
        let mut tableau = FloatTableau::new(&a, &b);
        tableau.pivot(0, 0).unwrap();
        tableau.pivot(1, 1).unwrap();

        tableau.refactor().unwrap();
        let first = tableau.basis_vector().clone();
        tableau.refactor().unwrap();

        assert_close(&first, &[2_f64, 2_f64]);
        assert_close(tableau.basis_vector(), &first.data);
    }

    #[test]
    fn automatic_refactorization_keeps_solution() {
        let (a, b) = problem();
        let mut tableau = FloatTableau::new(&a, &b);
        tableau.set_refactor(1);

        tableau.pivot(0, 0).unwrap();
        tableau.pivot(1, 1).unwrap();

        assert_close(tableau.basis_vector(), &[2_f64, 2_f64]);
    }

    #[test]
    fn solve_and_solve_transpose() {
        let (a, b) = problem();
        let mut tableau = FloatTableau::new(&a, &b);
        tableau.pivot(0, 0).unwrap();
        tableau.pivot(1, 1).unwrap();

        // B = A for this basis.
        let x = tableau.solve(&DenseVector::new(vec![2_f64, 0_f64]));
        assert_close(&x, &[1_f64, 1_f64]);

        let y = tableau.solve_transpose(&DenseVector::new(vec![2_f64, 0_f64]));
        assert_close(&y, &[1_f64, 1_f64]);

        // The column of a basic label is a unit vector.
        let column = tableau.solve_column(0);
        assert_close(&column, &[1_f64, 0_f64]);
    }

    #[test]
    fn comp_pivot_by_label() {
        let (a, b) = problem();
        let mut tableau = FloatTableau::new(&a, &b);

        tableau.comp_pivot(2, 0).unwrap();
        assert!(tableau.is_basic(0));
        assert!(!tableau.is_basic(2));

        // Pivoting out a label that is not basic is a contract violation.
        assert!(tableau.comp_pivot(2, 1).is_err());
    }

    #[test]
    fn lex_min_prefers_lowest_tied_row() {
        let a = DenseMatrix::from_data(vec![
            vec![1_f64, 1_f64],
            vec![1_f64, -1_f64],
        ]);
        let b = DenseVector::new(vec![0_f64, 0_f64]);

        // Both rows are degenerate, so rows 0 and 1 tie in any ratio test for
        // column 0. Entering at row 0 keeps the basis lexico-minimal.
        let mut tableau = FloatTableau::new(&a, &b);
        tableau.pivot(0, 0).unwrap();
        assert!(tableau.is_lex_min());

        // Entering at row 1 does not.
        let mut tableau = FloatTableau::new(&a, &b);
        tableau.pivot(1, 0).unwrap();
        assert!(!tableau.is_lex_min());
    }

    #[test]
    fn lex_min_is_deterministic() {
        let a = DenseMatrix::from_data(vec![
            vec![1_f64, 1_f64],
            vec![1_f64, -1_f64],
        ]);
        let b = DenseVector::new(vec![0_f64, 0_f64]);
        let mut tableau = FloatTableau::new(&a, &b);
        tableau.pivot(0, 0).unwrap();

        let first = tableau.is_lex_min();
        assert!((0..10).all(|_| tableau.is_lex_min() == first));
    }

    #[test]
    fn explicit_basis() {
        let (a, b) = problem();
        let tableau = FloatTableau::with_basis(&a, &b, vec![0, 1]).unwrap();

        assert_close(tableau.basis_vector(), &[2_f64, 2_f64]);

        // Two identical columns cannot form a basis.
        let a = DenseMatrix::from_data(vec![
            vec![1_f64, 1_f64],
            vec![2_f64, 2_f64],
        ]);
        let b = DenseVector::new(vec![1_f64, 2_f64]);
        assert_eq!(
            FloatTableau::with_basis(&a, &b, vec![0, 1]).err(),
            Some(TableauError::Singular),
        );
    }
}
