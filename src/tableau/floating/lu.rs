//! # LU factorization
//!
//! Decomposes the basis matrix `B` into `PB = LU` with partial pivoting, so
//! that linear systems in `B` and its transpose solve by substitution instead
//! of inversion. Basis changes are absorbed as product-form (eta) updates on
//! top of the factors; the eta file grows by one column per pivot and is
//! discarded when the factorization is rebuilt.
use crate::tableau::error::TableauError;

/// A single product-form update.
///
/// Records that the basis column at `row` was replaced by the column whose
/// representation with respect to the previous basis is `column`.
#[derive(Debug, Clone, PartialEq)]
struct Eta {
    row: usize,
    column: Vec<f64>,
}

/// The factors `L` and `U` of `PB`, plus the eta file of updates applied
/// since decomposition.
///
/// `L` is unit lower triangular and shares storage with `U`: the strict lower
/// triangle holds the elimination multipliers, diagonal and upper triangle
/// hold `U`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LuDecomposition {
    m: usize,
    /// Combined factors, row major.
    lu: Vec<Vec<f64>>,
    /// Row swapped with at each elimination step, encoding `P`.
    pivots: Vec<usize>,
    /// Updates since the last decomposition, oldest first.
    etas: Vec<Eta>,
}

impl LuDecomposition {
    /// The factorization of the identity basis.
    pub fn identity(m: usize) -> Self {
        debug_assert!(m > 0);

        let mut lu = vec![vec![0_f64; m]; m];
        for (i, row) in lu.iter_mut().enumerate() {
            row[i] = 1_f64;
        }

        Self {
            m,
            lu,
            pivots: (0..m).collect(),
            etas: Vec::new(),
        }
    }

    /// Decompose a basis matrix given by its columns.
    ///
    /// # Arguments
    ///
    /// * `columns`: The `m` columns of the basis matrix, each of length `m`.
    /// * `tiny`: Threshold below which a pivot candidate counts as zero.
    ///
    /// # Errors
    ///
    /// `TableauError::Singular` when no acceptable pivot remains, that is,
    /// when the matrix is singular up to `tiny`.
    pub fn decompose(columns: Vec<Vec<f64>>, tiny: f64) -> Result<Self, TableauError> {
        let m = columns.len();
        debug_assert!(m > 0);
        debug_assert!(columns.iter().all(|column| column.len() == m));

        let mut lu = vec![vec![0_f64; m]; m];
        for (j, column) in columns.iter().enumerate() {
            for (i, &value) in column.iter().enumerate() {
                lu[i][j] = value;
            }
        }

        let mut pivots = Vec::with_capacity(m);
        for k in 0..m {
            let mut p = k;
            for i in (k + 1)..m {
                if lu[i][k].abs() > lu[p][k].abs() {
                    p = i;
                }
            }
            if lu[p][k].abs() <= tiny {
                return Err(TableauError::Singular);
            }
            lu.swap(k, p);
            pivots.push(p);

            let pivot = lu[k][k];
            for i in (k + 1)..m {
                let factor = lu[i][k] / pivot;
                lu[i][k] = factor;
                for j in (k + 1)..m {
                    lu[i][j] -= factor * lu[k][j];
                }
            }
        }

        Ok(Self { m, lu, pivots, etas: Vec::new() })
    }

    /// The number of eta updates absorbed since decomposition.
    pub fn nr_updates(&self) -> usize {
        self.etas.len()
    }

    /// Absorb a basis change as an eta update.
    ///
    /// # Arguments
    ///
    /// * `column`: The entering column with respect to the current basis,
    ///   that is, the result of [`LuDecomposition::solve`] on the original
    ///   column.
    /// * `row`: The row of the leaving variable. `column[row]` is the pivot
    ///   element and must be nonzero.
    pub fn update(&mut self, column: Vec<f64>, row: usize) {
        debug_assert_eq!(column.len(), self.m);
        debug_assert!(row < self.m);
        debug_assert_ne!(column[row], 0_f64);

        self.etas.push(Eta { row, column });
    }

    /// Solve `B x = rhs` for the current basis `B`.
    pub fn solve(&self, rhs: &[f64]) -> Vec<f64> {
        debug_assert_eq!(rhs.len(), self.m);

        let mut x = rhs.to_vec();
        for (k, &p) in self.pivots.iter().enumerate() {
            x.swap(k, p);
        }

        for i in 1..self.m {
            let sum: f64 = (0..i).map(|j| self.lu[i][j] * x[j]).sum();
            x[i] -= sum;
        }
        for i in (0..self.m).rev() {
            let sum: f64 = ((i + 1)..self.m).map(|j| self.lu[i][j] * x[j]).sum();
            x[i] = (x[i] - sum) / self.lu[i][i];
        }

        for eta in &self.etas {
            let pivot_value = x[eta.row] / eta.column[eta.row];
            for (i, value) in eta.column.iter().enumerate() {
                if i != eta.row {
                    x[i] -= value * pivot_value;
                }
            }
            x[eta.row] = pivot_value;
        }

        x
    }

    /// Solve `y B = c` for the current basis `B`.
    pub fn solve_transpose(&self, c: &[f64]) -> Vec<f64> {
        debug_assert_eq!(c.len(), self.m);

        let mut y = c.to_vec();
        for eta in self.etas.iter().rev() {
            let sum: f64 = eta.column.iter()
                .enumerate()
                .filter(|&(i, _)| i != eta.row)
                .map(|(i, value)| y[i] * value)
                .sum();
            y[eta.row] = (y[eta.row] - sum) / eta.column[eta.row];
        }

        // U^T is lower triangular with the diagonal of U.
        for i in 0..self.m {
            let sum: f64 = (0..i).map(|j| self.lu[j][i] * y[j]).sum();
            y[i] = (y[i] - sum) / self.lu[i][i];
        }
        // L^T is unit upper triangular.
        for i in (0..self.m).rev() {
            let sum: f64 = ((i + 1)..self.m).map(|j| self.lu[j][i] * y[j]).sum();
            y[i] -= sum;
        }

        for (k, &p) in self.pivots.iter().enumerate().rev() {
            y.swap(k, p);
        }

        y
    }
}
