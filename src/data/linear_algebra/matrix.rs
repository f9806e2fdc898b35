//! # Dense matrix
//!
//! Row-major dense matrix over a generic scalar. Dimensions are fixed at
//! creation.
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Index, IndexMut};
use std::slice::Iter;

use num_traits::{One, Zero};

/// Uses a `Vec<Vec<F>>` as underlying data structure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DenseMatrix<F> {
    data: Vec<Vec<F>>,
    nr_rows: usize,
    nr_columns: usize,
}

impl<F> DenseMatrix<F> {
    /// Create a `DenseMatrix` from the provided rows.
    ///
    /// # Arguments
    ///
    /// * `data`: Rows of equal length. The matrix dimensions are derived from
    ///   them.
    pub fn from_data(data: Vec<Vec<F>>) -> Self {
        let nr_rows = data.len();
        let nr_columns = data.first().map_or(0, Vec::len);
        debug_assert!(data.iter().all(|row| row.len() == nr_columns));

        Self { data, nr_rows, nr_columns }
    }

    /// Get all values in column `j` of this matrix.
    pub fn column(&self, j: usize) -> Vec<F>
    where
        F: Clone,
    {
        debug_assert!(j < self.nr_columns);

        self.data.iter().map(|row| row[j].clone()).collect()
    }

    /// Iterate over the values in row `i` of this matrix.
    pub fn row(&self, i: usize) -> Iter<F> {
        debug_assert!(i < self.nr_rows);

        self.data[i].iter()
    }

    /// The number of rows of this matrix.
    #[must_use]
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// The number of columns of this matrix.
    #[must_use]
    pub fn nr_columns(&self) -> usize {
        self.nr_columns
    }
}

impl<F: Zero + Clone> DenseMatrix<F> {
    /// Create a dense matrix of zeros of dimension `rows` x `columns`.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        debug_assert!(rows > 0);
        debug_assert!(columns > 0);

        Self {
            data: vec![vec![F::zero(); columns]; rows],
            nr_rows: rows,
            nr_columns: columns,
        }
    }
}

impl<F: Zero + One + Clone> DenseMatrix<F> {
    /// Create a dense square identity matrix of size `len`.
    pub fn identity(len: usize) -> Self {
        debug_assert!(len > 0);

        let mut matrix = Self::zeros(len, len);
        for i in 0..len {
            matrix[(i, i)] = F::one();
        }

        matrix
    }
}

impl<F> Index<(usize, usize)> for DenseMatrix<F> {
    type Output = F;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        debug_assert!(i < self.nr_rows && j < self.nr_columns);

        &self.data[i][j]
    }
}

impl<F> IndexMut<(usize, usize)> for DenseMatrix<F> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        debug_assert!(i < self.nr_rows && j < self.nr_columns);

        &mut self.data[i][j]
    }
}

impl<F: Display> Display for DenseMatrix<F> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for row in &self.data {
            for value in row {
                write!(f, "{}\t", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::DenseMatrix;

    fn matrix() -> DenseMatrix<i32> {
        DenseMatrix::from_data(vec![
            vec![1, 2, 0],
            vec![0, 5, 6],
        ])
    }

    #[test]
    fn dimensions() {
        let m = matrix();

        assert_eq!(m.nr_rows(), 2);
        assert_eq!(m.nr_columns(), 3);
    }

    #[test]
    fn index() {
        let m = matrix();

        assert_eq!(m[(0, 1)], 2);
        assert_eq!(m[(1, 2)], 6);
    }

    #[test]
    fn column() {
        let m = matrix();

        assert_eq!(m.column(1), vec![2, 5]);
    }

    #[test]
    fn identity() {
        let m = DenseMatrix::<i32>::identity(2);

        assert_eq!(m[(0, 0)], 1);
        assert_eq!(m[(0, 1)], 0);
        assert_eq!(m[(1, 0)], 0);
        assert_eq!(m[(1, 1)], 1);
    }
}
