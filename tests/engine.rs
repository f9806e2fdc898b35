//! End-to-end scenarios driving both tableau implementations through the same
//! pivot sequences and comparing the outcomes.
use num_rational::BigRational;
use num_traits::ToPrimitive;

use retab::data::linear_algebra::{DenseMatrix, DenseVector};
use retab::tableau::{BaseTableau, ExactTableau, FloatTableau};

fn r(value: i64) -> BigRational {
    BigRational::from_integer(value.into())
}

fn float_problem() -> (DenseMatrix<f64>, DenseVector<f64>) {
    (
        DenseMatrix::from_data(vec![
            vec![1_f64, 1_f64],
            vec![1_f64, -1_f64],
        ]),
        DenseVector::new(vec![4_f64, 0_f64]),
    )
}

fn exact_problem() -> (DenseMatrix<BigRational>, DenseVector<BigRational>) {
    (
        DenseMatrix::from_data(vec![
            vec![r(1), r(1)],
            vec![r(1), r(-1)],
        ]),
        DenseVector::new(vec![r(4), r(0)]),
    )
}

/// The same pivot sequence yields the same solution in both modes, up to the
/// floating tolerance.
#[test]
fn modes_agree_on_the_same_pivot_sequence() {
    let (fa, fb) = float_problem();
    let mut floating = FloatTableau::new(&fa, &fb);
    let (ea, eb) = exact_problem();
    let mut exact = ExactTableau::new(&ea, &eb);

    for &(row, label) in &[(0, 0), (1, 1)] {
        assert_eq!(floating.can_pivot(row, label), exact.can_pivot(row, label));
        floating.pivot(row, label).unwrap();
        exact.pivot(row, label).unwrap();
    }

    for row in 0..2 {
        let exact_value = exact.basis_vector()[row].to_f64().unwrap();
        assert!((floating.basis_vector()[row] - exact_value).abs() < 1e-9);
    }

    // Both reach the solution of x + y = 4, x - y = 0.
    assert_eq!(exact.basis_vector(), &DenseVector::new(vec![r(2), r(2)]));
    assert!(floating.is_feasible() && exact.is_feasible());
    assert!(floating.artificials_cleared() && exact.artificials_cleared());
}

/// Marking a label blocks it from entering in either mode, no matter how
/// favorable the pivot element is.
#[test]
fn blocked_labels_are_rejected_in_both_modes() {
    let (fa, fb) = float_problem();
    let mut floating = FloatTableau::new(&fa, &fb);
    let (ea, eb) = exact_problem();
    let mut exact = ExactTableau::new(&ea, &eb);

    floating.mark(1);
    exact.mark(1);

    assert!(!floating.can_pivot(0, 1));
    assert!(!exact.can_pivot(0, 1));
    assert!(floating.pivot(0, 1).is_err());
    assert!(exact.pivot(0, 1).is_err());

    // Unrelated labels stay available.
    assert!(floating.can_pivot(0, 0));
    assert!(exact.can_pivot(0, 0));
}

/// A pivot followed by the reverse pivot restores the starting solution.
#[test]
fn pivots_reverse_in_both_modes() {
    let (fa, fb) = float_problem();
    let mut floating = FloatTableau::new(&fa, &fb);
    let (ea, eb) = exact_problem();
    let mut exact = ExactTableau::new(&ea, &eb);

    floating.pivot(0, 0).unwrap();
    floating.pivot(0, 2).unwrap();
    exact.pivot(0, 0).unwrap();
    exact.pivot(0, 2).unwrap();

    assert_eq!(exact.basis_vector(), &DenseVector::new(vec![r(4), r(0)]));
    for row in 0..2 {
        let exact_value = exact.basis_vector()[row].to_f64().unwrap();
        assert!((floating.basis_vector()[row] - exact_value).abs() < 1e-9);
    }
}

/// Complementarity-style pivoting: drive a basic label out by name and
/// extract the solution snapshot.
#[test]
fn comp_pivot_and_bfs_snapshot() {
    let (ea, eb) = exact_problem();
    let mut exact = ExactTableau::new(&ea, &eb);

    exact.comp_pivot(2, 0).unwrap();
    exact.comp_pivot(3, 1).unwrap();

    let bfs = exact.bfs();
    assert_eq!(bfs.len(), 2);
    assert_eq!(bfs.get(0), Some(&r(2)));
    assert_eq!(bfs.get(1), Some(&r(2)));
    // Nonbasic labels are implicitly zero.
    assert!(!bfs.contains(2) && !bfs.contains(3));

    // The snapshot is read-only: pivoting afterwards leaves it untouched.
    exact.comp_pivot(0, 2).unwrap();
    assert_eq!(bfs.get(0), Some(&r(2)));
}

/// Degenerate ties resolve to the same basis every time, and the lex-min test
/// agrees across modes.
#[test]
fn lexicographic_tie_breaking_is_consistent() {
    let fa = DenseMatrix::from_data(vec![
        vec![1_f64, 1_f64],
        vec![1_f64, -1_f64],
    ]);
    let fb = DenseVector::new(vec![0_f64, 0_f64]);
    let ea = DenseMatrix::from_data(vec![
        vec![r(1), r(1)],
        vec![r(1), r(-1)],
    ]);
    let eb = DenseVector::new(vec![r(0), r(0)]);

    for (row, expected) in [(0, true), (1, false)] {
        let mut floating = FloatTableau::new(&fa, &fb);
        floating.pivot(row, 0).unwrap();
        let mut exact = ExactTableau::new(&ea, &eb);
        exact.pivot(row, 0).unwrap();

        assert_eq!(floating.is_lex_min(), expected);
        assert_eq!(exact.is_lex_min(), expected);
    }
}

/// Refactorization in the floating mode reproduces the incremental state, and
/// is idempotent in both modes.
#[test]
fn refactor_converges_across_modes() {
    let (fa, fb) = float_problem();
    let mut floating = FloatTableau::new(&fa, &fb);
    let (ea, eb) = exact_problem();
    let mut exact = ExactTableau::new(&ea, &eb);

    for &(row, label) in &[(0, 0), (1, 1)] {
        floating.pivot(row, label).unwrap();
        exact.pivot(row, label).unwrap();
    }

    let incremental = floating.basis_vector().clone();
    floating.refactor().unwrap();
    for row in 0..2 {
        assert!((floating.basis_vector()[row] - incremental[row]).abs() < 1e-9);
    }

    exact.refactor().unwrap();
    let once = exact.basis_vector().clone();
    exact.refactor().unwrap();
    assert_eq!(exact.basis_vector(), &once);
}
