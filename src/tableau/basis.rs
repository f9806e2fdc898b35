//! # Basis bookkeeping
//!
//! An ordered bijection between the rows of a tableau and the labels of the
//! variables that are currently basic. All other labels are nonbasic. Labels
//! can be marked to bar them from entering the basis, which is how calling
//! algorithms express complementarity restrictions.
use crate::tableau::error::BasisError;

/// Maps the rows of a tableau onto basic variable labels and back.
///
/// Every label is either basic, occupying exactly one row, or nonbasic. The
/// mapping is mutated only through `exchange`, which swaps a single basic
/// label against a single nonbasic one.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Basis {
    /// The label occupying each row.
    row_to_label: Vec<usize>,
    /// Per label, the row it occupies, if any.
    location: Vec<Option<usize>>,
    /// Labels that may not enter the basis.
    blocked: Vec<bool>,
}

impl Basis {
    /// Create a basis from the labels initially occupying the rows.
    ///
    /// # Arguments
    ///
    /// * `initial`: One label per row, all distinct.
    /// * `nr_labels`: Size of the label space; every label is in
    ///   `0..nr_labels`.
    pub fn new(initial: Vec<usize>, nr_labels: usize) -> Self {
        debug_assert!(initial.iter().all(|&label| label < nr_labels));
        debug_assert!(initial.len() <= nr_labels);

        let mut location = vec![None; nr_labels];
        for (row, &label) in initial.iter().enumerate() {
            debug_assert!(location[label].is_none(), "duplicate basic label {}", label);
            location[label] = Some(row);
        }

        Self {
            row_to_label: initial,
            location,
            blocked: vec![false; nr_labels],
        }
    }

    /// The number of rows, which equals the number of basic labels.
    #[must_use]
    pub fn nr_rows(&self) -> usize {
        self.row_to_label.len()
    }

    /// Size of the label space.
    #[must_use]
    pub fn nr_labels(&self) -> usize {
        self.location.len()
    }

    /// Whether the label is currently basic.
    #[must_use]
    pub fn is_basic(&self, label: usize) -> bool {
        debug_assert!(label < self.nr_labels());

        self.location[label].is_some()
    }

    /// The row a basic label occupies, or `None` when the label is nonbasic.
    #[must_use]
    pub fn position_of(&self, label: usize) -> Option<usize> {
        debug_assert!(label < self.nr_labels());

        self.location[label]
    }

    /// The label occupying a row.
    #[must_use]
    pub fn label_at(&self, row: usize) -> usize {
        debug_assert!(row < self.nr_rows());

        self.row_to_label[row]
    }

    /// Iterate over the basic labels in row order.
    pub fn basic_labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.row_to_label.iter().copied()
    }

    /// Bar a label from entering the basis.
    ///
    /// A marked label is rejected by the pivot feasibility test regardless of
    /// any ratio test outcome. Marking a label that is currently basic only
    /// takes effect once it has left the basis.
    pub fn mark(&mut self, label: usize) {
        debug_assert!(label < self.nr_labels());

        self.blocked[label] = true;
    }

    /// Allow a label to enter the basis again.
    pub fn unmark(&mut self, label: usize) {
        debug_assert!(label < self.nr_labels());

        self.blocked[label] = false;
    }

    /// Whether the label is barred from entering the basis.
    #[must_use]
    pub fn is_blocked(&self, label: usize) -> bool {
        debug_assert!(label < self.nr_labels());

        self.blocked[label]
    }

    /// Swap a basic label against a nonbasic one.
    ///
    /// # Arguments
    ///
    /// * `out_label`: Label leaving the basis; must be basic.
    /// * `in_label`: Label entering the basis; must be nonbasic.
    ///
    /// # Return value
    ///
    /// The row where the swap took place, or a `BasisError` describing the
    /// contract violation. An error here indicates a logic error in the
    /// caller and should be treated as fatal.
    pub fn exchange(&mut self, out_label: usize, in_label: usize) -> Result<usize, BasisError> {
        debug_assert!(out_label < self.nr_labels());
        debug_assert!(in_label < self.nr_labels());

        let row = self.location[out_label].ok_or(BasisError::NotBasic(out_label))?;
        if self.location[in_label].is_some() {
            return Err(BasisError::AlreadyBasic(in_label));
        }

        self.row_to_label[row] = in_label;
        self.location[out_label] = None;
        self.location[in_label] = Some(row);

        Ok(row)
    }
}
