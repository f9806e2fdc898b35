//! # Basic feasible solutions
//!
//! A sparse snapshot of the values of the currently basic variables. Calling
//! solvers collect these while searching and compare them to deduplicate the
//! candidate solutions they find.
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

/// A sparse assignment of values to variable labels.
///
/// Contains the basic variables only; all other variables are implicitly
/// zero. Extraction is a read-only snapshot, so a `Bfs` stays valid when the
/// tableau it was taken from pivots on.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Bfs<F> {
    values: BTreeMap<usize, F>,
}

impl<F> Bfs<F> {
    /// Collect a snapshot from `(label, value)` pairs.
    pub fn new(values: impl IntoIterator<Item = (usize, F)>) -> Self {
        Self { values: values.into_iter().collect() }
    }

    /// The value of a label, or `None` when the label is not basic.
    #[must_use]
    pub fn get(&self, label: usize) -> Option<&F> {
        self.values.get(&label)
    }

    /// Whether a label is part of the assignment.
    #[must_use]
    pub fn contains(&self, label: usize) -> bool {
        self.values.contains_key(&label)
    }

    /// The number of basic variables in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(label, value)` pairs in label order.
    pub fn iter(&self) -> btree_map::Iter<usize, F> {
        self.values.iter()
    }
}

impl<F: Display> Display for Bfs<F> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.values.iter().map(|(label, value)| format!("{}: {}", label, value)).join(", "),
        )
    }
}
