//! Column sets and ordered attribute lists exchanged between planner and executor.

use std::collections::BTreeSet;
use std::ops::Deref;

/// Ordinals a scan has to fetch.
///
/// The whole-row marker requests every live column regardless of the listed ordinals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedColumnSet {
    whole_row: bool,
    ordinals: BTreeSet<usize>,
}

impl UsedColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn whole_row() -> Self {
        Self {
            whole_row: true,
            ordinals: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, ordinal: usize) -> bool {
        self.ordinals.insert(ordinal)
    }

    pub fn mark_whole_row(&mut self) {
        self.whole_row = true;
    }

    pub fn is_whole_row(&self) -> bool {
        self.whole_row
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        self.whole_row || self.ordinals.contains(&ordinal)
    }

    /// Explicitly listed ordinals, ascending.
    pub fn ordinals(&self) -> impl Iterator<Item = usize> + '_ {
        self.ordinals.iter().copied()
    }
}

impl FromIterator<usize> for UsedColumnSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            whole_row: false,
            ordinals: iter.into_iter().collect(),
        }
    }
}

macro_rules! attribute_list {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name(Vec<usize>);

        impl $name {
            pub fn new(ordinals: Vec<usize>) -> Self {
                Self(ordinals)
            }

            pub fn into_inner(self) -> Vec<usize> {
                self.0
            }
        }

        impl Deref for $name {
            type Target = [usize];

            fn deref(&self) -> &[usize] {
                &self.0
            }
        }

        impl From<Vec<usize>> for $name {
            fn from(ordinals: Vec<usize>) -> Self {
                Self(ordinals)
            }
        }

        impl FromIterator<usize> for $name {
            fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }
    };
}

attribute_list!(
    /// Ordinals in remote result column order.
    ///
    /// Its length equals the remote column count, except for a statement that
    /// selects nothing: the list is empty and the remote row carries one `NULL`.
    RetrievedAttrs
);

attribute_list!(
    /// Ordinals a write binds, in placeholder order.
    TargetAttrs
);

impl RetrievedAttrs {
    /// Number of columns each remote row must carry.
    pub fn expected_remote_columns(&self) -> usize {
        self.0.len().max(1)
    }
}
