use std::collections::btree_set;
use std::collections::BTreeSet;

/// A set of column names.
///
/// Headers describe which columns a table has (or has of a given type)
/// without touching any data. They are plain values: mutating a header
/// returned by a table never affects the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnHeader {
    names: BTreeSet<String>,
}

impl ColumnHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Column names in ascending order.
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.names.iter()
    }

    /// Union with `other`.
    pub fn and(mut self, other: &ColumnHeader) -> Self {
        self.names.extend(other.names.iter().cloned());
        self
    }

    /// Difference with `other`.
    pub fn except(mut self, other: &ColumnHeader) -> Self {
        self.names.retain(|n| !other.contains(n));
        self
    }

    /// Removes the given names.
    pub fn except_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        for name in names {
            self.names.remove(name.as_ref());
        }
        self
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnHeader {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for ColumnHeader {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a ColumnHeader {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
