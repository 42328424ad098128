//! In-memory catalogs of package, group and tag names.
//!
//! A catalog is loaded once from the portal's `*_list` action and kept until
//! it is explicitly replaced. Lookups never trigger a refresh.

use std::collections::HashSet;

use crate::models::EntityKind;

/// Ordered list of names for one [`EntityKind`], with a hash index for lookups.
#[derive(Debug, Clone)]
pub struct Catalog {
    kind: EntityKind,
    names: Vec<String>,
    index: HashSet<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
            index: HashSet::new(),
        }
    }

    /// Creates a catalog from names in portal order.
    ///
    /// Duplicated names are kept once, at their first position.
    pub fn from_names(kind: EntityKind, names: Vec<String>) -> Self {
        let mut catalog = Self::new(kind);
        catalog.replace(names);
        catalog
    }

    /// Replaces the cached names.
    pub fn replace(&mut self, names: Vec<String>) {
        self.index.clear();
        self.names.clear();
        for name in names {
            if self.index.insert(name.clone()) {
                self.names.push(name);
            }
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Names in portal order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
