//! Decides which resources of a dataset are downloaded.
//!
//! Resources are evaluated in portal order:
//!
//! ```text
//! for resource in resources {
//!     1. years requested and all of them consumed -> stop (later resources are not inspected)
//!     2. first remaining year found in the name   -> consume it, year match
//!     3. dictionary excluded and name has "Dicion" -> skip
//!     4. keep if no years were requested, or on a year match
//! }
//! ```
//!
//! A year consumed in step 2 stays consumed even when step 3 skips the
//! resource, so a dictionary file can "use up" the year it mentions.

use crate::models::Resource;

/// Substring that marks a data dictionary resource.
pub const DICTIONARY_MARKER: &str = "Dicion";

/// Years still waiting for a matching resource within one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingYears {
    years: Vec<u32>,
}

impl RemainingYears {
    pub fn new(years: Vec<u32>) -> Self {
        Self { years }
    }

    pub fn is_exhausted(&self) -> bool {
        self.years.is_empty()
    }

    /// Consumes the first remaining year that appears in `name`.
    ///
    /// Returns the consumed year, or `None` when no remaining year matches.
    pub fn consume_match(&mut self, name: &str) -> Option<u32> {
        let position = self
            .years
            .iter()
            .position(|year| name.contains(&year.to_string()))?;
        Some(self.years.remove(position))
    }

    /// Years not matched yet, in request order.
    pub fn remaining(&self) -> &[u32] {
        &self.years
    }
}

/// Resource filter for one dataset.
///
/// Build a fresh selector for every dataset: [`select`](Self::select) consumes
/// it together with its remaining years.
///
/// # Examples
///
/// ```
/// use odufrn_core::{Resource, ResourceSelector};
///
/// let resource = |name: &str| Resource {
///     name: name.to_string(),
///     format: "CSV".to_string(),
///     url: format!("http://example.com/{name}.csv"),
/// };
/// let resources = vec![resource("R_2009"), resource("R_2010"), resource("R_2011")];
///
/// let kept = ResourceSelector::new(true, Some(vec![2009, 2011])).select(&resources);
/// let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
/// assert_eq!(names, vec!["R_2009", "R_2011"]);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceSelector {
    include_dictionary: bool,
    years: Option<RemainingYears>,
}

impl ResourceSelector {
    /// Creates a selector.
    ///
    /// `years: None` keeps every resource (subject to the dictionary flag).
    /// `years: Some(vec![])` keeps nothing.
    pub fn new(include_dictionary: bool, years: Option<Vec<u32>>) -> Self {
        Self {
            include_dictionary,
            years: years.map(RemainingYears::new),
        }
    }

    /// Returns the resources to download, in portal order.
    pub fn select(mut self, resources: &[Resource]) -> Vec<&Resource> {
        let mut kept = Vec::new();

        for resource in resources {
            if self.years.as_ref().is_some_and(RemainingYears::is_exhausted) {
                tracing::debug!(
                    resource = %resource.name,
                    "All requested years matched, skipping remaining resources"
                );
                break;
            }

            let year_match = self
                .years
                .as_mut()
                .and_then(|years| years.consume_match(&resource.name))
                .is_some();

            if !self.include_dictionary && resource.name.contains(DICTIONARY_MARKER) {
                continue;
            }

            if self.years.is_none() || year_match {
                kept.push(resource);
            }
        }

        kept
    }
}
