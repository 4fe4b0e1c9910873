//! Compiled directory filter
//!
//! [`FilterEngine`] turns [`FilterCriteria`] into a conjunction of rules and
//! runs it over a shelter collection. Output is always an order-preserving
//! subsequence of the input.

use crate::criteria::{FilterCriteria, RegionSelector};
use crate::rules::{
    CityFilter, CompositeFilter, FilterResult, FilterRule, FilterStats, FoundedFilter, Listing,
    NameFilter, RegionFilter,
};
use metrics::counter;
use pawconnect_core::types::ShelterRecord;
use std::sync::Arc;
use tracing::debug;

/// Conjunction of compiled filter rules.
#[derive(Clone, Default)]
pub struct FilterEngine {
    rules: Vec<Arc<dyn FilterRule>>,
}

impl FilterEngine {
    /// Creates an engine that passes every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles criteria into one rule per active criterion.
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut rules: Vec<Arc<dyn FilterRule>> = Vec::with_capacity(4);

        if !criteria.search.is_empty() {
            rules.push(Arc::new(NameFilter::new(&criteria.search)));
        }
        if let RegionSelector::Region(region) = &criteria.region {
            rules.push(Arc::new(RegionFilter::new(region.clone())));
        }
        if !criteria.city.is_empty() {
            rules.push(Arc::new(CityFilter::new(&criteria.city)));
        }
        if !criteria.established.is_all() {
            rules.push(Arc::new(FoundedFilter::new(criteria.established)));
        }

        Self { rules }
    }

    /// Adds a rule to the conjunction.
    pub fn with_rule(mut self, rule: Arc<dyn FilterRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Conjunction of two engines: a record must pass both.
    pub fn and(mut self, other: FilterEngine) -> Self {
        self.rules.extend(other.rules);
        self
    }

    /// Number of compiled rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// True when no rule is active.
    pub fn is_unconstrained(&self) -> bool {
        self.rules.is_empty()
    }

    /// Tests a single record.
    #[inline]
    pub fn matches(&self, record: &ShelterRecord) -> bool {
        self.matches_listing(record)
    }

    #[inline]
    pub(crate) fn matches_listing(&self, listing: &dyn Listing) -> bool {
        self.rules
            .iter()
            .all(|rule| rule.evaluate(listing).is_pass())
    }

    /// Filters records, keeping their relative order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a ShelterRecord>
    where
        I: IntoIterator<Item = &'a ShelterRecord>,
    {
        let mut stats = FilterStats::new();
        let mut visible = Vec::new();

        for record in records {
            let result = if self.matches(record) {
                visible.push(record);
                FilterResult::Pass
            } else {
                FilterResult::Block
            };
            stats.record(result);
        }

        counter!("pawconnect_filter_evaluations_total").increment(stats.total);
        counter!("pawconnect_filter_passes_total").increment(stats.passes);
        debug!(rules = self.rules.len(), %stats, "Directory filtered");

        visible
    }

    pub fn describe(&self) -> String {
        CompositeFilter::And(self.rules.clone()).describe()
    }
}

impl std::fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEngine")
            .field("rules", &self.describe())
            .finish()
    }
}

/// Narrows a shelter collection by the given criteria.
///
/// # Examples
///
/// ```
/// use pawconnect_filter::{filter_shelters, FilterCriteria};
///
/// let visible = filter_shelters(&[], &FilterCriteria::default());
/// assert!(visible.is_empty());
/// ```
pub fn filter_shelters<'a>(
    records: &'a [ShelterRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a ShelterRecord> {
    FilterEngine::from_criteria(criteria).apply(records)
}
