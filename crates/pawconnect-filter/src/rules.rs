//! Filter rules for directory listings
//!
//! Each active criterion compiles to one rule. Rules can be composed with
//! [`CompositeFilter`].

use crate::criteria::YearBracket;
use pawconnect_core::types::{ShelterApplication, ShelterRecord};
use std::fmt;
use std::sync::Arc;

/// Result of a filter evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Listing passes the filter
    Pass,
    /// Listing is dropped by the filter
    Block,
}

impl FilterResult {
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterResult::Pass)
    }

    #[inline]
    pub fn is_block(&self) -> bool {
        matches!(self, FilterResult::Block)
    }

    #[inline]
    fn from_bool(pass: bool) -> Self {
        if pass {
            FilterResult::Pass
        } else {
            FilterResult::Block
        }
    }
}

/// Fields a rule can look at.
pub trait Listing {
    fn name(&self) -> &str;
    fn city(&self) -> &str;
    fn region(&self) -> &str;
    fn established_year(&self) -> Option<i32>;
}

impl Listing for ShelterRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn city(&self) -> &str {
        &self.city
    }

    fn region(&self) -> &str {
        &self.state
    }

    fn established_year(&self) -> Option<i32> {
        self.established_year
    }
}

impl Listing for ShelterApplication {
    fn name(&self) -> &str {
        &self.name
    }

    fn city(&self) -> &str {
        &self.city
    }

    fn region(&self) -> &str {
        &self.state
    }

    fn established_year(&self) -> Option<i32> {
        self.established_year
    }
}

/// Trait for filter rules
pub trait FilterRule: Send + Sync {
    /// Evaluate the rule against a listing
    fn evaluate(&self, listing: &dyn Listing) -> FilterResult;

    /// Human-readable description of this rule
    fn describe(&self) -> String;
}

/// Case-insensitive substring match, with the needle already lowercased.
#[inline]
fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Matches listings whose name contains the query, ignoring case.
#[derive(Debug, Clone)]
pub struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }
}

impl FilterRule for NameFilter {
    #[inline]
    fn evaluate(&self, listing: &dyn Listing) -> FilterResult {
        FilterResult::from_bool(contains_folded(listing.name(), &self.needle))
    }

    fn describe(&self) -> String {
        format!("NameFilter(contains: {:?})", self.needle)
    }
}

/// Matches listings whose city contains the query, ignoring case.
#[derive(Debug, Clone)]
pub struct CityFilter {
    needle: String,
}

impl CityFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }
}

impl FilterRule for CityFilter {
    #[inline]
    fn evaluate(&self, listing: &dyn Listing) -> FilterResult {
        FilterResult::from_bool(contains_folded(listing.city(), &self.needle))
    }

    fn describe(&self) -> String {
        format!("CityFilter(contains: {:?})", self.needle)
    }
}

/// Exact, case-sensitive region match.
#[derive(Debug, Clone)]
pub struct RegionFilter {
    region: String,
}

impl RegionFilter {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

impl FilterRule for RegionFilter {
    #[inline]
    fn evaluate(&self, listing: &dyn Listing) -> FilterResult {
        FilterResult::from_bool(listing.region() == self.region)
    }

    fn describe(&self) -> String {
        format!("RegionFilter(equals: {:?})", self.region)
    }
}

/// Founding-year bracket match. Listings without a year never pass.
#[derive(Debug, Clone)]
pub struct FoundedFilter {
    bracket: YearBracket,
}

impl FoundedFilter {
    pub fn new(bracket: YearBracket) -> Self {
        Self { bracket }
    }
}

impl FilterRule for FoundedFilter {
    #[inline]
    fn evaluate(&self, listing: &dyn Listing) -> FilterResult {
        match listing.established_year() {
            Some(year) => FilterResult::from_bool(self.bracket.contains(year)),
            None => FilterResult::Block,
        }
    }

    fn describe(&self) -> String {
        format!("FoundedFilter(bracket: {})", self.bracket)
    }
}

/// Composite filter that combines rules with AND/OR logic
///
/// An empty `And` passes everything; an empty `Or` passes nothing.
#[derive(Clone)]
pub enum CompositeFilter {
    /// All rules must pass
    And(Vec<Arc<dyn FilterRule>>),
    /// At least one rule must pass
    Or(Vec<Arc<dyn FilterRule>>),
}

impl FilterRule for CompositeFilter {
    fn evaluate(&self, listing: &dyn Listing) -> FilterResult {
        match self {
            CompositeFilter::And(rules) => {
                for rule in rules {
                    if rule.evaluate(listing).is_block() {
                        return FilterResult::Block;
                    }
                }
                FilterResult::Pass
            }
            CompositeFilter::Or(rules) => {
                for rule in rules {
                    if rule.evaluate(listing).is_pass() {
                        return FilterResult::Pass;
                    }
                }
                FilterResult::Block
            }
        }
    }

    fn describe(&self) -> String {
        let (op, rules) = match self {
            CompositeFilter::And(rules) => ("AND", rules),
            CompositeFilter::Or(rules) => ("OR", rules),
        };
        let descriptions: Vec<_> = rules.iter().map(|r| r.describe()).collect();
        format!("{}({})", op, descriptions.join(", "))
    }
}

/// Statistics for a filter pass
#[derive(Debug, Clone, Default)]
pub struct FilterStats {
    pub total: u64,
    pub passes: u64,
    pub blocks: u64,
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: FilterResult) {
        self.total += 1;
        match result {
            FilterResult::Pass => self.passes += 1,
            FilterResult::Block => self.blocks += 1,
        }
    }

    /// Pass rate as a percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passes as f64 / self.total as f64) * 100.0
        }
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterStats(total: {}, passes: {}, blocks: {}, pass_rate: {:.2}%)",
            self.total,
            self.passes,
            self.blocks,
            self.pass_rate()
        )
    }
}
