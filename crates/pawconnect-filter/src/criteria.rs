//! Filter criteria for the shelter directory
//!
//! Criteria values come from a closed set of UI choices. Anything outside
//! that set degrades to "no constraint" instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Region sentinel meaning "no region constraint".
pub const ALL_STATES: &str = "All States";

/// Bracket sentinel meaning "no founding-year constraint".
pub const ALL_YEARS: &str = "All Years";

/// Canonical region choices, sentinel first.
pub const REGIONS: [&str; 13] = [
    ALL_STATES,
    "Andhra Pradesh",
    "Delhi",
    "Gujarat",
    "Karnataka",
    "Kerala",
    "Maharashtra",
    "Punjab",
    "Rajasthan",
    "Tamil Nadu",
    "Telangana",
    "Uttar Pradesh",
    "West Bengal",
];

/// Region constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegionSelector {
    /// The "All States" sentinel
    #[default]
    All,
    /// Exact, case-sensitive region name
    Region(String),
}

impl RegionSelector {
    /// Parses a selector value. The sentinel and blank input mean "any region".
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed == ALL_STATES {
            return RegionSelector::All;
        }
        if trimmed.is_empty() {
            if !value.is_empty() {
                debug!(value, "Blank region selector ignored");
            }
            return RegionSelector::All;
        }
        RegionSelector::Region(value.to_string())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RegionSelector::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RegionSelector::All => ALL_STATES,
            RegionSelector::Region(region) => region,
        }
    }
}

impl From<String> for RegionSelector {
    fn from(value: String) -> Self {
        RegionSelector::parse(&value)
    }
}

impl From<&str> for RegionSelector {
    fn from(value: &str) -> Self {
        RegionSelector::parse(value)
    }
}

impl From<RegionSelector> for String {
    fn from(selector: RegionSelector) -> Self {
        selector.as_str().to_string()
    }
}

impl fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Founding-year bracket.
///
/// The four brackets partition time into `[2020, 2024]`, `[2015, 2019]`,
/// `[2010, 2014]` and everything before 2010.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum YearBracket {
    /// The "All Years" sentinel
    #[default]
    All,
    From2020To2024,
    From2015To2019,
    From2010To2014,
    Before2010,
}

impl YearBracket {
    /// Selectable brackets in display order, sentinel first.
    pub const CHOICES: [YearBracket; 5] = [
        YearBracket::All,
        YearBracket::From2020To2024,
        YearBracket::From2015To2019,
        YearBracket::From2010To2014,
        YearBracket::Before2010,
    ];

    /// Parses a bracket label. Unknown labels mean "no constraint".
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "2020-2024" => YearBracket::From2020To2024,
            "2015-2019" => YearBracket::From2015To2019,
            "2010-2014" => YearBracket::From2010To2014,
            "Before 2010" => YearBracket::Before2010,
            "" | ALL_YEARS => YearBracket::All,
            other => {
                debug!(label = other, "Unrecognised founding-year bracket ignored");
                YearBracket::All
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            YearBracket::All => ALL_YEARS,
            YearBracket::From2020To2024 => "2020-2024",
            YearBracket::From2015To2019 => "2015-2019",
            YearBracket::From2010To2014 => "2010-2014",
            YearBracket::Before2010 => "Before 2010",
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, YearBracket::All)
    }

    /// Inclusive year bounds; `None` on a side means unbounded.
    pub fn bounds(&self) -> (Option<i32>, Option<i32>) {
        match self {
            YearBracket::All => (None, None),
            YearBracket::From2020To2024 => (Some(2020), Some(2024)),
            YearBracket::From2015To2019 => (Some(2015), Some(2019)),
            YearBracket::From2010To2014 => (Some(2010), Some(2014)),
            YearBracket::Before2010 => (None, Some(2009)),
        }
    }

    /// Whether a founding year lies inside the bracket.
    #[inline]
    pub fn contains(&self, year: i32) -> bool {
        let (low, high) = self.bounds();
        low.map_or(true, |low| year >= low) && high.map_or(true, |high| year <= high)
    }
}

impl From<String> for YearBracket {
    fn from(label: String) -> Self {
        YearBracket::parse(&label)
    }
}

impl From<&str> for YearBracket {
    fn from(label: &str) -> Self {
        YearBracket::parse(label)
    }
}

impl From<YearBracket> for String {
    fn from(bracket: YearBracket) -> Self {
        bracket.label().to_string()
    }
}

impl fmt::Display for YearBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the visitor has asked to see.
///
/// The default value is the "Clear All" state and matches every shelter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the shelter name
    pub search: String,
    /// Region selector, serialized as `state`
    #[serde(rename = "state")]
    pub region: RegionSelector,
    /// Case-insensitive substring of the city
    pub city: String,
    /// Founding-year bracket, serialized as `established`
    #[serde(rename = "established")]
    pub established: YearBracket,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<RegionSelector>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_established(mut self, bracket: impl Into<YearBracket>) -> Self {
        self.established = bracket.into();
        self
    }

    /// Whether any criterion narrows the directory.
    pub fn has_active_filters(&self) -> bool {
        !self.search.is_empty()
            || !self.region.is_all()
            || !self.city.is_empty()
            || !self.established.is_all()
    }
}

/// Choices offered by the directory sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<&'static str>,
    pub brackets: Vec<&'static str>,
}

/// Returns the region and bracket choices, sentinels first.
pub fn filter_options() -> FilterOptions {
    FilterOptions {
        regions: REGIONS.to_vec(),
        brackets: YearBracket::CHOICES.iter().map(|b| b.label()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_parse() {
        assert_eq!(YearBracket::parse("2015-2019"), YearBracket::From2015To2019);
        assert_eq!(YearBracket::parse("Before 2010"), YearBracket::Before2010);
        assert_eq!(YearBracket::parse("All Years"), YearBracket::All);
        assert_eq!(YearBracket::parse("1990s"), YearBracket::All);
        assert_eq!(YearBracket::parse(""), YearBracket::All);
    }

    #[test]
    fn test_bracket_bounds() {
        assert!(YearBracket::From2020To2024.contains(2020));
        assert!(YearBracket::From2020To2024.contains(2024));
        assert!(!YearBracket::From2020To2024.contains(2025));
        assert!(YearBracket::From2010To2014.contains(2010));
        assert!(!YearBracket::From2010To2014.contains(2015));
        assert!(YearBracket::Before2010.contains(2009));
        assert!(YearBracket::Before2010.contains(1950));
        assert!(!YearBracket::Before2010.contains(2010));
        assert!(YearBracket::All.contains(2099));
    }

    #[test]
    fn test_brackets_partition_years() {
        let brackets = &YearBracket::CHOICES[1..];
        for year in 1900..=2024 {
            let hits = brackets.iter().filter(|b| b.contains(year)).count();
            assert_eq!(hits, 1, "year {} matched {} brackets", year, hits);
        }
    }

    #[test]
    fn test_region_parse() {
        assert_eq!(RegionSelector::parse("All States"), RegionSelector::All);
        assert_eq!(RegionSelector::parse("   "), RegionSelector::All);
        assert_eq!(
            RegionSelector::parse("Delhi"),
            RegionSelector::Region("Delhi".to_string())
        );
    }

    #[test]
    fn test_default_has_no_active_filters() {
        let criteria = FilterCriteria::default();
        assert!(!criteria.has_active_filters());
        assert!(criteria.region.is_all());
        assert!(criteria.established.is_all());

        assert!(criteria.clone().with_city("pune").has_active_filters());
        assert!(criteria.with_established("Before 2010").has_active_filters());
    }

    #[test]
    fn test_criteria_deserialize() {
        let json = r#"{"search":"paw","state":"Karnataka","established":"2015-2019"}"#;
        let criteria: FilterCriteria = serde_json::from_str(json).unwrap();

        assert_eq!(criteria.search, "paw");
        assert_eq!(criteria.region, RegionSelector::Region("Karnataka".to_string()));
        assert_eq!(criteria.city, "");
        assert_eq!(criteria.established, YearBracket::From2015To2019);
    }

    #[test]
    fn test_criteria_deserialize_unknown_bracket() {
        let json = r#"{"established":"last week"}"#;
        let criteria: FilterCriteria = serde_json::from_str(json).unwrap();
        assert!(!criteria.has_active_filters());
    }

    #[test]
    fn test_filter_options() {
        let options = filter_options();
        assert_eq!(options.regions[0], ALL_STATES);
        assert_eq!(options.regions.len(), 13);
        assert_eq!(
            options.brackets,
            vec!["All Years", "2020-2024", "2015-2019", "2010-2014", "Before 2010"]
        );
    }
}
