//! Directory filtering for PawConnect
//!
//! Narrows the public shelter directory by search text, region, city and
//! founding-year bracket, and the administrator's application queue by
//! search text and review status.
//!
//! Filtering is pure: it never touches the network or storage, never mutates
//! its input and never fails. Criteria values outside the closed UI choice set
//! apply no constraint.
//!
//! # Examples
//!
//! ```rust
//! use pawconnect_core::types::{Contact, ShelterId, ShelterRecord};
//! use pawconnect_filter::{filter_shelters, FilterCriteria};
//!
//! let records = vec![ShelterRecord {
//!     id: ShelterId::from("2"),
//!     name: "Delhi Animal Rescue".to_string(),
//!     city: "New Delhi".to_string(),
//!     state: "Delhi".to_string(),
//!     description: String::new(),
//!     image: String::new(),
//!     contact: Contact {
//!         email: "help@delhianimalrescue.org".to_string(),
//!         phone: "+91 98765 43211".to_string(),
//!         website: None,
//!     },
//!     verified: true,
//!     established_year: Some(2018),
//! }];
//!
//! let criteria = FilterCriteria::new()
//!     .with_region("Delhi")
//!     .with_established("2015-2019");
//! assert_eq!(filter_shelters(&records, &criteria).len(), 1);
//! ```

pub mod applications;
pub mod criteria;
pub mod engine;
pub mod rules;

pub use applications::{filter_applications, ApplicationCriteria, StatusSelector};
pub use criteria::{
    filter_options, FilterCriteria, FilterOptions, RegionSelector, YearBracket, ALL_STATES,
    ALL_YEARS, REGIONS,
};
pub use engine::{filter_shelters, FilterEngine};
pub use rules::{CompositeFilter, FilterResult, FilterRule, FilterStats, Listing};
