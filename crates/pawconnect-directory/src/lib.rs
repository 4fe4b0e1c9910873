//! Shelter directory storage and review workflow
//!
//! - [`DirectorySource`]: read access used by the public directory
//! - [`MemoryDirectory`]: the in-memory store behind it, which also accepts
//!   registrations and profile edits
//! - [`ReviewWorkflow`]: administrator approval and rejection
//! - [`seed`]: YAML seed data, including the bundled sample shelters

pub mod seed;
pub mod source;
pub mod store;
pub mod workflow;

pub use seed::{builtin_seed, load_seed_file, parse_seed};
pub use source::{load_directory, DirectorySource, DirectoryView};
pub use store::{DirectoryStats, MemoryDirectory};
pub use workflow::{ReviewDecision, ReviewWorkflow};
