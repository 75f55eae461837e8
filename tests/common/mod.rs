//! Common test infrastructure
//!
//! Every test gets its own [`TestWorkspace`]: a temporary directory holding the
//! vote files, the database and both backup directories, plus the resolved
//! configuration pointing at them.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestWorkspace, PARIS_ID};
//!
//! #[test]
//! fn test_migrate() {
//!     let workspace = TestWorkspace::with_sample_votes();
//!     let report = city_votes_tools::migrate(&workspace.config).unwrap();
//!     assert_eq!(report.counts.city_rows, 2);
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::TestWorkspace;
