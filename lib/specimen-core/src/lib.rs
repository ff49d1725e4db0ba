//! # Specimen Core
//!
//! Harvest JSON payload examples from REST API documentation pages, and
//! generate Rust models from what was harvested.
//!
//! The crate has two halves:
//! - **[`harvest`]** - fetch a documentation page, capture the JSON payload
//!   embedded in its markup, walk the schema document inside it, and write
//!   one example file per referenced type
//! - **[`codegen`]** - turn those example files (or a schema document) into
//!   Rust struct definitions
//!
//! ## Quick Start
//!
//! ### Harvesting examples
//!
//! ```rust,no_run
//! use specimen_core::Harvester;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let harvester = Harvester::builder()
//!     .with_url("https://developer.atlassian.com/cloud/jira/platform/rest/v3/")
//!     .with_out_dir("jira")
//!     .build()?;
//!
//! let report = harvester.run().await?;
//! println!("{} example files ({} entries skipped)", report.written, report.skipped);
//! # Ok(())
//! # }
//! ```
//!
//! A snapshot of the captured payload lands next to the output (`json.log`
//! by default), so the next run skips the network entirely.
//!
//! ### Generating models
//!
//! ```rust,no_run
//! use specimen_core::Generator;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let models = Generator::default()
//!     .with_source("jira")
//!     .with_rename("issuetype", "issueKind")
//!     .render()?;
//!
//! std::fs::write("src/models.rs", models)?;
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod harvest;

// Public API - the headline types are re-exported from the crate root
pub use self::codegen::{CodegenError, Generator};
pub use self::harvest::{HarvestError, HarvestReport, Harvester};
