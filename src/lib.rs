//! Pushcart - storefront listing publication pipeline.
//!
//! Pushcart takes product rows from a remote record table and publishes
//! them as storefront listings, one fixed fifteen-step pipeline per
//! product: stage images and translated copy, fill the listing draft
//! section by section, submit, report back. Step status is persisted per
//! task so an operator can always see how far a product got.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`pipeline`] - Phase layout, orchestration and run reports
//! - [`records`] - Remote product record table client
//! - [`state`] - Persistent per-task step status
//! - [`steps`] - The pipeline steps and their registry
//! - [`storefront`] - Seller console client
//!
//! # Example
//!
//! ```
//! use pushcart::pipeline::StepSelection;
//! use pushcart::steps::StepId;
//!
//! // The publish steps, without setup or reporting
//! let selection = StepSelection::Range {
//!     from: StepId::new(4).unwrap(),
//!     to: StepId::new(13).unwrap(),
//! };
//! assert_eq!(selection.resolve().len(), 10);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod state;
pub mod steps;
pub mod storefront;

pub use error::{PushcartError, Result};
