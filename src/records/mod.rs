//! Remote record table of products awaiting publication.
//!
//! The pipeline reads product data from a remote table (one row per
//! product) and writes publication status back to it. The orchestrator
//! never talks to the table directly; step handlers and the post-commit
//! hook consume the [`RecordStore`] capability.

pub mod http;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use http::HttpRecordStore;

/// One row of the remote product table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Opaque row reference used for updates.
    pub record_ref: String,

    /// Product fields.
    pub fields: ProductFields,
}

/// Product data carried by a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFields {
    /// External product id, e.g. `C25233183`.
    pub product_id: String,

    /// Listing title in the source language.
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub gender: Option<String>,

    /// Article number printed on the product.
    #[serde(default)]
    pub article_no: Option<String>,

    #[serde(default)]
    pub colors: Vec<String>,

    #[serde(default)]
    pub sizes: Vec<String>,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub stock: Option<u32>,

    /// Source URLs for the main images.
    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Upload status column, e.g. `pending` / `published`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Capability consumed by the task-init step, the post-commit hook and the
/// batch driver.
pub trait RecordStore {
    /// Records whose status marks them as awaiting publication.
    fn pending_records(&self) -> Result<Vec<ProductRecord>>;

    /// Look up a record by its external product id.
    fn find_by_product(&self, product_id: &str) -> Result<Option<ProductRecord>>;

    /// Write the status column of a record.
    fn update_status(&self, record_ref: &str, status: &str) -> Result<()>;

    /// Append a line to the record's run log column. Best effort on the
    /// caller's side; errors are real errors here.
    fn append_log(&self, record_ref: &str, entry: &str) -> Result<()>;
}

/// Normalize an external product id: trim and strip leading zeros, matching
/// how ids are keyed in the remote table.
pub fn normalize_product_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() && !trimmed.is_empty() {
        // All zeros: keep a single one rather than an empty id
        "0".to_string()
    } else {
        stripped.to_string()
    }
}
