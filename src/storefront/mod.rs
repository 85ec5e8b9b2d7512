//! The external storefront publishing surface.
//!
//! The pipeline fills in and submits one listing through the storefront's
//! seller console. Step handlers consume the [`Storefront`] capability;
//! the orchestrator itself never sees it. The handle is constructed by the
//! caller, shared across a batch run, and dropped when the run ends.
//!
//! Submission is the irreversible action of the whole pipeline: once
//! [`Storefront::submit_listing`] returns a receipt, the listing exists on
//! the remote side and no retry may repeat it.

pub mod http;

use std::path::Path;

use crate::error::Result;

pub use http::HttpStorefront;

/// Operations the step handlers perform against the seller console.
///
/// Every method is synchronous and may block on network I/O; steps run
/// strictly one after another, so there is never more than one in-flight
/// call per handle.
pub trait Storefront {
    /// Verify the stored session is still authenticated.
    fn ensure_logged_in(&self) -> Result<()>;

    /// Open a listing draft for a product, returning the draft id.
    fn open_listing_editor(&self, product_id: &str) -> Result<String>;

    /// Upload main (1:1) images from a local folder. Returns how many were
    /// uploaded.
    fn upload_main_images(&self, draft: &str, dir: &Path) -> Result<usize>;

    /// Select the brand in the listing form.
    fn select_brand(&self, draft: &str, brand: &str) -> Result<()>;

    /// Fill the article number and gender fields.
    fn fill_basic_info(&self, draft: &str, article_no: &str, gender: Option<&str>) -> Result<()>;

    /// Fill the color variants.
    fn fill_colors(&self, draft: &str, colors: &[String]) -> Result<()>;

    /// Fill the size variants.
    fn fill_sizes(&self, draft: &str, sizes: &[String]) -> Result<()>;

    /// Fill unit price and stock count.
    fn fill_price_stock(&self, draft: &str, price: f64, stock: u32) -> Result<()>;

    /// Produce the 3:4 gallery crops from the uploaded main images.
    fn crop_gallery_images(&self, draft: &str) -> Result<()>;

    /// Fill the detail section from rendered template HTML.
    fn fill_detail_template(&self, draft: &str, detail_html: &str) -> Result<()>;

    /// Submit the draft for publication. Irreversible. Returns the listing
    /// receipt id.
    fn submit_listing(&self, draft: &str) -> Result<String>;
}
