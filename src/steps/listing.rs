//! Publish phase handlers (steps 4–12).
//!
//! Each handler fills one section of the listing draft. They are thin and
//! deliberately repetitive: one required-context check, one storefront
//! call, one log line. Step 13 (submit) lives in [`super::submit`]
//! because it is the irreversible one.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{PushcartError, Result};
use crate::pipeline::SharedContext;
use crate::storefront::Storefront;

use super::{known, StepHandler};

fn context_missing(step: u8, field: &'static str) -> PushcartError {
    PushcartError::ContextMissing {
        step: known(step),
        field,
    }
}

fn require_draft(ctx: &SharedContext, step: u8) -> Result<String> {
    ctx.draft_id
        .clone()
        .ok_or(context_missing(step, "draft_id"))
}

/// Step 4: open the listing editor and remember the draft id.
pub struct OpenEditor {
    storefront: Arc<dyn Storefront>,
}

impl OpenEditor {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for OpenEditor {
    fn name(&self) -> &'static str {
        "open-editor"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let record = ctx.record.as_ref().ok_or(context_missing(4, "record"))?;
        let draft = self
            .storefront
            .open_listing_editor(&record.fields.product_id)?;
        info!(task = %ctx.task(), draft = %draft, "listing editor opened");
        ctx.draft_id = Some(draft);
        Ok(())
    }
}

/// Step 5: upload the staged 1:1 main images.
pub struct UploadMainImages {
    storefront: Arc<dyn Storefront>,
}

impl UploadMainImages {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for UploadMainImages {
    fn name(&self) -> &'static str {
        "upload-main-images"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 5)?;
        let dir = ctx
            .image_dir
            .as_ref()
            .ok_or(context_missing(5, "image_dir"))?;
        let count = self.storefront.upload_main_images(&draft, dir)?;
        info!(task = %ctx.task(), count, "main images uploaded");
        Ok(())
    }
}

/// Step 6: select the brand.
pub struct SelectBrand {
    storefront: Arc<dyn Storefront>,
}

impl SelectBrand {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for SelectBrand {
    fn name(&self) -> &'static str {
        "select-brand"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 6)?;
        let record = ctx.record.as_ref().ok_or(context_missing(6, "record"))?;
        let brand = record
            .fields
            .brand
            .as_deref()
            .ok_or(context_missing(6, "record.brand"))?;
        self.storefront.select_brand(&draft, brand)?;
        debug!(task = %ctx.task(), brand, "brand selected");
        Ok(())
    }
}

/// Step 7: fill article number and gender.
pub struct FillBasicInfo {
    storefront: Arc<dyn Storefront>,
}

impl FillBasicInfo {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for FillBasicInfo {
    fn name(&self) -> &'static str {
        "fill-basic-info"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 7)?;
        let record = ctx.record.as_ref().ok_or(context_missing(7, "record"))?;
        // Fall back to the product id when the record carries no article
        // number; the storefront requires the field.
        let article_no = record
            .fields
            .article_no
            .as_deref()
            .unwrap_or(&record.fields.product_id);
        self.storefront
            .fill_basic_info(&draft, article_no, record.fields.gender.as_deref())?;
        debug!(task = %ctx.task(), article_no, "basic info filled");
        Ok(())
    }
}

/// Step 8: fill the color variants.
pub struct FillColors {
    storefront: Arc<dyn Storefront>,
}

impl FillColors {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for FillColors {
    fn name(&self) -> &'static str {
        "fill-colors"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 8)?;
        let record = ctx.record.as_ref().ok_or(context_missing(8, "record"))?;
        self.storefront.fill_colors(&draft, &record.fields.colors)?;
        debug!(task = %ctx.task(), count = record.fields.colors.len(), "colors filled");
        Ok(())
    }
}

/// Step 9: fill the size variants.
pub struct FillSizes {
    storefront: Arc<dyn Storefront>,
}

impl FillSizes {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for FillSizes {
    fn name(&self) -> &'static str {
        "fill-sizes"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 9)?;
        let record = ctx.record.as_ref().ok_or(context_missing(9, "record"))?;
        self.storefront.fill_sizes(&draft, &record.fields.sizes)?;
        debug!(task = %ctx.task(), count = record.fields.sizes.len(), "sizes filled");
        Ok(())
    }
}

/// Step 10: fill price and stock.
pub struct FillPriceStock {
    storefront: Arc<dyn Storefront>,
}

impl FillPriceStock {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for FillPriceStock {
    fn name(&self) -> &'static str {
        "fill-price-stock"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 10)?;
        let record = ctx.record.as_ref().ok_or(context_missing(10, "record"))?;
        let price = record
            .fields
            .price
            .ok_or(context_missing(10, "record.price"))?;
        let stock = record.fields.stock.unwrap_or(1);
        self.storefront.fill_price_stock(&draft, price, stock)?;
        debug!(task = %ctx.task(), price, stock, "price and stock filled");
        Ok(())
    }
}

/// Step 11: produce the 3:4 gallery crops.
pub struct CropGallery {
    storefront: Arc<dyn Storefront>,
}

impl CropGallery {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for CropGallery {
    fn name(&self) -> &'static str {
        "crop-gallery"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 11)?;
        self.storefront.crop_gallery_images(&draft)?;
        debug!(task = %ctx.task(), "gallery crops produced");
        Ok(())
    }
}

/// Step 12: fill the detail section from the translated copy.
pub struct FillDetailTemplate {
    storefront: Arc<dyn Storefront>,
}

impl FillDetailTemplate {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for FillDetailTemplate {
    fn name(&self) -> &'static str {
        "fill-detail-template"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = require_draft(ctx, 12)?;
        let copy = ctx.copy.as_ref().ok_or(context_missing(12, "copy"))?;
        self.storefront
            .fill_detail_template(&draft, &copy.detail_html)?;
        debug!(task = %ctx.task(), "detail template filled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunOptions;
    use crate::records::{ProductFields, ProductRecord};
    use crate::storefront::tests_support::RecordingStorefront;

    fn ctx_with_record() -> SharedContext {
        let mut ctx = SharedContext::new(Some("C1"), RunOptions::default());
        ctx.record = Some(ProductRecord {
            record_ref: "rec-C1".to_string(),
            fields: ProductFields {
                product_id: "C1".to_string(),
                brand: Some("acme".to_string()),
                colors: vec!["black".to_string()],
                sizes: vec!["M".to_string()],
                price: Some(129.0),
                stock: Some(5),
                ..Default::default()
            },
        });
        ctx
    }

    #[test]
    fn open_editor_stores_draft_id() {
        let sf = Arc::new(RecordingStorefront::default());
        let mut ctx = ctx_with_record();

        OpenEditor::new(sf.clone()).execute(&mut ctx).unwrap();
        assert_eq!(ctx.draft_id.as_deref(), Some("draft-1"));
        assert_eq!(sf.calls()[0], "open:C1");
    }

    #[test]
    fn fill_steps_require_open_draft() {
        let sf = Arc::new(RecordingStorefront::default());
        let mut ctx = ctx_with_record();

        let err = SelectBrand::new(sf).execute(&mut ctx).unwrap_err();
        assert!(matches!(err, PushcartError::ContextMissing { field: "draft_id", .. }));
    }

    #[test]
    fn select_brand_requires_brand_field() {
        let sf = Arc::new(RecordingStorefront::default());
        let mut ctx = ctx_with_record();
        ctx.draft_id = Some("draft-1".to_string());
        ctx.record.as_mut().unwrap().fields.brand = None;

        let err = SelectBrand::new(sf).execute(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            PushcartError::ContextMissing { field: "record.brand", .. }
        ));
    }

    #[test]
    fn basic_info_falls_back_to_product_id() {
        let sf = Arc::new(RecordingStorefront::default());
        let mut ctx = ctx_with_record();
        ctx.draft_id = Some("draft-1".to_string());

        FillBasicInfo::new(sf.clone()).execute(&mut ctx).unwrap();
        assert_eq!(sf.calls()[0], "basic:draft-1:C1");
    }

    #[test]
    fn price_stock_defaults_stock_to_one() {
        let sf = Arc::new(RecordingStorefront::default());
        let mut ctx = ctx_with_record();
        ctx.draft_id = Some("draft-1".to_string());
        ctx.record.as_mut().unwrap().fields.stock = None;

        FillPriceStock::new(sf.clone()).execute(&mut ctx).unwrap();
        assert_eq!(sf.calls()[0], "pricing:draft-1:129:1");
    }
}
