//! Setup phase handlers (steps 0–3).
//!
//! Step 0 is the discovery step: it picks or looks up the product record
//! and resolves the concrete task id. Steps 1–3 stage everything the
//! publish phase needs: local images, translated copy, a live session.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{PushcartError, Result};
use crate::pipeline::{ListingCopy, SharedContext};
use crate::records::{ProductRecord, RecordStore};
use crate::storefront::Storefront;

use super::{known, StepHandler};

fn context_missing(step: u8, field: &'static str) -> PushcartError {
    PushcartError::ContextMissing {
        step: known(step),
        field,
    }
}

/// Step 0: resolve the product record and the task id.
pub struct TaskInit {
    records: Arc<dyn RecordStore>,
}

impl TaskInit {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    fn matches_filters(record: &ProductRecord, ctx: &SharedContext) -> bool {
        if let Some(brand) = &ctx.options.brand {
            if record.fields.brand.as_deref() != Some(brand.as_str()) {
                return false;
            }
        }
        if let Some(category) = &ctx.options.category {
            if record.fields.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        true
    }
}

impl StepHandler for TaskInit {
    fn name(&self) -> &'static str {
        "task-init"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let record = if ctx.task().is_assigned() {
            let id = ctx.task().store_key().to_string();
            info!(task = %ctx.task(), "looking up record for requested product");
            self.records
                .find_by_product(&id)?
                .ok_or_else(|| PushcartError::RecordStore {
                    message: format!("no record found for product {id}"),
                })?
        } else {
            let pending = self.records.pending_records()?;
            debug!(count = pending.len(), "pending records fetched");
            pending
                .into_iter()
                .find(|r| Self::matches_filters(r, ctx))
                .ok_or_else(|| PushcartError::RecordStore {
                    message: "no pending record matches the requested filters".to_string(),
                })?
        };

        ctx.resolve_task(&record.fields.product_id);
        info!(task = %ctx.task(), record = %record.record_ref, "task initialized");
        ctx.record = Some(record);
        Ok(())
    }
}

/// Step 1: download the main images into the local cache.
pub struct FetchImages {
    image_root: PathBuf,
    client: reqwest::blocking::Client,
}

impl FetchImages {
    pub fn new(image_root: PathBuf) -> Self {
        Self {
            image_root,
            client: reqwest::blocking::Client::builder()
                .user_agent("pushcart")
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn file_name(url: &str, index: usize) -> String {
        let ext = url
            .rsplit('.')
            .next()
            .filter(|e| matches!(*e, "jpg" | "jpeg" | "png" | "webp"))
            .unwrap_or("jpg");
        format!("{index:02}.{ext}")
    }
}

impl StepHandler for FetchImages {
    fn name(&self) -> &'static str {
        "fetch-images"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let record = ctx.record.as_ref().ok_or(context_missing(1, "record"))?;

        if record.fields.image_urls.is_empty() {
            return Err(PushcartError::StepFailed {
                step: known(1),
                name: self.name(),
                message: format!("record {} lists no image urls", record.record_ref),
            });
        }

        let dir = self.image_root.join(ctx.task().store_key());
        fs::create_dir_all(&dir)?;

        let mut fetched = 0usize;
        for (index, url) in record.fields.image_urls.iter().enumerate() {
            let target = dir.join(Self::file_name(url, index));
            if target.exists() {
                debug!(file = %target.display(), "image already cached");
                continue;
            }

            let response = self.client.get(url).send()?;
            if !response.status().is_success() {
                return Err(PushcartError::StepFailed {
                    step: known(1),
                    name: self.name(),
                    message: format!("HTTP {} fetching {url}", response.status()),
                });
            }
            fs::write(&target, response.bytes()?)?;
            fetched += 1;
        }

        info!(task = %ctx.task(), fetched, dir = %dir.display(), "images staged");
        ctx.image_dir = Some(dir);
        Ok(())
    }
}

/// Step 2: build the listing copy in the target language.
///
/// Term-table substitution over the title and color names. Terms missing
/// from the glossary pass through unchanged.
pub struct TranslateCopy {
    glossary: HashMap<String, String>,
}

impl TranslateCopy {
    pub fn new(glossary: HashMap<String, String>) -> Self {
        Self { glossary }
    }

    fn translate(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (from, to) in &self.glossary {
            if out.contains(from.as_str()) {
                out = out.replace(from.as_str(), to);
            }
        }
        out
    }
}

impl StepHandler for TranslateCopy {
    fn name(&self) -> &'static str {
        "translate-copy"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let record = ctx.record.as_ref().ok_or(context_missing(2, "record"))?;

        let title = self.translate(&record.fields.title);
        let colors: Vec<String> = record
            .fields
            .colors
            .iter()
            .map(|c| self.translate(c))
            .collect();

        let detail_html = format!(
            "<section class=\"detail\"><h1>{}</h1><p>{}</p></section>",
            title,
            colors.join(" / "),
        );

        if let Some(record) = ctx.record.as_mut() {
            record.fields.colors = colors;
        }
        ctx.copy = Some(ListingCopy { title, detail_html });
        Ok(())
    }
}

/// Step 3: verify the storefront session is still live.
pub struct LoginCheck {
    storefront: Arc<dyn Storefront>,
}

impl LoginCheck {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for LoginCheck {
    fn name(&self) -> &'static str {
        "login-check"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        self.storefront.ensure_logged_in()?;
        debug!(task = %ctx.task(), "storefront session verified");
        Ok(())
    }
}
