//! HTTP client for the storefront seller console.
//!
//! Flat, repetitive calls against the console's draft API: every form
//! section maps to one endpoint under `/drafts/<id>`. There is no retry
//! here; failures bubble up as step errors and the orchestrator decides
//! what to do with them.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::StorefrontConfig;
use crate::error::{PushcartError, Result};

use super::Storefront;

/// Seller-console REST client.
pub struct HttpStorefront {
    client: Client,
    base_url: String,
    session_cookie: String,
}

#[derive(Debug, Deserialize)]
struct DraftResponse {
    draft_id: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    receipt: String,
}

impl HttpStorefront {
    /// Build a client from configuration.
    pub fn new(config: &StorefrontConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pushcart")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(PushcartError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json(&self, path: &str, body: serde_json::Value) -> Result<reqwest::blocking::Response> {
        let response = self
            .client
            .post(self.url(path))
            .header("cookie", &self.session_cookie)
            .json(&body)
            .send()?;
        self.check(response)
    }

    fn check(&self, response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        if !response.status().is_success() {
            return Err(PushcartError::Storefront {
                message: format!("HTTP {} from {}", response.status(), response.url()),
            });
        }
        Ok(response)
    }

    /// Image files in a folder, sorted by name so upload order is stable.
    fn image_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
        let mut files: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("jpg") | Some("jpeg") | Some("png") | Some("webp")
                )
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

impl Storefront for HttpStorefront {
    fn ensure_logged_in(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("/session"))
            .header("cookie", &self.session_cookie)
            .send()?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PushcartError::Storefront {
                message: "session expired; refresh the storefront cookie".to_string(),
            });
        }
        self.check(response)?;
        Ok(())
    }

    fn open_listing_editor(&self, product_id: &str) -> Result<String> {
        let response = self.post_json("/drafts", json!({ "product_id": product_id }))?;
        let body: DraftResponse = response.json()?;
        Ok(body.draft_id)
    }

    fn upload_main_images(&self, draft: &str, dir: &Path) -> Result<usize> {
        let files = Self::image_files(dir)?;
        if files.is_empty() {
            return Err(PushcartError::Storefront {
                message: format!("no images found in {}", dir.display()),
            });
        }

        for file in &files {
            let bytes = fs::read(file)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let response = self
                .client
                .post(self.url(&format!("/drafts/{draft}/images")))
                .header("cookie", &self.session_cookie)
                .header("x-file-name", &name)
                .body(bytes)
                .send()?;
            self.check(response)?;
        }

        Ok(files.len())
    }

    fn select_brand(&self, draft: &str, brand: &str) -> Result<()> {
        self.post_json(&format!("/drafts/{draft}/brand"), json!({ "brand": brand }))?;
        Ok(())
    }

    fn fill_basic_info(&self, draft: &str, article_no: &str, gender: Option<&str>) -> Result<()> {
        self.post_json(
            &format!("/drafts/{draft}/basic"),
            json!({ "article_no": article_no, "gender": gender }),
        )?;
        Ok(())
    }

    fn fill_colors(&self, draft: &str, colors: &[String]) -> Result<()> {
        self.post_json(&format!("/drafts/{draft}/colors"), json!({ "colors": colors }))?;
        Ok(())
    }

    fn fill_sizes(&self, draft: &str, sizes: &[String]) -> Result<()> {
        self.post_json(&format!("/drafts/{draft}/sizes"), json!({ "sizes": sizes }))?;
        Ok(())
    }

    fn fill_price_stock(&self, draft: &str, price: f64, stock: u32) -> Result<()> {
        self.post_json(
            &format!("/drafts/{draft}/pricing"),
            json!({ "price": price, "stock": stock }),
        )?;
        Ok(())
    }

    fn crop_gallery_images(&self, draft: &str) -> Result<()> {
        self.post_json(
            &format!("/drafts/{draft}/gallery"),
            json!({ "aspect": "3:4" }),
        )?;
        Ok(())
    }

    fn fill_detail_template(&self, draft: &str, detail_html: &str) -> Result<()> {
        self.post_json(
            &format!("/drafts/{draft}/detail"),
            json!({ "html": detail_html }),
        )?;
        Ok(())
    }

    fn submit_listing(&self, draft: &str) -> Result<String> {
        let response = self.post_json(&format!("/drafts/{draft}/submit"), json!({}))?;
        let body: SubmitResponse = response.json()?;
        Ok(body.receipt)
    }
}
