//! HTTP client for the remote record table.
//!
//! Thin wrapper over the table service's REST API: list rows filtered by
//! status, fetch a row by product id, and patch the status/log columns.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::RecordsConfig;
use crate::error::{PushcartError, Result};

use super::{normalize_product_id, ProductRecord, RecordStore};

/// REST client for the record table.
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    table: String,
    token: String,
    pending_statuses: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<ProductRecord>,
}

impl HttpRecordStore {
    /// Build a client from configuration.
    pub fn new(config: &RecordsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pushcart")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(PushcartError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            token: config.token.clone(),
            pending_statuses: config.pending_statuses.clone(),
        })
    }

    fn records_url(&self) -> String {
        format!("{}/tables/{}/records", self.base_url, self.table)
    }

    fn record_url(&self, record_ref: &str) -> String {
        format!("{}/{}", self.records_url(), record_ref)
    }

    fn check(&self, response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        if !response.status().is_success() {
            return Err(PushcartError::RecordStore {
                message: format!("HTTP {} from {}", response.status(), response.url()),
            });
        }
        Ok(response)
    }

    fn list(&self, statuses: Option<&[String]>) -> Result<Vec<ProductRecord>> {
        let mut request = self
            .client
            .get(self.records_url())
            .bearer_auth(&self.token);

        if let Some(statuses) = statuses {
            request = request.query(&[("status", statuses.join(","))]);
        }

        let response = self.check(request.send()?)?;
        let body: ListResponse = response.json()?;
        Ok(body.records)
    }
}

impl RecordStore for HttpRecordStore {
    fn pending_records(&self) -> Result<Vec<ProductRecord>> {
        let records = self.list(Some(&self.pending_statuses))?;

        // The service is expected to filter by status, but older deployments
        // return everything; filter locally as well.
        Ok(records
            .into_iter()
            .filter(|r| match &r.fields.status {
                Some(status) => self.pending_statuses.iter().any(|s| s == status),
                None => false,
            })
            .collect())
    }

    fn find_by_product(&self, product_id: &str) -> Result<Option<ProductRecord>> {
        let target = normalize_product_id(product_id);
        let records = self.list(None)?;

        Ok(records
            .into_iter()
            .find(|r| normalize_product_id(&r.fields.product_id) == target))
    }

    fn update_status(&self, record_ref: &str, status: &str) -> Result<()> {
        let response = self
            .client
            .patch(self.record_url(record_ref))
            .bearer_auth(&self.token)
            .json(&json!({ "fields": { "status": status } }))
            .send()?;

        self.check(response)?;
        Ok(())
    }

    fn append_log(&self, record_ref: &str, entry: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/log", self.record_url(record_ref)))
            .bearer_auth(&self.token)
            .json(&json!({ "entry": entry }))
            .send()?;

        self.check(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config(base_url: &str) -> RecordsConfig {
        RecordsConfig {
            base_url: base_url.to_string(),
            table: "products".to_string(),
            token: "test-token".to_string(),
            pending_statuses: vec!["pending".to_string(), "checking".to_string()],
            published_status: "published".to_string(),
            timeout_secs: 5,
        }
    }

    fn record_json(product_id: &str, status: &str) -> serde_json::Value {
        json!({
            "record_ref": format!("rec-{product_id}"),
            "fields": { "product_id": product_id, "title": "t", "status": status }
        })
    }

    #[test]
    fn pending_records_filters_by_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/tables/products/records")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({
                "records": [
                    record_json("C1", "pending"),
                    record_json("C2", "published"),
                    record_json("C3", "checking"),
                ]
            }));
        });

        let store = HttpRecordStore::new(&config(&server.base_url())).unwrap();
        let records = store.pending_records().unwrap();

        mock.assert();
        let ids: Vec<_> = records.iter().map(|r| r.fields.product_id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C3"]);
    }

    #[test]
    fn find_by_product_normalizes_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tables/products/records");
            then.status(200).json_body(json!({
                "records": [record_json("01234", "pending")]
            }));
        });

        let store = HttpRecordStore::new(&config(&server.base_url())).unwrap();
        let found = store.find_by_product("1234").unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn update_status_patches_record() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/tables/products/records/rec-C1")
                .json_body(json!({ "fields": { "status": "published" } }));
            then.status(200).json_body(json!({}));
        });

        let store = HttpRecordStore::new(&config(&server.base_url())).unwrap();
        store.update_status("rec-C1", "published").unwrap();
        mock.assert();
    }

    #[test]
    fn server_error_is_record_store_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tables/products/records");
            then.status(500);
        });

        let store = HttpRecordStore::new(&config(&server.base_url())).unwrap();
        let err = store.pending_records().unwrap_err();
        assert!(matches!(err, PushcartError::RecordStore { .. }));
    }
}
