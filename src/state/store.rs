//! Persistent task state storage.
//!
//! One JSON file per task under `<cache_dir>/tasks/<id>.json`, holding the
//! per-step status map. The orchestrator updates the file immediately after
//! every terminal status change, so the on-disk record is always current.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::steps::StepId;

/// Status of a single pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Done,
    Failed,
    Skipped,
}

impl StepStatus {
    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Done => "done",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        }
    }
}

/// Durable record for one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task identifier (the product id, or the placeholder before discovery).
    pub id: String,

    /// When this record was first created.
    pub created_at: DateTime<Utc>,

    /// Status of each step that has been touched.
    #[serde(default)]
    pub step_status: BTreeMap<StepId, StepStatus>,
}

impl TaskRecord {
    /// Create a fresh record with no step history.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            created_at: Utc::now(),
            step_status: BTreeMap::new(),
        }
    }

    /// Status for a step, defaulting to `Pending` if never touched.
    pub fn status(&self, step: StepId) -> StepStatus {
        self.step_status
            .get(&step)
            .copied()
            .unwrap_or(StepStatus::Pending)
    }
}

/// Storage capability the orchestrator consumes.
///
/// No concurrency guarantees: exactly one orchestrator instance is assumed
/// per task id.
pub trait TaskStateStore {
    /// Load the record for a task, creating a fresh default if none exists.
    fn load(&self, id: &str) -> Result<TaskRecord>;

    /// Persist the full record.
    fn save(&self, id: &str, record: &TaskRecord) -> Result<()>;

    /// Update one step's status, persisting immediately.
    fn update_step_status(&self, id: &str, step: StepId, status: StepStatus) -> Result<()>;
}

/// File-backed store, one JSON document per task.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    root: PathBuf,
}

impl JsonTaskStore {
    /// Create a store rooted at `<cache_dir>/tasks`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: cache_dir.into().join("tasks"),
        }
    }

    /// Path of the record file for a task.
    pub fn record_file(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl TaskStateStore for JsonTaskStore {
    fn load(&self, id: &str) -> Result<TaskRecord> {
        let path = self.record_file(id);

        if !path.exists() {
            let record = TaskRecord::new(id);
            self.save(id, &record)?;
            return Ok(record);
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(record) => Ok(record),
            Err(e) => {
                // A corrupt record is not worth failing the run over; start over.
                tracing::warn!(task = %id, error = %e, "task record unreadable, recreating");
                let record = TaskRecord::new(id);
                self.save(id, &record)?;
                Ok(record)
            }
        }
    }

    /// Save using atomic write.
    ///
    /// Write-to-temp-then-rename prevents a partially written record if the
    /// process dies mid-write.
    fn save(&self, id: &str, record: &TaskRecord) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let path = self.record_file(id);
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| crate::error::PushcartError::Other(e.into()))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn update_step_status(&self, id: &str, step: StepId, status: StepStatus) -> Result<()> {
        let mut record = self.load(id)?;
        record.step_status.insert(step, status);
        self.save(id, &record)
    }
}
