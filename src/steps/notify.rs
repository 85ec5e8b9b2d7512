//! Step 14: log the run outcome back to the record table.
//!
//! Reporting is best effort in spirit but still a real step: the record's
//! status column is what operators watch, so a failure here is a step
//! failure (the report phase has no retry budget by default).

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::SharedContext;
use crate::records::RecordStore;

use super::StepHandler;

pub struct LogNotify {
    records: Arc<dyn RecordStore>,
}

impl LogNotify {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }
}

impl StepHandler for LogNotify {
    fn name(&self) -> &'static str {
        "log-notify"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let Some(record) = ctx.record.as_ref() else {
            // Partial runs (e.g. --from 4) never initialized the record;
            // there is nowhere to report to.
            warn!(task = %ctx.task(), "no record in context, skipping remote report");
            return Ok(());
        };

        let outcome = if ctx.submitted() {
            match ctx.receipt.as_deref() {
                Some(receipt) => format!("submitted, receipt {receipt}"),
                None => "submitted".to_string(),
            }
        } else {
            "run finished without submission".to_string()
        };

        let entry = format!("[{}] task {}: {}", Utc::now().to_rfc3339(), ctx.task(), outcome);
        self.records.append_log(&record.record_ref, &entry)?;
        info!(task = %ctx.task(), record = %record.record_ref, "run outcome reported");
        Ok(())
    }
}
