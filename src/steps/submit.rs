//! Step 13: submit the listing.
//!
//! The one irreversible step. Once the storefront accepts the submission
//! the listing exists remotely; the handler latches the shared guard so
//! the orchestrator never re-runs the publish phase in this run.

use std::sync::Arc;

use tracing::info;

use crate::error::{PushcartError, Result};
use crate::pipeline::SharedContext;
use crate::storefront::Storefront;

use super::{known, StepHandler};

pub struct SubmitListing {
    storefront: Arc<dyn Storefront>,
}

impl SubmitListing {
    pub fn new(storefront: Arc<dyn Storefront>) -> Self {
        Self { storefront }
    }
}

impl StepHandler for SubmitListing {
    fn name(&self) -> &'static str {
        "submit-listing"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        let draft = ctx.draft_id.clone().ok_or(PushcartError::ContextMissing {
            step: known(13),
            field: "draft_id",
        })?;

        let receipt = self.storefront.submit_listing(&draft)?;

        // The remote side has committed; latch before anything else can fail.
        ctx.mark_submitted();
        info!(task = %ctx.task(), receipt = %receipt, "listing submitted");
        ctx.receipt = Some(receipt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunOptions;
    use crate::storefront::tests_support::RecordingStorefront;

    #[test]
    fn submit_sets_guard_and_receipt() {
        let sf = Arc::new(RecordingStorefront::default());
        let mut ctx = SharedContext::new(Some("C1"), RunOptions::default());
        ctx.draft_id = Some("draft-1".to_string());

        SubmitListing::new(sf.clone()).execute(&mut ctx).unwrap();

        assert!(ctx.submitted());
        assert_eq!(ctx.receipt.as_deref(), Some("receipt-1"));
        assert_eq!(sf.calls(), vec!["submit:draft-1"]);
    }

    #[test]
    fn submit_without_draft_fails_without_latching() {
        let sf = Arc::new(RecordingStorefront::default());
        let mut ctx = SharedContext::new(Some("C1"), RunOptions::default());

        let err = SubmitListing::new(sf).execute(&mut ctx).unwrap_err();
        assert!(matches!(err, PushcartError::ContextMissing { .. }));
        assert!(!ctx.submitted());
    }
}
