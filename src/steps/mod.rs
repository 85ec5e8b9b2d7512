//! Pipeline steps.
//!
//! The publishing pipeline is a fixed sequence of fifteen numbered steps.
//! Each step is one side-effecting operation against the record table, the
//! local image cache or the storefront console. Handlers do exactly one
//! thing and raise on failure; retry policy belongs to the orchestrator.
//!
//! | id | step |
//! |----|------|
//! | 0  | task init (discovery: resolves the concrete task id) |
//! | 1  | fetch images |
//! | 2  | translate listing copy |
//! | 3  | login check |
//! | 4  | open listing editor |
//! | 5  | upload main images |
//! | 6  | select brand |
//! | 7  | fill article number & gender |
//! | 8  | fill colors |
//! | 9  | fill sizes |
//! | 10 | fill price & stock |
//! | 11 | crop gallery images |
//! | 12 | fill detail template |
//! | 13 | submit listing (irreversible, sets the guard) |
//! | 14 | log & notify |

pub mod listing;
pub mod notify;
pub mod setup;
pub mod submit;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{PushcartError, Result};
use crate::pipeline::SharedContext;
use crate::records::RecordStore;
use crate::storefront::Storefront;

/// Identifier of one pipeline step. Always within `0..=14`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(u8);

/// Highest valid step id.
pub const MAX_STEP: u8 = 14;

impl StepId {
    /// Validate a raw id. `None` when outside the pipeline range.
    pub fn new(raw: u8) -> Option<Self> {
        (raw <= MAX_STEP).then_some(Self(raw))
    }

    /// Validate a raw id, producing the CLI-facing error.
    pub fn parse(raw: u8) -> Result<Self> {
        Self::new(raw).ok_or(PushcartError::UnknownStep { step: raw })
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Human-readable step name.
    pub fn name(&self) -> &'static str {
        STEP_NAMES[self.0 as usize]
    }

    /// All step ids in ascending order.
    pub fn all() -> impl Iterator<Item = StepId> {
        (0..=MAX_STEP).map(StepId)
    }
}

/// StepId for an id that is statically known to be in range.
pub(crate) fn known(raw: u8) -> StepId {
    StepId::new(raw).expect("pipeline step id in range")
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

const STEP_NAMES: [&str; 15] = [
    "task-init",
    "fetch-images",
    "translate-copy",
    "login-check",
    "open-editor",
    "upload-main-images",
    "select-brand",
    "fill-basic-info",
    "fill-colors",
    "fill-sizes",
    "fill-price-stock",
    "crop-gallery",
    "fill-detail-template",
    "submit-listing",
    "log-notify",
];

/// One invocable pipeline step.
///
/// Handlers mutate the shared context in place and must raise on failure
/// rather than retrying internally.
pub trait StepHandler {
    /// Stable name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Run the step against the shared context.
    fn execute(&self, ctx: &mut SharedContext) -> Result<()>;
}

/// Maps step ids to handlers.
///
/// An id with no registered handler is not an error at lookup time; the
/// orchestrator logs a warning and skips it.
#[derive(Default)]
pub struct StepRegistry {
    handlers: BTreeMap<StepId, Box<dyn StepHandler>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: StepId, handler: Box<dyn StepHandler>) {
        self.handlers.insert(id, handler);
    }

    pub fn lookup(&self, id: StepId) -> Option<&dyn StepHandler> {
        self.handlers.get(&id).map(|h| h.as_ref())
    }

    /// Registered ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = StepId> + '_ {
        self.handlers.keys().copied()
    }
}

/// Build the production registry wired to the given collaborators.
pub fn default_registry(
    storefront: Arc<dyn Storefront>,
    records: Arc<dyn RecordStore>,
    config: &Config,
) -> StepRegistry {
    let mut registry = StepRegistry::new();
    let id = known;

    registry.register(id(0), Box::new(setup::TaskInit::new(records.clone())));
    registry.register(id(1), Box::new(setup::FetchImages::new(config.image_dir())));
    registry.register(
        id(2),
        Box::new(setup::TranslateCopy::new(config.glossary.clone())),
    );
    registry.register(id(3), Box::new(setup::LoginCheck::new(storefront.clone())));

    registry.register(id(4), Box::new(listing::OpenEditor::new(storefront.clone())));
    registry.register(
        id(5),
        Box::new(listing::UploadMainImages::new(storefront.clone())),
    );
    registry.register(id(6), Box::new(listing::SelectBrand::new(storefront.clone())));
    registry.register(
        id(7),
        Box::new(listing::FillBasicInfo::new(storefront.clone())),
    );
    registry.register(id(8), Box::new(listing::FillColors::new(storefront.clone())));
    registry.register(id(9), Box::new(listing::FillSizes::new(storefront.clone())));
    registry.register(
        id(10),
        Box::new(listing::FillPriceStock::new(storefront.clone())),
    );
    registry.register(
        id(11),
        Box::new(listing::CropGallery::new(storefront.clone())),
    );
    registry.register(
        id(12),
        Box::new(listing::FillDetailTemplate::new(storefront.clone())),
    );

    registry.register(id(13), Box::new(submit::SubmitListing::new(storefront)));
    registry.register(id(14), Box::new(notify::LogNotify::new(records)));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_id_rejects_out_of_range() {
        assert!(StepId::new(14).is_some());
        assert!(StepId::new(15).is_none());
        assert!(matches!(
            StepId::parse(99),
            Err(PushcartError::UnknownStep { step: 99 })
        ));
    }

    #[test]
    fn step_names_cover_all_ids() {
        for id in StepId::all() {
            assert!(!id.name().is_empty());
        }
        assert_eq!(StepId::new(0).unwrap().name(), "task-init");
        assert_eq!(StepId::new(13).unwrap().name(), "submit-listing");
    }

    #[test]
    fn registry_lookup_missing_returns_none() {
        let registry = StepRegistry::new();
        assert!(registry.lookup(StepId::new(3).unwrap()).is_none());
    }

    #[test]
    fn step_id_serializes_as_number() {
        let id = StepId::new(7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }
}
