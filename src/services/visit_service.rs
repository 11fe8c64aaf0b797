//! Visit recording and click tracking
//!
//! Visit recording is fire-and-forget: a failure to record must never block
//! or fail the page render, so errors are logged and swallowed here. Click
//! increments are atomic server-side and soft-fail for missing or non-LINK
//! blocks.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::storage::{ClickOutcome, NewVisit, SeaOrmStorage};

pub struct VisitService {
    storage: Arc<SeaOrmStorage>,
}

impl VisitService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Record one page view. Never returns an error.
    pub async fn record_visit(&self, visit: NewVisit) {
        match self.storage.insert_visit(&visit).await {
            Ok(()) => debug!("Visit recorded for page {}", visit.page_id),
            Err(e) => warn!("Failed to record visit for page {}: {}", visit.page_id, e),
        }
    }

    /// Increment a LINK block's click counter.
    pub async fn track_click(&self, block_id: &str) -> Result<ClickOutcome> {
        let outcome = self.storage.increment_click(block_id).await?;
        if outcome != ClickOutcome::Counted {
            warn!(
                "Attempted to increment click for non-link or non-existent block: {}",
                block_id
            );
        }
        Ok(outcome)
    }
}
