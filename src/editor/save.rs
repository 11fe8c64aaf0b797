//! Save coordination.
//!
//! `EditorSession` holds the optimistic client-side state for one page: a
//! draft of the page settings, the ordered block list, and the dirty
//! tracker. `save_changes` diffs against the last-persisted snapshot,
//! submits only what changed through the `PageRepository` collaborator, and
//! returns an explicit notification intent for the caller to render.

use async_trait::async_trait;

use crate::errors::{LinkleafError, Result};
use crate::storage::models::{
    BlockSavePlan, BlockType, BlockWrite, ContentBlock, Page, PageUpdate,
};

use super::blocks::{BlockId, BlockList, EditorBlock};
use super::diff::{PageSettings, diff_page};
use super::dirty::DirtyTracker;

/// Persistence collaborator for the save flow. The implementation is
/// expected to enforce ownership and slug uniqueness.
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn update_page(&self, update: PageUpdate) -> Result<Page>;
    async fn save_blocks(&self, page_id: &str, plan: BlockSavePlan) -> Result<()>;
}

/// Notification intent returned to the caller; there is no global toast
/// singleton in this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Success(String),
    Error(String),
}

#[derive(Debug)]
pub enum SaveOutcome {
    /// Neither flag was set, or a save was already in flight.
    NothingToSave,
    Saved,
    /// Page settings persisted but the block reconciliation failed; the
    /// blocks flag stays dirty for a manual retry.
    Partial(LinkleafError),
    Failed(LinkleafError),
}

#[derive(Debug)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    pub notification: Notification,
    /// Set when something persisted and the caller must re-read canonical
    /// state (via `EditorSession::apply_refetch`).
    pub refetch_needed: bool,
}

/// Client-side editing session for one page.
#[derive(Debug, Clone)]
pub struct EditorSession {
    page_id: String,
    draft: PageSettings,
    snapshot: PageSettings,
    blocks: BlockList,
    /// Durable ids as of the last fetch; deletions are derived from these.
    persisted_ids: Vec<String>,
    tracker: DirtyTracker,
}

impl EditorSession {
    pub fn new(page: &Page, blocks: Vec<ContentBlock>) -> Self {
        let settings = PageSettings::from(page);
        let list = BlockList::from_persisted(blocks);
        let persisted_ids = list.persisted_ids();
        Self {
            page_id: page.id.clone(),
            draft: settings.clone(),
            snapshot: settings,
            blocks: list,
            persisted_ids,
            tracker: DirtyTracker::new(),
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn draft(&self) -> &PageSettings {
        &self.draft
    }

    pub fn blocks(&self) -> &BlockList {
        &self.blocks
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    // ============ Page-level edits ============

    pub fn update_page_field<F: FnOnce(&mut PageSettings)>(&mut self, f: F) {
        f(&mut self.draft);
        self.tracker.mark_page_dirty();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.update_page_field(|s| s.title = title.into());
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.update_page_field(|s| s.slug = slug.into());
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.update_page_field(|s| s.description = description);
    }

    pub fn set_banner_image(&mut self, banner_image: Option<String>) {
        self.update_page_field(|s| s.banner_image = banner_image);
    }

    pub fn set_font_family(&mut self, font_family: Option<String>) {
        self.update_page_field(|s| s.font_family = font_family);
    }

    pub fn set_aliases(&mut self, aliases: Vec<String>) {
        self.update_page_field(|s| s.aliases = aliases);
    }

    pub fn set_show_watermark(&mut self, show_watermark: bool) {
        self.update_page_field(|s| s.show_watermark = show_watermark);
    }

    /// Apply a color preset: background, text and accent in one edit.
    pub fn apply_color_preset(
        &mut self,
        background: impl Into<String>,
        text: impl Into<String>,
        accent: impl Into<String>,
    ) {
        self.update_page_field(|s| {
            s.background_color = background.into();
            s.text_color = text.into();
            s.accent_color = accent.into();
        });
    }

    // ============ Block-level edits ============

    pub fn add_block(&mut self, block_type: BlockType) -> BlockId {
        let id = self.blocks.add(block_type);
        self.tracker.mark_blocks_dirty();
        id
    }

    pub fn delete_block(&mut self, id: &BlockId) -> bool {
        let removed = self.blocks.delete(id);
        if removed {
            self.tracker.mark_blocks_dirty();
        }
        removed
    }

    pub fn reorder_blocks(&mut self, moved: &BlockId, target: &BlockId) -> bool {
        let changed = self.blocks.reorder(moved, target);
        if changed {
            self.tracker.mark_blocks_dirty();
        }
        changed
    }

    pub fn update_block<F: FnOnce(&mut EditorBlock)>(&mut self, id: &BlockId, f: F) -> bool {
        let updated = self.blocks.update(id, f);
        if updated {
            self.tracker.mark_blocks_dirty();
        }
        updated
    }

    // ============ Prompt ============

    /// Returns true exactly when the caller must create a new
    /// unsaved-changes prompt.
    pub fn evaluate_prompt(&mut self) -> bool {
        self.tracker.evaluate_prompt()
    }

    pub fn dismiss_prompt(&mut self) {
        self.tracker.dismiss_prompt()
    }

    // ============ Saving ============

    /// Build the block reconciliation plan: pending ids become creates,
    /// durable ids become updates, and durable ids no longer present in the
    /// sequence become deletes.
    pub fn plan_block_save(&self) -> BlockSavePlan {
        let mut plan = BlockSavePlan::default();

        for block in self.blocks.items() {
            let write = block_write(block);
            match &block.id {
                BlockId::Pending(_) => plan.creates.push(write),
                BlockId::Persisted(id) => plan.updates.push((id.clone(), write)),
            }
        }

        let current = self.blocks.persisted_ids();
        plan.deletes = self
            .persisted_ids
            .iter()
            .filter(|id| !current.contains(id))
            .cloned()
            .collect();

        plan
    }

    /// Save everything that is dirty, page settings first, then blocks.
    ///
    /// Failure leaves the corresponding dirty flags untouched so a manual
    /// retry resubmits the full diff. When page settings persist but the
    /// block reconciliation fails, the degraded outcome is reported, never
    /// silently swallowed.
    pub async fn save_changes<R: PageRepository + ?Sized>(&mut self, repo: &R) -> SaveReport {
        if self.tracker.is_saving() {
            return SaveReport {
                outcome: SaveOutcome::NothingToSave,
                notification: Notification::Info("A save is already in progress.".to_string()),
                refetch_needed: false,
            };
        }

        let flags = self.tracker.flags();
        if !self.tracker.begin_save() {
            return SaveReport {
                outcome: SaveOutcome::NothingToSave,
                notification: Notification::Info("No changes to save.".to_string()),
                refetch_needed: false,
            };
        }

        let mut persisted_anything = false;

        if flags.page {
            let update = diff_page(&self.page_id, &self.draft, &self.snapshot);
            if !update.is_empty() {
                match repo.update_page(update).await {
                    Ok(_) => {
                        self.snapshot = self.draft.clone();
                        persisted_anything = true;
                    }
                    Err(e) => {
                        self.tracker.fail_save();
                        return SaveReport {
                            notification: Notification::Error(e.format_simple()),
                            outcome: SaveOutcome::Failed(e),
                            refetch_needed: false,
                        };
                    }
                }
            }
        }

        if flags.blocks {
            let plan = self.plan_block_save();
            if let Err(e) = repo.save_blocks(&self.page_id, plan).await {
                // Page settings may already be persisted: degraded, reported.
                self.tracker.finish_save(flags.page, false);
                let outcome = if flags.page && persisted_anything {
                    SaveOutcome::Partial(e.clone())
                } else {
                    SaveOutcome::Failed(e.clone())
                };
                return SaveReport {
                    outcome,
                    notification: Notification::Error(e.format_simple()),
                    refetch_needed: persisted_anything,
                };
            }
            persisted_anything = true;
        }

        self.tracker.finish_save(flags.page, flags.blocks);

        // Dirty flags can be set while every value matches the snapshot
        // (edits reverted by hand). Zero persistence calls were made, so
        // reporting a successful save would be a lie.
        if !persisted_anything {
            return SaveReport {
                outcome: SaveOutcome::NothingToSave,
                notification: Notification::Info(
                    "Everything is already up to date.".to_string(),
                ),
                refetch_needed: false,
            };
        }

        SaveReport {
            outcome: SaveOutcome::Saved,
            notification: Notification::Success("Your changes have been saved!".to_string()),
            refetch_needed: true,
        }
    }

    /// Replace the session state with freshly fetched canonical state.
    pub fn apply_refetch(&mut self, page: &Page, blocks: Vec<ContentBlock>) {
        debug_assert_eq!(page.id, self.page_id);
        let settings = PageSettings::from(page);
        self.draft = settings.clone();
        self.snapshot = settings;
        self.blocks = BlockList::from_persisted(blocks);
        self.persisted_ids = self.blocks.persisted_ids();
        self.tracker = DirtyTracker::new();
    }
}

/// Normalize a block for persistence the way the save payload is built:
/// url/icon are LINK-only, text content is TEXT/HEADER-only, and empty
/// strings collapse to None.
fn block_write(block: &EditorBlock) -> BlockWrite {
    let is_link = block.block_type == BlockType::Link;
    let has_text = matches!(block.block_type, BlockType::Text | BlockType::Header);

    BlockWrite {
        block_type: block.block_type,
        position: block.position,
        title: non_empty(block.title.clone()),
        url: if is_link {
            non_empty(block.url.clone())
        } else {
            None
        },
        icon: if is_link {
            non_empty(block.icon.clone())
        } else {
            None
        },
        text_content: if has_text {
            non_empty(block.text_content.clone())
        } else {
            None
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
