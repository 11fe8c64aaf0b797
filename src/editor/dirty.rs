//! Unsaved-changes tracking.
//!
//! Two independent dirty flags (page settings, content blocks) driven
//! through an explicit Clean -> Dirty -> Saving -> Clean | Dirty state
//! machine. Prompt visibility is tracked separately from dirty state:
//! dismissing the prompt never clears a flag, and re-evaluation re-shows
//! it while the flags remain set.

/// Editing phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorPhase {
    #[default]
    Clean,
    Dirty,
    Saving,
}

/// Which domains carry unsaved modifications. The flags are independent and
/// are cleared independently on successful persistence, never jointly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags {
    pub page: bool,
    pub blocks: bool,
}

impl DirtyFlags {
    pub fn any(&self) -> bool {
        self.page || self.blocks
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    phase: EditorPhase,
    flags: DirtyFlags,
    prompt_visible: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.any()
    }

    pub fn is_saving(&self) -> bool {
        self.phase == EditorPhase::Saving
    }

    pub fn mark_page_dirty(&mut self) {
        self.flags.page = true;
        if self.phase == EditorPhase::Clean {
            self.phase = EditorPhase::Dirty;
        }
    }

    pub fn mark_blocks_dirty(&mut self) {
        self.flags.blocks = true;
        if self.phase == EditorPhase::Clean {
            self.phase = EditorPhase::Dirty;
        }
    }

    /// Transition into Saving. Returns false when a save is already in
    /// flight (duplicate submissions are guarded here) or nothing is dirty.
    pub fn begin_save(&mut self) -> bool {
        if self.phase == EditorPhase::Saving || !self.flags.any() {
            return false;
        }
        self.phase = EditorPhase::Saving;
        self.prompt_visible = false;
        true
    }

    /// Leave Saving, clearing only the flags whose domain was persisted.
    /// A partially applied save keeps the unsaved domain dirty.
    pub fn finish_save(&mut self, page_saved: bool, blocks_saved: bool) {
        if page_saved {
            self.flags.page = false;
        }
        if blocks_saved {
            self.flags.blocks = false;
        }
        self.phase = if self.flags.any() {
            EditorPhase::Dirty
        } else {
            EditorPhase::Clean
        };
    }

    /// A failed save leaves every flag untouched so the next manual save
    /// resubmits the full diff.
    pub fn fail_save(&mut self) {
        self.phase = EditorPhase::Dirty;
    }

    /// Whether the unsaved-changes prompt should currently be offered.
    pub fn should_prompt(&self) -> bool {
        self.flags.any() && self.phase != EditorPhase::Saving
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    /// Re-evaluate prompt visibility. Returns true exactly when a new prompt
    /// must be created: a fresh prompt is never stacked on a visible one.
    pub fn evaluate_prompt(&mut self) -> bool {
        if self.should_prompt() {
            if self.prompt_visible {
                return false;
            }
            self.prompt_visible = true;
            true
        } else {
            self.prompt_visible = false;
            false
        }
    }

    /// Manual dismissal hides the prompt without touching dirty state.
    pub fn dismiss_prompt(&mut self) {
        self.prompt_visible = false;
    }
}
