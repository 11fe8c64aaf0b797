//! Client-side editor core: optimistic block editing with deferred saves.

pub mod blocks;
pub mod diff;
pub mod dirty;
pub mod save;

pub use blocks::{BlockId, BlockList, EditorBlock, reorder_blocks};
pub use diff::{PageSettings, diff_page};
pub use dirty::{DirtyFlags, DirtyTracker, EditorPhase};
pub use save::{EditorSession, Notification, PageRepository, SaveOutcome, SaveReport};
