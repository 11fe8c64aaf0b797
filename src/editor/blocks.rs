//! In-memory ordered block collection for one page.
//!
//! Positions are zero-based and contiguous; insertion order equals position
//! order. Every mutation renormalizes positions to `0..N-1` so the stored
//! `position` always matches the array index.

use uuid::Uuid;

use crate::storage::models::{BlockType, ContentBlock};

/// Block identity. New blocks created in the editor carry a `Pending` id
/// until the save round-trip persists them; reconciliation matches on this
/// tag, never on string prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockId {
    Persisted(String),
    Pending(Uuid),
}

impl BlockId {
    pub fn fresh() -> Self {
        BlockId::Pending(Uuid::new_v4())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, BlockId::Pending(_))
    }

    pub fn persisted(&self) -> Option<&str> {
        match self {
            BlockId::Persisted(id) => Some(id),
            BlockId::Pending(_) => None,
        }
    }
}

/// One content block as edited client-side.
#[derive(Debug, Clone)]
pub struct EditorBlock {
    pub id: BlockId,
    pub block_type: BlockType,
    pub position: i32,
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub text_content: Option<String>,
    pub clicks: i64,
}

impl EditorBlock {
    pub fn from_persisted(block: ContentBlock) -> Self {
        Self {
            id: BlockId::Persisted(block.id),
            block_type: block.block_type,
            position: block.position,
            title: block.title,
            url: block.url,
            icon: block.icon,
            text_content: block.text_content,
            clicks: block.clicks,
        }
    }

    fn new_default(block_type: BlockType) -> Self {
        let (title, url, text_content) = match block_type {
            BlockType::Link => (Some("New Link"), Some("https://"), None),
            BlockType::Text => (
                Some("New Text Block"),
                None,
                Some("Start writing your text here..."),
            ),
            BlockType::Header => (
                Some("Your Page Title"),
                None,
                Some("Optional subheading for your page..."),
            ),
        };

        Self {
            id: BlockId::fresh(),
            block_type,
            position: 0,
            title: title.map(String::from),
            url: url.map(String::from),
            icon: None,
            text_content: text_content.map(String::from),
            clicks: 0,
        }
    }
}

/// Move `moved` to the index currently held by `target`, preserving the
/// relative order of everything else, then renumber positions to `0..N-1`.
///
/// Pure function of (sequence, move): no clock, no external state. No-op
/// when `moved == target` or either id is absent.
pub fn reorder_blocks(
    blocks: &[EditorBlock],
    moved: &BlockId,
    target: &BlockId,
) -> Vec<EditorBlock> {
    let mut items: Vec<EditorBlock> = blocks.to_vec();

    if moved != target {
        let old_index = items.iter().position(|b| &b.id == moved);
        let new_index = items.iter().position(|b| &b.id == target);
        if let (Some(old_index), Some(new_index)) = (old_index, new_index) {
            let removed = items.remove(old_index);
            items.insert(new_index, removed);
        }
    }

    for (index, block) in items.iter_mut().enumerate() {
        block.position = index as i32;
    }
    items
}

/// Ordered block collection with contiguous positions.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    items: Vec<EditorBlock>,
}

impl BlockList {
    pub fn from_persisted(mut blocks: Vec<ContentBlock>) -> Self {
        blocks.sort_by_key(|b| b.position);
        let mut list = Self {
            items: blocks.into_iter().map(EditorBlock::from_persisted).collect(),
        };
        list.normalize();
        list
    }

    pub fn items(&self) -> &[EditorBlock] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &BlockId) -> Option<&EditorBlock> {
        self.items.iter().find(|b| &b.id == id)
    }

    /// Add a block with the original editor's defaults. LINK and TEXT append
    /// at the end; HEADER always inserts at position 0, shifting the rest.
    pub fn add(&mut self, block_type: BlockType) -> BlockId {
        let block = EditorBlock::new_default(block_type);
        let id = block.id.clone();

        match block_type {
            BlockType::Header => self.items.insert(0, block),
            _ => self.items.push(block),
        }

        self.normalize();
        id
    }

    /// Remove a block. Deleting the sole remaining block leaves a valid
    /// empty sequence.
    pub fn delete(&mut self, id: &BlockId) -> bool {
        let before = self.items.len();
        self.items.retain(|b| &b.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.normalize();
        }
        removed
    }

    /// Returns true when the sequence actually changed.
    pub fn reorder(&mut self, moved: &BlockId, target: &BlockId) -> bool {
        if moved == target {
            return false;
        }
        let has_both = self.get(moved).is_some() && self.get(target).is_some();
        if !has_both {
            return false;
        }
        self.items = reorder_blocks(&self.items, moved, target);
        true
    }

    /// Mutate one block's fields in place.
    pub fn update<F: FnOnce(&mut EditorBlock)>(&mut self, id: &BlockId, f: F) -> bool {
        match self.items.iter_mut().find(|b| &b.id == id) {
            Some(block) => {
                f(block);
                true
            }
            None => false,
        }
    }

    /// The first HEADER block, which supersedes the page title/description
    /// for rendering when present.
    pub fn header_block(&self) -> Option<&EditorBlock> {
        self.items
            .iter()
            .find(|b| b.block_type == BlockType::Header)
    }

    /// Blocks rendered in flow: HEADER blocks are always filtered out.
    pub fn in_flow(&self) -> impl Iterator<Item = &EditorBlock> {
        self.items
            .iter()
            .filter(|b| b.block_type != BlockType::Header)
    }

    /// Durable ids currently present in the sequence.
    pub fn persisted_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|b| b.id.persisted().map(String::from))
            .collect()
    }

    /// Invariant check: positions are exactly `0..N-1` in array order.
    pub fn positions_contiguous(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(index, block)| block.position == index as i32)
    }

    fn normalize(&mut self) {
        for (index, block) in self.items.iter_mut().enumerate() {
            block.position = index as i32;
        }
    }
}
