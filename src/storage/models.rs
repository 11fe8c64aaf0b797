use serde::{Deserialize, Serialize};

/// Content block kind. Stored as its SCREAMING_CASE name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Link,
    Text,
    Header,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Link => "LINK",
            BlockType::Text => "TEXT",
            BlockType::Header => "HEADER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LINK" => Some(BlockType::Link),
            "TEXT" => Some(BlockType::Text),
            "HEADER" => Some(BlockType::Header),
            _ => None,
        }
    }
}

/// A user's public page. One per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub user_id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub banner_image: Option<String>,
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub font_family: Option<String>,
    pub aliases: Vec<String>,
    pub show_watermark: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A persisted content block, ordered by `position` within its page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: String,
    pub page_id: String,
    pub block_type: BlockType,
    pub position: i32,
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub text_content: Option<String>,
    #[serde(default)]
    pub clicks: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Partial page update. `None` fields are left untouched; for the clearable
/// optionals (description, banner_image, font_family) an empty string clears
/// the column to NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageUpdate {
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub banner_image: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub font_family: Option<String>,
    pub aliases: Option<Vec<String>>,
    pub show_watermark: Option<bool>,
}

impl PageUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// True when the payload carries no field beyond the identifier,
    /// in which case the update call is skipped entirely.
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.banner_image.is_none()
            && self.background_color.is_none()
            && self.text_color.is_none()
            && self.accent_color.is_none()
            && self.font_family.is_none()
            && self.aliases.is_none()
            && self.show_watermark.is_none()
    }
}

/// Field values for a block create or update, already normalized for the
/// block type: url/icon only for LINK, text_content only for TEXT/HEADER.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockWrite {
    pub block_type: BlockType,
    pub position: i32,
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub text_content: Option<String>,
}

/// One save's worth of block reconciliation, applied as a single
/// transactional unit.
#[derive(Debug, Clone, Default)]
pub struct BlockSavePlan {
    pub creates: Vec<BlockWrite>,
    pub updates: Vec<(String, BlockWrite)>,
    pub deletes: Vec<String>,
}

impl BlockSavePlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// A page view event to append. Geo fields are filled when a lookup
/// collaborator is configured; otherwise they stay empty.
#[derive(Debug, Clone, Default)]
pub struct NewVisit {
    pub page_id: String,
    pub visitor_user_id: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Outcome of a click-count increment. Missing or non-LINK blocks are a
/// soft failure, never an error for the visitor-facing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Counted,
    NotALink,
    NotFound,
}
