//! Page settings diffing.
//!
//! The save payload carries only fields whose current value differs from
//! the last-persisted snapshot, compared by value. Optional fields whose
//! current value is `None` are omitted rather than sent as null; clearing
//! happens by writing an explicit empty string, which persistence stores
//! as NULL.

use crate::storage::models::{Page, PageUpdate};

/// Editable page-level settings, detached from entity bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
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
}

impl From<&Page> for PageSettings {
    fn from(page: &Page) -> Self {
        Self {
            slug: page.slug.clone(),
            title: page.title.clone(),
            description: page.description.clone(),
            banner_image: page.banner_image.clone(),
            background_color: page.background_color.clone(),
            text_color: page.text_color.clone(),
            accent_color: page.accent_color.clone(),
            font_family: page.font_family.clone(),
            aliases: page.aliases.clone(),
            show_watermark: page.show_watermark,
        }
    }
}

/// Build the minimal partial update for `page_id`. Identical settings
/// produce a payload with no fields beyond the identifier.
pub fn diff_page(page_id: &str, current: &PageSettings, initial: &PageSettings) -> PageUpdate {
    let mut update = PageUpdate::new(page_id);

    if current.slug != initial.slug {
        update.slug = Some(current.slug.clone());
    }
    if current.title != initial.title {
        update.title = Some(current.title.clone());
    }
    if current.description != initial.description {
        update.description = current.description.clone();
    }
    if current.banner_image != initial.banner_image {
        update.banner_image = current.banner_image.clone();
    }
    if current.background_color != initial.background_color {
        update.background_color = Some(current.background_color.clone());
    }
    if current.text_color != initial.text_color {
        update.text_color = Some(current.text_color.clone());
    }
    if current.accent_color != initial.accent_color {
        update.accent_color = Some(current.accent_color.clone());
    }
    if current.font_family != initial.font_family {
        update.font_family = current.font_family.clone();
    }
    if current.aliases != initial.aliases {
        update.aliases = Some(current.aliases.clone());
    }
    if current.show_watermark != initial.show_watermark {
        update.show_watermark = Some(current.show_watermark);
    }

    update
}
