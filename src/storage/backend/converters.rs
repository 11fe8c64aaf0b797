//! Model conversion helpers between sea-orm entities and domain types.

use migration::entities::{content_block, page};

use crate::errors::{LinkleafError, Result};
use crate::storage::models::{BlockType, ContentBlock, Page};

/// 解码 aliases JSON 数组，容忍历史脏数据
pub fn decode_aliases(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}

pub fn encode_aliases(aliases: &[String]) -> String {
    serde_json::to_string(aliases).unwrap_or_else(|_| "[]".to_string())
}

pub fn model_to_page(model: page::Model) -> Page {
    Page {
        id: model.id,
        user_id: model.user_id,
        slug: model.slug,
        title: model.title,
        description: model.description,
        banner_image: model.banner_image,
        background_color: model.background_color,
        text_color: model.text_color,
        accent_color: model.accent_color,
        font_family: model.font_family,
        aliases: decode_aliases(&model.aliases),
        show_watermark: model.show_watermark,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn model_to_block(model: content_block::Model) -> Result<ContentBlock> {
    let block_type = BlockType::parse(&model.block_type).ok_or_else(|| {
        LinkleafError::serialization(format!(
            "Unknown block type '{}' for block {}",
            model.block_type, model.id
        ))
    })?;

    Ok(ContentBlock {
        id: model.id,
        page_id: model.page_id,
        block_type,
        position: model.position,
        title: model.title,
        url: model.url,
        icon: model.icon,
        text_content: model.text_content,
        clicks: model.clicks,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
