//! Authenticated editor endpoints under `/api`.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::middleware::AuthUser;
use crate::errors::LinkleafError;
use crate::services::PageService;
use crate::storage::{BlockSavePlan, BlockType, BlockWrite, ContentBlock, Page, PageUpdate};

use super::{error_response, success_response};

#[derive(Debug, Serialize)]
pub struct EditorPageResponse {
    pub page: Page,
    pub blocks: Vec<ContentBlock>,
}

/// Partial page settings payload. Absent fields are left untouched;
/// description, banner_image and font_family are cleared by sending an
/// empty string.
#[derive(Debug, Deserialize)]
pub struct UpdatePagePayload {
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

/// One block as submitted by the editor: present in array order, with the
/// durable id absent for blocks created since the last save.
#[derive(Debug, Deserialize)]
pub struct ClientBlock {
    pub id: Option<String>,
    pub block_type: BlockType,
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub text_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveBlocksPayload {
    pub blocks: Vec<ClientBlock>,
}

pub struct EditorApiService;

impl EditorApiService {
    /// The acting user's page and blocks, created on first access.
    pub async fn get_page(
        user: AuthUser,
        pages: web::Data<Arc<PageService>>,
    ) -> impl Responder {
        match pages.ensure_page_for_user(&user.0).await {
            Ok((page, blocks)) => success_response(EditorPageResponse { page, blocks }),
            Err(e) => {
                error!("Failed to load editor page for {}: {}", user.0.id, e);
                error_response(&e)
            }
        }
    }

    /// Partial update of the acting user's page settings.
    pub async fn update_page(
        user: AuthUser,
        payload: web::Json<UpdatePagePayload>,
        pages: web::Data<Arc<PageService>>,
    ) -> impl Responder {
        let page = match Self::own_page(&user, &pages).await {
            Ok(page) => page,
            Err(response) => return response,
        };

        let payload = payload.into_inner();
        let update = PageUpdate {
            id: page.id,
            slug: payload.slug,
            title: payload.title,
            description: payload.description,
            banner_image: payload.banner_image,
            background_color: payload.background_color,
            text_color: payload.text_color,
            accent_color: payload.accent_color,
            font_family: payload.font_family,
            aliases: payload.aliases,
            show_watermark: payload.show_watermark,
        };

        match pages.update_page(&user.0.id, update).await {
            Ok(updated) => {
                info!("Page {} updated by {}", updated.id, user.0.id);
                success_response(updated)
            }
            Err(e) => error_response(&e),
        }
    }

    /// Reconcile the submitted block list against what is persisted: blocks
    /// without an id are created, blocks with an id are updated, and
    /// persisted blocks absent from the submission are deleted. Positions
    /// follow submission order.
    pub async fn save_blocks(
        user: AuthUser,
        payload: web::Json<SaveBlocksPayload>,
        pages: web::Data<Arc<PageService>>,
    ) -> impl Responder {
        let page = match Self::own_page(&user, &pages).await {
            Ok(page) => page,
            Err(response) => return response,
        };

        let existing = match pages.blocks_for_owner(&user.0.id, &page.id).await {
            Ok(blocks) => blocks,
            Err(e) => return error_response(&e),
        };

        let plan = build_block_plan(&payload.blocks, &existing);
        match pages.save_blocks(&user.0.id, &page.id, plan).await {
            Ok(()) => {
                let blocks = match pages.blocks_for_owner(&user.0.id, &page.id).await {
                    Ok(blocks) => blocks,
                    Err(e) => return error_response(&e),
                };
                success_response(blocks)
            }
            Err(e) => {
                error!("Block save failed for page {}: {}", page.id, e);
                error_response(&e)
            }
        }
    }

    async fn own_page(
        user: &AuthUser,
        pages: &web::Data<Arc<PageService>>,
    ) -> Result<Page, HttpResponse> {
        match pages.page_for_user(&user.0.id).await {
            Ok(Some(page)) => Ok(page),
            Ok(None) => Err(error_response(&LinkleafError::not_found(
                "You don't have a page yet",
            ))),
            Err(e) => Err(error_response(&e)),
        }
    }
}

/// Build the reconciliation plan from the submitted array order.
fn build_block_plan(submitted: &[ClientBlock], existing: &[ContentBlock]) -> BlockSavePlan {
    let mut plan = BlockSavePlan::default();

    for (position, block) in submitted.iter().enumerate() {
        let write = normalized_write(block, position as i32);
        match &block.id {
            Some(id) => plan.updates.push((id.clone(), write)),
            None => plan.creates.push(write),
        }
    }

    let submitted_ids: Vec<&String> = submitted.iter().filter_map(|b| b.id.as_ref()).collect();
    plan.deletes = existing
        .iter()
        .filter(|b| !submitted_ids.contains(&&b.id))
        .map(|b| b.id.clone())
        .collect();

    plan
}

/// url/icon 仅 LINK 使用，text_content 仅 TEXT/HEADER 使用，空串归一为 None
fn normalized_write(block: &ClientBlock, position: i32) -> BlockWrite {
    let is_link = block.block_type == BlockType::Link;
    let has_text = matches!(block.block_type, BlockType::Text | BlockType::Header);

    BlockWrite {
        block_type: block.block_type,
        position,
        title: non_empty(&block.title),
        url: if is_link { non_empty(&block.url) } else { None },
        icon: if is_link { non_empty(&block.icon) } else { None },
        text_content: if has_text {
            non_empty(&block.text_content)
        } else {
            None
        },
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}
