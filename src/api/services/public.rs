//! Visitor-facing endpoints: page resolution and click tracking.

use std::sync::Arc;

use actix_web::{HttpRequest, Responder, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::services::{PageService, VisitService};
use crate::storage::{BlockType, ClickOutcome, ContentBlock, NewVisit, Page};
use crate::utils::ip::extract_client_ip;

use super::{error_response, success_response};

/// The rendered page payload: HEADER override already applied, HEADER
/// blocks filtered out of the in-flow list.
#[derive(Debug, Serialize)]
pub struct PublicPageResponse {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub banner_image: Option<String>,
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub font_family: Option<String>,
    pub show_watermark: bool,
    pub blocks: Vec<PublicBlock>,
}

#[derive(Debug, Serialize)]
pub struct PublicBlock {
    pub id: String,
    pub block_type: BlockType,
    pub position: i32,
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub text_content: Option<String>,
}

/// Apply the display rules: the first HEADER block (lowest position)
/// supersedes the page title and description, and HEADER blocks never appear
/// in the in-flow list.
pub fn compose_public_page(page: &Page, blocks: &[ContentBlock]) -> PublicPageResponse {
    let header = blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Header)
        .min_by_key(|b| b.position);

    let title = header
        .and_then(|h| h.title.clone())
        .unwrap_or_else(|| page.title.clone());
    let description = header
        .and_then(|h| h.text_content.clone())
        .or_else(|| page.description.clone());

    let mut in_flow: Vec<&ContentBlock> = blocks
        .iter()
        .filter(|b| b.block_type != BlockType::Header)
        .collect();
    in_flow.sort_by_key(|b| b.position);

    PublicPageResponse {
        slug: page.slug.clone(),
        title,
        description,
        banner_image: page.banner_image.clone(),
        background_color: page.background_color.clone(),
        text_color: page.text_color.clone(),
        accent_color: page.accent_color.clone(),
        font_family: page.font_family.clone(),
        show_watermark: page.show_watermark,
        blocks: in_flow
            .into_iter()
            .map(|b| PublicBlock {
                id: b.id.clone(),
                block_type: b.block_type,
                position: b.position,
                title: b.title.clone(),
                url: b.url.clone(),
                icon: b.icon.clone(),
                text_content: b.text_content.clone(),
            })
            .collect(),
    }
}

pub struct PublicPageService;

impl PublicPageService {
    pub async fn get_page(
        req: HttpRequest,
        path: web::Path<String>,
        pages: web::Data<Arc<PageService>>,
        visits: web::Data<Arc<VisitService>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        match pages.resolve_public(&slug).await {
            Ok(Some((page, blocks))) => {
                Self::record_visit_async(&req, &page, Arc::clone(visits.get_ref()));
                success_response(compose_public_page(&page, &blocks))
            }
            Ok(None) => {
                debug!("Public page not found: {}", slug);
                error_response(&crate::errors::LinkleafError::not_found(format!(
                    "Page not found: {}",
                    slug
                )))
            }
            Err(e) => {
                error!("Public page lookup failed for {}: {}", slug, e);
                error_response(&e)
            }
        }
    }

    /// Counting a click never fails the visitor flow: missing or non-LINK
    /// blocks come back as `counted: false`.
    pub async fn track_click(
        path: web::Path<String>,
        visits: web::Data<Arc<VisitService>>,
    ) -> impl Responder {
        let block_id = path.into_inner();

        match visits.track_click(&block_id).await {
            Ok(outcome) => success_response(serde_json::json!({
                "counted": outcome == ClickOutcome::Counted,
            })),
            Err(e) => {
                error!("Click tracking failed for {}: {}", block_id, e);
                error_response(&e)
            }
        }
    }

    /// 同步阶段只提取请求数据，写入在后台任务执行，不阻塞响应
    fn record_visit_async(req: &HttpRequest, page: &Page, visits: Arc<VisitService>) {
        let visit = NewVisit {
            page_id: page.id.clone(),
            visitor_user_id: None,
            ip: extract_client_ip(req),
            user_agent: req
                .headers()
                .get("user-agent")
                .and_then(|h| h.to_str().ok())
                .map(String::from),
            referrer: req
                .headers()
                .get("referer")
                .and_then(|h| h.to_str().ok())
                .map(String::from),
            country: None,
            city: None,
        };

        tokio::spawn(async move {
            visits.record_visit(visit).await;
        });
    }
}

/// 公开路由配置
pub fn public_routes() -> actix_web::Scope {
    web::scope("")
        .route("/p/{slug}", web::get().to(PublicPageService::get_page))
        .route("/c/{block_id}", web::post().to(PublicPageService::track_click))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_page() -> Page {
        Page {
            id: "page-1".to_string(),
            user_id: "user-1".to_string(),
            slug: "alice".to_string(),
            title: "Alice's Page".to_string(),
            description: Some("Original description".to_string()),
            banner_image: None,
            background_color: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            accent_color: "#3B82F6".to_string(),
            font_family: None,
            aliases: vec![],
            show_watermark: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn block(id: &str, block_type: BlockType, position: i32) -> ContentBlock {
        ContentBlock {
            id: id.to_string(),
            page_id: "page-1".to_string(),
            block_type,
            position,
            title: Some(format!("title-{}", id)),
            url: None,
            icon: None,
            text_content: Some(format!("text-{}", id)),
            clicks: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_header_overrides_title_and_description() {
        let page = test_page();
        let blocks = vec![
            block("h1", BlockType::Header, 0),
            block("l1", BlockType::Link, 1),
        ];

        let composed = compose_public_page(&page, &blocks);
        assert_eq!(composed.title, "title-h1");
        assert_eq!(composed.description.as_deref(), Some("text-h1"));
    }

    #[test]
    fn test_headers_filtered_from_flow() {
        let page = test_page();
        let blocks = vec![
            block("h1", BlockType::Header, 0),
            block("l1", BlockType::Link, 1),
            block("t1", BlockType::Text, 2),
        ];

        let composed = compose_public_page(&page, &blocks);
        let ids: Vec<&str> = composed.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "t1"]);
    }

    #[test]
    fn test_no_header_keeps_page_settings() {
        let page = test_page();
        let blocks = vec![block("l1", BlockType::Link, 0)];

        let composed = compose_public_page(&page, &blocks);
        assert_eq!(composed.title, "Alice's Page");
        assert_eq!(composed.description.as_deref(), Some("Original description"));
    }

    #[test]
    fn test_first_header_wins() {
        let page = test_page();
        let blocks = vec![
            block("h2", BlockType::Header, 3),
            block("h1", BlockType::Header, 0),
        ];

        let composed = compose_public_page(&page, &blocks);
        assert_eq!(composed.title, "title-h1");
        assert!(composed.blocks.is_empty());
    }
}
