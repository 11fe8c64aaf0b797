//! Page management service
//!
//! Provides the business logic for page lifecycle and saves, shared between
//! the HTTP handlers and the editor's repository seam.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::editor::PageRepository;
use crate::errors::{LinkleafError, Result};
use crate::storage::{BlockSavePlan, BlockType, BlockWrite, ContentBlock, Page, PageUpdate, SeaOrmStorage};
use crate::utils::{generate_random_suffix, is_valid_slug, slugify};

/// 页面 alias 数量上限
pub const MAX_ALIASES: usize = 5;

/// slug 去重后缀长度
const SLUG_SUFFIX_LENGTH: usize = 5;

/// The acting identity, as produced by the auth layer.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Service for page lifecycle and persistence of editor saves.
pub struct PageService {
    storage: Arc<SeaOrmStorage>,
}

impl PageService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// The user's page, created lazily on first editor visit: default slug
    /// derived from the identity, disambiguated with a random suffix when
    /// taken, seeded with one default LINK block.
    pub async fn ensure_page_for_user(
        &self,
        user: &UserIdentity,
    ) -> Result<(Page, Vec<ContentBlock>)> {
        if let Some(page) = self.storage.find_page_by_user(&user.id).await? {
            let blocks = self.storage.blocks_for_page(&page.id).await?;
            return Ok((page, blocks));
        }

        let slug = self.default_slug(user).await?;
        let now = chrono::Utc::now();
        let page = Page {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            slug,
            title: user.name.clone().unwrap_or_else(|| "My Link Page".to_string()),
            description: None,
            banner_image: None,
            background_color: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            accent_color: "#3B82F6".to_string(),
            font_family: None,
            aliases: Vec::new(),
            show_watermark: true,
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_page(&page).await?;

        // 初始页面带一个默认链接区块
        let seed = BlockSavePlan {
            creates: vec![BlockWrite {
                block_type: BlockType::Link,
                position: 0,
                title: Some("My Website".to_string()),
                url: Some("https://example.com".to_string()),
                icon: None,
                text_content: None,
            }],
            ..Default::default()
        };
        self.storage.apply_block_plan(&page.id, &seed).await?;

        let blocks = self.storage.blocks_for_page(&page.id).await?;
        info!("Created page {} for user {}", page.slug, user.id);
        Ok((page, blocks))
    }

    /// The user's page without the create-on-first-visit side effect.
    pub async fn page_for_user(&self, user_id: &str) -> Result<Option<Page>> {
        self.storage.find_page_by_user(user_id).await
    }

    /// The page's blocks, for the owner only.
    pub async fn blocks_for_owner(
        &self,
        acting_user_id: &str,
        page_id: &str,
    ) -> Result<Vec<ContentBlock>> {
        let page = self
            .storage
            .find_page_by_id(page_id)
            .await?
            .ok_or_else(|| LinkleafError::not_found(format!("Page not found: {}", page_id)))?;

        if page.user_id != acting_user_id {
            return Err(LinkleafError::unauthorized(
                "You don't have permission to view this page",
            ));
        }

        self.storage.blocks_for_page(page_id).await
    }

    async fn default_slug(&self, user: &UserIdentity) -> Result<String> {
        let base = user
            .email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .map(slugify)
            .filter(|s| !s.is_empty())
            .or_else(|| user.name.as_deref().map(slugify).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| "page".to_string());

        if !self.storage.slug_exists(&base, None).await? {
            return Ok(base);
        }
        Ok(format!(
            "{}-{}",
            base,
            generate_random_suffix(SLUG_SUFFIX_LENGTH)
        ))
    }

    /// Apply a partial page update on behalf of `acting_user_id`.
    ///
    /// Rejects updates from non-owners, invalid slugs, and slugs already
    /// owned by a different page.
    pub async fn update_page(&self, acting_user_id: &str, update: PageUpdate) -> Result<Page> {
        let page = self
            .storage
            .find_page_by_id(&update.id)
            .await?
            .ok_or_else(|| LinkleafError::not_found(format!("Page not found: {}", update.id)))?;

        if page.user_id != acting_user_id {
            return Err(LinkleafError::unauthorized(
                "You don't have permission to update this page",
            ));
        }

        let mut update = update;

        if let Some(slug) = &update.slug {
            if !is_valid_slug(slug) {
                return Err(LinkleafError::validation(format!(
                    "Invalid slug '{}'. Only lowercase letters, digits and hyphens allowed.",
                    slug
                )));
            }
            if slug != &page.slug && self.storage.slug_exists(slug, Some(&page.id)).await? {
                return Err(LinkleafError::slug_taken(format!(
                    "URL slug already taken: {}",
                    slug
                )));
            }
        }

        if let Some(banner) = &update.banner_image
            && !banner.trim().is_empty()
        {
            url::Url::parse(banner).map_err(|e| {
                LinkleafError::validation(format!("Invalid banner image URL: {}", e))
            })?;
        }

        if let Some(aliases) = update.aliases.take() {
            update.aliases = Some(Self::normalize_aliases(aliases)?);
        }

        self.storage.update_page(&update).await
    }

    /// Persist one save's block reconciliation for the acting user.
    pub async fn save_blocks(
        &self,
        acting_user_id: &str,
        page_id: &str,
        plan: BlockSavePlan,
    ) -> Result<()> {
        let page = self
            .storage
            .find_page_by_id(page_id)
            .await?
            .ok_or_else(|| LinkleafError::not_found(format!("Page not found: {}", page_id)))?;

        if page.user_id != acting_user_id {
            return Err(LinkleafError::unauthorized(
                "You don't have permission to update this page",
            ));
        }

        self.storage.apply_block_plan(page_id, &plan).await
    }

    /// Resolve a public path segment: direct slug first, then aliases.
    pub async fn resolve_public(&self, slug: &str) -> Result<Option<(Page, Vec<ContentBlock>)>> {
        let Some(page) = self.storage.find_page_by_slug_or_alias(slug).await? else {
            return Ok(None);
        };
        let blocks = self.storage.blocks_for_page(&page.id).await?;
        Ok(Some((page, blocks)))
    }

    /// Trim, drop blanks, dedupe, and bound the alias list.
    fn normalize_aliases(aliases: Vec<String>) -> Result<Vec<String>> {
        let mut normalized: Vec<String> = Vec::new();
        for alias in aliases {
            let trimmed = alias.trim().to_string();
            if trimmed.is_empty() || normalized.contains(&trimmed) {
                continue;
            }
            if !is_valid_slug(&trimmed) {
                return Err(LinkleafError::validation(format!(
                    "Invalid alias '{}'. Only lowercase letters, digits and hyphens allowed.",
                    trimmed
                )));
            }
            normalized.push(trimmed);
        }
        if normalized.len() > MAX_ALIASES {
            return Err(LinkleafError::validation(format!(
                "At most {} aliases are allowed",
                MAX_ALIASES
            )));
        }
        Ok(normalized)
    }
}

/// Repository seam used by the editor's save coordinator: a `PageService`
/// bound to one acting identity.
pub struct UserPageRepository {
    service: Arc<PageService>,
    acting_user_id: String,
}

impl UserPageRepository {
    pub fn new(service: Arc<PageService>, acting_user_id: impl Into<String>) -> Self {
        Self {
            service,
            acting_user_id: acting_user_id.into(),
        }
    }
}

#[async_trait]
impl PageRepository for UserPageRepository {
    async fn update_page(&self, update: PageUpdate) -> Result<Page> {
        self.service.update_page(&self.acting_user_id, update).await
    }

    async fn save_blocks(&self, page_id: &str, plan: BlockSavePlan) -> Result<()> {
        self.service
            .save_blocks(&self.acting_user_id, page_id, plan)
            .await
    }
}
