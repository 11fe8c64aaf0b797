//! Page queries and mutations for SeaOrmStorage

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{decode_aliases, encode_aliases, model_to_page};
use crate::errors::{LinkleafError, Result};
use crate::storage::models::{Page, PageUpdate};

use migration::entities::page;

impl SeaOrmStorage {
    pub async fn find_page_by_id(&self, id: &str) -> Result<Option<Page>> {
        let model = page::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_page))
    }

    pub async fn find_page_by_user(&self, user_id: &str) -> Result<Option<Page>> {
        let model = page::Entity::find()
            .filter(page::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_page))
    }

    pub async fn find_page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        let model = page::Entity::find()
            .filter(page::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_page))
    }

    /// Resolve a path segment to a page: direct slug first, then aliases.
    ///
    /// Aliases 以 JSON 数组存储，先用 LIKE 预筛再在内存中精确校验。
    pub async fn find_page_by_slug_or_alias(&self, slug: &str) -> Result<Option<Page>> {
        if let Some(page) = self.find_page_by_slug(slug).await? {
            return Ok(Some(page));
        }

        let needle = format!("%\"{}\"%", slug.replace(['%', '_'], ""));
        let candidates = page::Entity::find()
            .filter(page::Column::Aliases.like(&needle))
            .all(&self.db)
            .await?;

        for model in candidates {
            if decode_aliases(&model.aliases).iter().any(|a| a == slug) {
                return Ok(Some(model_to_page(model)));
            }
        }
        Ok(None)
    }

    /// Whether `slug` is already owned by a page other than `exclude_page_id`.
    pub async fn slug_exists(&self, slug: &str, exclude_page_id: Option<&str>) -> Result<bool> {
        let mut query = page::Entity::find().filter(page::Column::Slug.eq(slug));
        if let Some(id) = exclude_page_id {
            query = query.filter(page::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    pub async fn insert_page(&self, new_page: &Page) -> Result<()> {
        let model = page::ActiveModel {
            id: Set(new_page.id.clone()),
            user_id: Set(new_page.user_id.clone()),
            slug: Set(new_page.slug.clone()),
            title: Set(new_page.title.clone()),
            description: Set(new_page.description.clone()),
            banner_image: Set(new_page.banner_image.clone()),
            background_color: Set(new_page.background_color.clone()),
            text_color: Set(new_page.text_color.clone()),
            accent_color: Set(new_page.accent_color.clone()),
            font_family: Set(new_page.font_family.clone()),
            aliases: Set(encode_aliases(&new_page.aliases)),
            show_watermark: Set(new_page.show_watermark),
            created_at: Set(new_page.created_at),
            updated_at: Set(new_page.updated_at),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| LinkleafError::database_operation(format!("创建页面失败: {}", e)))?;

        info!("Page created: {} (slug: {})", new_page.id, new_page.slug);
        Ok(())
    }

    /// Apply a partial update. Untouched fields keep their value; for the
    /// clearable optionals (description, banner image, font family) an empty
    /// string stores NULL.
    pub async fn update_page(&self, update: &PageUpdate) -> Result<Page> {
        let mut model = page::ActiveModel {
            id: Set(update.id.clone()),
            ..Default::default()
        };

        if let Some(slug) = &update.slug {
            model.slug = Set(slug.clone());
        }
        if let Some(title) = &update.title {
            model.title = Set(title.clone());
        }
        if let Some(description) = &update.description {
            model.description = Set(clearable(description));
        }
        if let Some(banner_image) = &update.banner_image {
            model.banner_image = Set(clearable(banner_image));
        }
        if let Some(background_color) = &update.background_color {
            model.background_color = Set(background_color.clone());
        }
        if let Some(text_color) = &update.text_color {
            model.text_color = Set(text_color.clone());
        }
        if let Some(accent_color) = &update.accent_color {
            model.accent_color = Set(accent_color.clone());
        }
        if let Some(font_family) = &update.font_family {
            model.font_family = Set(clearable(font_family));
        }
        if let Some(aliases) = &update.aliases {
            model.aliases = Set(encode_aliases(aliases));
        }
        if let Some(show_watermark) = update.show_watermark {
            model.show_watermark = Set(show_watermark);
        }
        model.updated_at = Set(chrono::Utc::now());

        let updated = model.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                LinkleafError::not_found(format!("页面不存在: {}", update.id))
            }
            other => LinkleafError::database_operation(format!("更新页面失败: {}", other)),
        })?;

        Ok(model_to_page(updated))
    }
}

fn clearable(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
