//! Content block queries and mutations for SeaOrmStorage

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::model_to_block;
use crate::errors::{LinkleafError, Result};
use crate::storage::models::{BlockSavePlan, BlockType, BlockWrite, ClickOutcome, ContentBlock};

use migration::entities::content_block;

impl SeaOrmStorage {
    /// All blocks of a page, ordered by position.
    pub async fn blocks_for_page(&self, page_id: &str) -> Result<Vec<ContentBlock>> {
        let models = content_block::Entity::find()
            .filter(content_block::Column::PageId.eq(page_id))
            .order_by_asc(content_block::Column::Position)
            .all(&self.db)
            .await?;

        models.into_iter().map(model_to_block).collect()
    }

    /// Apply one save's create/update/delete reconciliation as a single
    /// transaction: partial application never hits the database.
    pub async fn apply_block_plan(&self, page_id: &str, plan: &BlockSavePlan) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LinkleafError::database_operation(format!("开始事务失败: {}", e)))?;

        if !plan.deletes.is_empty() {
            content_block::Entity::delete_many()
                .filter(content_block::Column::PageId.eq(page_id))
                .filter(content_block::Column::Id.is_in(plan.deletes.iter().cloned()))
                .exec(&txn)
                .await
                .map_err(|e| LinkleafError::database_operation(format!("删除区块失败: {}", e)))?;
        }

        let now = chrono::Utc::now();
        for write in &plan.creates {
            let mut model = write_to_active_model(write, page_id);
            model.id = Set(uuid::Uuid::new_v4().to_string());
            model.clicks = Set(0);
            model.created_at = Set(now);
            model.updated_at = Set(now);
            model
                .insert(&txn)
                .await
                .map_err(|e| LinkleafError::database_operation(format!("创建区块失败: {}", e)))?;
        }

        for (id, write) in &plan.updates {
            let mut model = write_to_active_model(write, page_id);
            model.id = Set(id.clone());
            model.updated_at = Set(now);
            model
                .update(&txn)
                .await
                .map_err(|e| LinkleafError::database_operation(format!("更新区块失败: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| LinkleafError::database_operation(format!("提交事务失败: {}", e)))?;

        info!(
            "Blocks reconciled for page {}: {} created, {} updated, {} deleted",
            page_id,
            plan.creates.len(),
            plan.updates.len(),
            plan.deletes.len()
        );
        Ok(())
    }

    /// Atomic server-side `clicks = clicks + 1`. Lost updates under
    /// concurrent visitors are not possible; there is no read-modify-write.
    pub async fn increment_click(&self, block_id: &str) -> Result<ClickOutcome> {
        let block = content_block::Entity::find_by_id(block_id)
            .one(&self.db)
            .await?;

        let Some(block) = block else {
            debug!("Click ignored, block not found: {}", block_id);
            return Ok(ClickOutcome::NotFound);
        };

        if BlockType::parse(&block.block_type) != Some(BlockType::Link) {
            debug!("Click ignored, block {} is not a LINK", block_id);
            return Ok(ClickOutcome::NotALink);
        }

        let result = content_block::Entity::update_many()
            .col_expr(
                content_block::Column::Clicks,
                Expr::col(content_block::Column::Clicks).add(1),
            )
            .filter(content_block::Column::Id.eq(block_id))
            .exec(&self.db)
            .await
            .map_err(|e| LinkleafError::database_operation(format!("点击计数失败: {}", e)))?;

        // 类型检查和自增是两条语句，期间区块被删除时不计数
        if result.rows_affected == 0 {
            debug!("Click ignored, block {} vanished before update", block_id);
            return Ok(ClickOutcome::NotFound);
        }

        Ok(ClickOutcome::Counted)
    }

    /// LINK blocks of a page ordered by click count descending, truncated to
    /// `limit`. Ties keep position order (the original query order).
    pub async fn top_clicked_links(&self, page_id: &str, limit: u64) -> Result<Vec<ContentBlock>> {
        let models = content_block::Entity::find()
            .filter(content_block::Column::PageId.eq(page_id))
            .filter(content_block::Column::BlockType.eq(BlockType::Link.as_str()))
            .order_by_desc(content_block::Column::Clicks)
            .order_by_asc(content_block::Column::Position)
            .limit(limit)
            .all(&self.db)
            .await?;

        models.into_iter().map(model_to_block).collect()
    }
}

fn write_to_active_model(write: &BlockWrite, page_id: &str) -> content_block::ActiveModel {
    content_block::ActiveModel {
        page_id: Set(page_id.to_string()),
        block_type: Set(write.block_type.as_str().to_string()),
        position: Set(write.position),
        title: Set(write.title.clone()),
        url: Set(write.url.clone()),
        icon: Set(write.icon.clone()),
        text_content: Set(write.text_content.clone()),
        ..Default::default()
    }
}
