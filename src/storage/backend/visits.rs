//! Page visit recording and analytics queries
//!
//! 提供访问记录的统计查询方法，供 AnalyticsService 调用。

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::SeaOrmStorage;
use crate::storage::models::NewVisit;

use migration::entities::page_visit;

// ============ 查询结果类型 ============

/// 按日分组查询结果行
#[derive(Debug, FromQueryResult)]
pub struct DayRow {
    pub label: String,
    pub count: i64,
}

/// 分组计数查询结果行（referrer / country）
#[derive(Debug, FromQueryResult)]
pub struct CountRow {
    pub value: Option<String>,
    pub count: i64,
}

// ============ SeaOrmStorage visit 方法 ============

impl SeaOrmStorage {
    /// Append one visit event. Never mutated or deleted afterwards.
    pub async fn insert_visit(&self, visit: &NewVisit) -> anyhow::Result<()> {
        let model = page_visit::ActiveModel {
            page_id: Set(visit.page_id.clone()),
            visitor_user_id: Set(visit.visitor_user_id.clone()),
            ip: Set(visit.ip.clone()),
            user_agent: Set(visit.user_agent.clone()),
            referrer: Set(visit.referrer.clone()),
            country: Set(visit.country.clone()),
            city: Set(visit.city.clone()),
            visited_at: Set(Utc::now()),
            ..Default::default()
        };

        model.insert(&self.db).await?;
        Ok(())
    }

    /// 统计页面的总访问数
    pub async fn count_visits(&self, page_id: &str) -> anyhow::Result<u64> {
        page_visit::Entity::find()
            .filter(page_visit::Column::PageId.eq(page_id))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 统计时间窗口内的访问数
    pub async fn count_visits_since(
        &self,
        page_id: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        page_visit::Entity::find()
            .filter(page_visit::Column::PageId.eq(page_id))
            .filter(page_visit::Column::VisitedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 按日历日分组的访问趋势，只返回有访问的日期（不补零）
    pub async fn daily_visits(
        &self,
        page_id: &str,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<DayRow>> {
        let date_expr = self.day_format_expr();
        let mut query = page_visit::Entity::find()
            .select_only()
            .column_as(date_expr.clone(), "label")
            .column_as(page_visit::Column::Id.count(), "count")
            .filter(page_visit::Column::PageId.eq(page_id))
            .filter(page_visit::Column::VisitedAt.gte(since));
        if let Some(until) = until {
            query = query.filter(page_visit::Column::VisitedAt.lte(until));
        }
        query
            .group_by(date_expr)
            .order_by_asc(Expr::cust("label"))
            .into_model::<DayRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 来源统计：非空 referrer 分组计数，按数量降序
    pub async fn top_referrers(&self, page_id: &str, limit: u64) -> anyhow::Result<Vec<CountRow>> {
        page_visit::Entity::find()
            .select_only()
            .column_as(page_visit::Column::Referrer, "value")
            .column_as(page_visit::Column::Id.count(), "count")
            .filter(page_visit::Column::PageId.eq(page_id))
            .filter(page_visit::Column::Referrer.is_not_null())
            .group_by(page_visit::Column::Referrer)
            .order_by_desc(Expr::cust("count"))
            .limit(limit)
            .into_model::<CountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 地理位置统计：非空 country 分组计数，按数量降序
    pub async fn top_countries(&self, page_id: &str, limit: u64) -> anyhow::Result<Vec<CountRow>> {
        page_visit::Entity::find()
            .select_only()
            .column_as(page_visit::Column::Country, "value")
            .column_as(page_visit::Column::Id.count(), "count")
            .filter(page_visit::Column::PageId.eq(page_id))
            .filter(page_visit::Column::Country.is_not_null())
            .group_by(page_visit::Column::Country)
            .order_by_desc(Expr::cust("count"))
            .limit(limit)
            .into_model::<CountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    fn day_format_expr(&self) -> Expr {
        let backend = match self.get_backend_name() {
            "sqlite" => DbBackend::Sqlite,
            "mysql" => DbBackend::MySql,
            _ => DbBackend::Postgres,
        };

        match backend {
            DbBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', visited_at)"),
            DbBackend::MySql => Expr::cust("DATE_FORMAT(visited_at, '%Y-%m-%d')"),
            _ => Expr::cust("TO_CHAR(visited_at, 'YYYY-MM-DD')"),
        }
    }
}
