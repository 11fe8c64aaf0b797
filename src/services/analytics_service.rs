//! Analytics service layer
//!
//! Read-side aggregation over page visits and content blocks, scoped to one
//! page. All queries are read-only and idempotent; a page with no recorded
//! visits yields zeroed totals and empty collections, never an error.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::errors::{LinkleafError, Result};
use crate::storage::{ContentBlock, SeaOrmStorage};

/// Top-N limits used by the dashboard.
const TOP_SOURCES_LIMIT: u64 = 5;
const TOP_LINKS_LIMIT: u64 = 10;

/// 滑动窗口天数
const DAILY_WINDOW_DAYS: i64 = 30;

/// One observed calendar day and its visit count. Days without visits are
/// not zero-filled; only observed days appear, chronologically.
#[derive(Debug, Clone, Serialize)]
pub struct DailyVisits {
    pub day: String,
    pub visits: u64,
}

/// A grouped referrer or location count.
#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

/// One LINK block in the top-clicked ranking.
#[derive(Debug, Clone, Serialize)]
pub struct TopLinkStats {
    pub id: String,
    pub title: String,
    pub url: String,
    pub clicks: u64,
}

/// Full analytics payload for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageAnalytics {
    pub total_visits: u64,
    pub visits_last_7_days: u64,
    pub visits_last_30_days: u64,
    pub daily: Vec<DailyVisits>,
    pub top_referrers: Vec<SourceCount>,
    pub top_locations: Vec<SourceCount>,
    pub top_links: Vec<TopLinkStats>,
}

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Compute the full dashboard payload for one page, with the daily
    /// series covering the last 30 days.
    pub async fn compute(&self, page_id: &str) -> Result<PageAnalytics> {
        self.compute_with_range(page_id, None, None).await
    }

    /// Same as `compute`, with an explicit daily-series window. `from`
    /// defaults to 30 days ago; an open `to` means "up to now".
    pub async fn compute_with_range(
        &self,
        page_id: &str,
        from: Option<chrono::DateTime<Utc>>,
        to: Option<chrono::DateTime<Utc>>,
    ) -> Result<PageAnalytics> {
        let now = Utc::now();

        let total_visits = self
            .storage
            .count_visits(page_id)
            .await
            .map_err(|e| query_failed("total visits", e))?;

        let visits_last_7_days = self
            .storage
            .count_visits_since(page_id, now - Duration::days(7))
            .await
            .map_err(|e| query_failed("7-day visits", e))?;

        let visits_last_30_days = self
            .storage
            .count_visits_since(page_id, now - Duration::days(30))
            .await
            .map_err(|e| query_failed("30-day visits", e))?;

        let daily_from = from.unwrap_or_else(|| now - Duration::days(DAILY_WINDOW_DAYS));
        let daily = self
            .storage
            .daily_visits(page_id, daily_from, to)
            .await
            .map_err(|e| query_failed("daily visits", e))?
            .into_iter()
            .map(|row| DailyVisits {
                day: row.label,
                visits: row.count as u64,
            })
            .collect();

        let top_referrers = self
            .storage
            .top_referrers(page_id, TOP_SOURCES_LIMIT)
            .await
            .map_err(|e| query_failed("top referrers", e))?
            .into_iter()
            .map(|row| SourceCount {
                source: row.value.unwrap_or_else(|| "Direct".to_string()),
                count: row.count as u64,
            })
            .collect();

        let top_locations = self
            .storage
            .top_countries(page_id, TOP_SOURCES_LIMIT)
            .await
            .map_err(|e| query_failed("top locations", e))?
            .into_iter()
            .map(|row| SourceCount {
                source: row.value.unwrap_or_else(|| "Unknown".to_string()),
                count: row.count as u64,
            })
            .collect();

        let top_links = self.top_links(page_id, TOP_LINKS_LIMIT).await?;

        debug!("Analytics computed for page {}", page_id);

        Ok(PageAnalytics {
            total_visits,
            visits_last_7_days,
            visits_last_30_days,
            daily,
            top_referrers,
            top_locations,
            top_links,
        })
    }

    /// Top-N clicked LINK blocks, descending by click count. Ties keep the
    /// original position order.
    pub async fn top_links(&self, page_id: &str, limit: u64) -> Result<Vec<TopLinkStats>> {
        let blocks = self.storage.top_clicked_links(page_id, limit.min(100)).await?;
        Ok(rank_top_links(&blocks, limit as usize))
    }
}

/// Pure ranking over an already click-sorted or unsorted block slice: stable
/// descending sort by clicks, truncated to `n`.
pub fn rank_top_links(blocks: &[ContentBlock], n: usize) -> Vec<TopLinkStats> {
    let mut links: Vec<&ContentBlock> = blocks.iter().collect();
    links.sort_by(|a, b| b.clicks.cmp(&a.clicks));
    links
        .into_iter()
        .take(n)
        .map(|block| TopLinkStats {
            id: block.id.clone(),
            title: block
                .title
                .clone()
                .unwrap_or_else(|| "Untitled Link".to_string()),
            url: block.url.clone().unwrap_or_else(|| "#".to_string()),
            clicks: block.clicks.max(0) as u64,
        })
        .collect()
}

fn query_failed(what: &str, e: anyhow::Error) -> LinkleafError {
    LinkleafError::database_operation(format!("Analytics {} query failed: {}", what, e))
}
