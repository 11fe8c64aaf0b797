//! AnalyticsService 集成测试
//!
//! 覆盖总量/窗口计数、按日分组（只返回有访问的日期）、
//! referrer/地理分组以及 top links 排序。

use std::sync::{Arc, Once};

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Set};
use tempfile::TempDir;

use linkleaf::config::init_config;
use linkleaf::services::AnalyticsService;
use linkleaf::storage::{
    BlockSavePlan, BlockType, BlockWrite, NewVisit, Page, SeaOrmStorage,
};

use migration::entities::page_visit;

// =============================================================================
// Test Setup
// =============================================================================

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("analytics_svc_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

async fn create_page(storage: &SeaOrmStorage) -> Page {
    let now = Utc::now();
    let page = Page {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: "u1".to_string(),
        slug: "alice".to_string(),
        title: "Alice's Page".to_string(),
        description: None,
        banner_image: None,
        background_color: "#FFFFFF".to_string(),
        text_color: "#000000".to_string(),
        accent_color: "#3B82F6".to_string(),
        font_family: None,
        aliases: vec![],
        show_watermark: true,
        created_at: now,
        updated_at: now,
    };
    storage.insert_page(&page).await.unwrap();
    page
}

async fn record_visit(storage: &SeaOrmStorage, page_id: &str, referrer: Option<&str>) {
    storage
        .insert_visit(&NewVisit {
            page_id: page_id.to_string(),
            referrer: referrer.map(String::from),
            ..Default::default()
        })
        .await
        .unwrap();
}

/// 直接写入一条指定时间的访问记录（insert_visit 固定使用当前时间）
async fn record_visit_at(
    storage: &SeaOrmStorage,
    page_id: &str,
    days_ago: i64,
    country: Option<&str>,
) {
    let model = page_visit::ActiveModel {
        page_id: Set(page_id.to_string()),
        country: Set(country.map(String::from)),
        visited_at: Set(Utc::now() - Duration::days(days_ago)),
        ..Default::default()
    };
    model.insert(storage.get_db()).await.unwrap();
}

// =============================================================================
// Empty state
// =============================================================================

#[tokio::test]
async fn test_page_without_visits_yields_zeroes() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    let analytics = service.compute(&page.id).await.unwrap();

    assert_eq!(analytics.total_visits, 0);
    assert_eq!(analytics.visits_last_7_days, 0);
    assert_eq!(analytics.visits_last_30_days, 0);
    assert!(analytics.daily.is_empty());
    assert!(analytics.top_referrers.is_empty());
    assert!(analytics.top_locations.is_empty());
    assert!(analytics.top_links.is_empty());
}

// =============================================================================
// Windowed counts
// =============================================================================

#[tokio::test]
async fn test_windowed_counts() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    for _ in 0..3 {
        record_visit(&storage, &page.id, None).await;
    }
    for _ in 0..2 {
        record_visit_at(&storage, &page.id, 10, None).await;
    }
    record_visit_at(&storage, &page.id, 40, None).await;

    let analytics = service.compute(&page.id).await.unwrap();

    assert_eq!(analytics.total_visits, 6);
    assert_eq!(analytics.visits_last_7_days, 3);
    assert_eq!(analytics.visits_last_30_days, 5);
}

#[tokio::test]
async fn test_counts_are_scoped_to_page() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    record_visit(&storage, &page.id, None).await;
    record_visit(&storage, "some-other-page", None).await;

    let analytics = service.compute(&page.id).await.unwrap();
    assert_eq!(analytics.total_visits, 1);
}

// =============================================================================
// Daily series
// =============================================================================

#[tokio::test]
async fn test_daily_series_has_observed_days_only() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    // 今天两次、5 天前一次，中间的日期不补零
    record_visit(&storage, &page.id, None).await;
    record_visit(&storage, &page.id, None).await;
    record_visit_at(&storage, &page.id, 5, None).await;

    let analytics = service.compute(&page.id).await.unwrap();

    assert_eq!(analytics.daily.len(), 2);
    // 按日期升序
    assert!(analytics.daily[0].day < analytics.daily[1].day);
    assert_eq!(analytics.daily[0].visits, 1);
    assert_eq!(analytics.daily[1].visits, 2);
}

#[tokio::test]
async fn test_explicit_range_narrows_daily_series() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    record_visit(&storage, &page.id, None).await;
    record_visit_at(&storage, &page.id, 5, None).await;

    let from = Utc::now() - Duration::days(2);
    let analytics = service
        .compute_with_range(&page.id, Some(from), None)
        .await
        .unwrap();

    assert_eq!(analytics.daily.len(), 1);
    assert_eq!(analytics.daily[0].visits, 1);
}

// =============================================================================
// Referrers and locations
// =============================================================================

#[tokio::test]
async fn test_top_referrers_grouped_and_ordered() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    for _ in 0..3 {
        record_visit(&storage, &page.id, Some("https://twitter.com")).await;
    }
    record_visit(&storage, &page.id, Some("https://github.com")).await;
    // 无 referrer 的访问不参与分组
    record_visit(&storage, &page.id, None).await;

    let analytics = service.compute(&page.id).await.unwrap();

    assert_eq!(analytics.top_referrers.len(), 2);
    assert_eq!(analytics.top_referrers[0].source, "https://twitter.com");
    assert_eq!(analytics.top_referrers[0].count, 3);
    assert_eq!(analytics.top_referrers[1].source, "https://github.com");
    assert_eq!(analytics.top_referrers[1].count, 1);
}

#[tokio::test]
async fn test_top_locations_grouped() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    record_visit_at(&storage, &page.id, 0, Some("DE")).await;
    record_visit_at(&storage, &page.id, 0, Some("DE")).await;
    record_visit_at(&storage, &page.id, 0, Some("FR")).await;
    record_visit_at(&storage, &page.id, 0, None).await;

    let analytics = service.compute(&page.id).await.unwrap();

    assert_eq!(analytics.top_locations.len(), 2);
    assert_eq!(analytics.top_locations[0].source, "DE");
    assert_eq!(analytics.top_locations[0].count, 2);
}

// =============================================================================
// Top links
// =============================================================================

#[tokio::test]
async fn test_top_links_ties_keep_position_order() {
    let (storage, _td) = create_temp_storage().await;
    let page = create_page(&storage).await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    let mut plan = BlockSavePlan::default();
    for position in 0..4 {
        plan.creates.push(BlockWrite {
            block_type: BlockType::Link,
            position,
            title: Some(format!("Link {}", position)),
            url: Some("https://example.com".to_string()),
            icon: None,
            text_content: None,
        });
    }
    // 一个 TEXT 区块，不应出现在 top links 中
    plan.creates.push(BlockWrite {
        block_type: BlockType::Text,
        position: 4,
        title: Some("About".to_string()),
        url: None,
        icon: None,
        text_content: Some("hello".to_string()),
    });
    storage.apply_block_plan(&page.id, &plan).await.unwrap();

    let blocks = storage.blocks_for_page(&page.id).await.unwrap();
    let clicks_by_position = [5usize, 1, 5, 0];
    for block in &blocks {
        if block.block_type != BlockType::Link {
            continue;
        }
        for _ in 0..clicks_by_position[block.position as usize] {
            storage.increment_click(&block.id).await.unwrap();
        }
    }

    let analytics = service.compute(&page.id).await.unwrap();

    let titles: Vec<&str> = analytics
        .top_links
        .iter()
        .map(|l| l.title.as_str())
        .collect();
    // 并列 5 次点击的两个链接按 position 顺序排列，0 次点击的排最后
    assert_eq!(titles, vec!["Link 0", "Link 2", "Link 1", "Link 3"]);
    assert_eq!(analytics.top_links[0].clicks, 5);
    assert_eq!(analytics.top_links[3].clicks, 0);

    // top-2 截断：两个并列 5 次点击的链接，按原始相对顺序
    let top2 = service.top_links(&page.id, 2).await.unwrap();
    let top2_titles: Vec<&str> = top2.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(top2_titles, vec!["Link 0", "Link 2"]);
}
