//! VisitService 集成测试
//!
//! 覆盖访问记录与点击计数的软失败契约：
//! 缺失或非 LINK 区块返回 Ok(NotFound / NotALink)，从不报错。

use std::sync::{Arc, Once};

use tempfile::TempDir;

use linkleaf::config::init_config;
use linkleaf::services::VisitService;
use linkleaf::storage::{
    BlockSavePlan, BlockType, BlockWrite, ClickOutcome, NewVisit, SeaOrmStorage,
};

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
    let p = td.path().join("visit_svc_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

fn block_write(block_type: BlockType, position: i32) -> BlockWrite {
    let is_link = block_type == BlockType::Link;
    BlockWrite {
        block_type,
        position,
        title: Some(format!("block-{}", position)),
        url: is_link.then(|| "https://example.com".to_string()),
        icon: None,
        text_content: (!is_link).then(|| "body".to_string()),
    }
}

/// 一个 LINK 和一个 TEXT 区块，返回 (link_id, text_id)
async fn seed_blocks(storage: &SeaOrmStorage, page_id: &str) -> (String, String) {
    let plan = BlockSavePlan {
        creates: vec![
            block_write(BlockType::Link, 0),
            block_write(BlockType::Text, 1),
        ],
        ..Default::default()
    };
    storage.apply_block_plan(page_id, &plan).await.unwrap();

    let blocks = storage.blocks_for_page(page_id).await.unwrap();
    let link = blocks
        .iter()
        .find(|b| b.block_type == BlockType::Link)
        .unwrap();
    let text = blocks
        .iter()
        .find(|b| b.block_type == BlockType::Text)
        .unwrap();
    (link.id.clone(), text.id.clone())
}

// =============================================================================
// Click tracking soft failures
// =============================================================================

#[tokio::test]
async fn test_click_on_link_block_is_counted() {
    let (storage, _td) = create_temp_storage().await;
    let service = VisitService::new(Arc::clone(&storage));
    let (link_id, _) = seed_blocks(&storage, "p1").await;

    let outcome = service.track_click(&link_id).await.unwrap();
    assert_eq!(outcome, ClickOutcome::Counted);

    let blocks = storage.blocks_for_page("p1").await.unwrap();
    let link = blocks.iter().find(|b| b.id == link_id).unwrap();
    assert_eq!(link.clicks, 1);
}

#[tokio::test]
async fn test_click_on_text_block_is_soft_failure() {
    let (storage, _td) = create_temp_storage().await;
    let service = VisitService::new(Arc::clone(&storage));
    let (_, text_id) = seed_blocks(&storage, "p1").await;

    // Ok 而非 Err：非 LINK 区块不计数
    let outcome = service.track_click(&text_id).await.unwrap();
    assert_eq!(outcome, ClickOutcome::NotALink);

    let blocks = storage.blocks_for_page("p1").await.unwrap();
    let text = blocks.iter().find(|b| b.id == text_id).unwrap();
    assert_eq!(text.clicks, 0);
}

#[tokio::test]
async fn test_click_on_missing_block_is_soft_failure() {
    let (storage, _td) = create_temp_storage().await;
    let service = VisitService::new(Arc::clone(&storage));

    let outcome = service.track_click("no-such-block").await.unwrap();
    assert_eq!(outcome, ClickOutcome::NotFound);
}

#[tokio::test]
async fn test_click_on_deleted_block_is_not_counted() {
    let (storage, _td) = create_temp_storage().await;
    let service = VisitService::new(Arc::clone(&storage));
    let (link_id, _) = seed_blocks(&storage, "p1").await;

    let plan = BlockSavePlan {
        deletes: vec![link_id.clone()],
        ..Default::default()
    };
    storage.apply_block_plan("p1", &plan).await.unwrap();

    let outcome = service.track_click(&link_id).await.unwrap();
    assert_eq!(outcome, ClickOutcome::NotFound);
}

// =============================================================================
// Visit recording
// =============================================================================

#[tokio::test]
async fn test_record_visit_appends_event() {
    let (storage, _td) = create_temp_storage().await;
    let service = VisitService::new(Arc::clone(&storage));

    service
        .record_visit(NewVisit {
            page_id: "p1".to_string(),
            referrer: Some("https://example.com".to_string()),
            ..Default::default()
        })
        .await;

    assert_eq!(storage.count_visits("p1").await.unwrap(), 1);
}
