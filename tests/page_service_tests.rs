//! PageService 集成测试
//!
//! 覆盖首次访问建页、默认 slug 推导与去重、更新授权、
//! slug 冲突检测与 alias 解析。

use std::sync::{Arc, Once};

use tempfile::TempDir;

use linkleaf::config::init_config;
use linkleaf::errors::LinkleafError;
use linkleaf::services::{PageService, UserIdentity};
use linkleaf::storage::{PageUpdate, SeaOrmStorage};

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
    let p = td.path().join("page_svc_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

fn user(id: &str, email: Option<&str>, name: Option<&str>) -> UserIdentity {
    UserIdentity {
        id: id.to_string(),
        email: email.map(String::from),
        name: name.map(String::from),
    }
}

// =============================================================================
// Page creation and default slugs
// =============================================================================

#[tokio::test]
async fn test_first_visit_creates_page_with_email_slug() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (page, blocks) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), Some("Alice")))
        .await
        .unwrap();

    assert_eq!(page.slug, "alice");
    assert_eq!(page.title, "Alice");
    assert_eq!(page.user_id, "u1");
    assert!(page.show_watermark);

    // 初始页面带一个默认链接区块
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title.as_deref(), Some("My Website"));
    assert_eq!(blocks[0].url.as_deref(), Some("https://example.com"));
}

#[tokio::test]
async fn test_second_visit_returns_same_page() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);
    let alice = user("u1", Some("alice@example.com"), None);

    let (first, _) = service.ensure_page_for_user(&alice).await.unwrap();
    let (second, _) = service.ensure_page_for_user(&alice).await.unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_taken_slug_gets_random_suffix() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (first, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();
    let (second, _) = service
        .ensure_page_for_user(&user("u2", Some("alice@other.com"), None))
        .await
        .unwrap();

    assert_eq!(first.slug, "alice");
    assert!(second.slug.starts_with("alice-"));
    let suffix = second.slug.strip_prefix("alice-").unwrap();
    assert_eq!(suffix.len(), 5);
    assert!(
        suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    );
}

#[tokio::test]
async fn test_missing_email_falls_back_to_name_then_page() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (named, _) = service
        .ensure_page_for_user(&user("u1", None, Some("Bob Jones")))
        .await
        .unwrap();
    assert_eq!(named.slug, "bobjones");

    let (anonymous, _) = service
        .ensure_page_for_user(&user("u2", None, None))
        .await
        .unwrap();
    assert_eq!(anonymous.slug, "page");
    assert_eq!(anonymous.title, "My Link Page");
}

// =============================================================================
// Updates: authorization and validation
// =============================================================================

#[tokio::test]
async fn test_update_by_non_owner_rejected() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (page, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();

    let mut update = PageUpdate::new(&page.id);
    update.title = Some("Hijacked".to_string());

    let result = service.update_page("u2", update).await;
    assert!(matches!(result, Err(LinkleafError::Unauthorized(_))));

    // 原页面保持不变
    let (unchanged, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();
    assert_ne!(unchanged.title, "Hijacked");
}

#[tokio::test]
async fn test_slug_change_to_taken_slug_rejected() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (_alice, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();
    let (bob, _) = service
        .ensure_page_for_user(&user("u2", Some("bob@example.com"), None))
        .await
        .unwrap();

    let mut update = PageUpdate::new(&bob.id);
    update.slug = Some("alice".to_string());

    let result = service.update_page("u2", update).await;
    assert!(matches!(result, Err(LinkleafError::SlugTaken(_))));

    // bob 的 slug 不变
    let (bob_after, _) = service
        .ensure_page_for_user(&user("u2", Some("bob@example.com"), None))
        .await
        .unwrap();
    assert_eq!(bob_after.slug, "bob");
}

#[tokio::test]
async fn test_keeping_own_slug_is_allowed() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (page, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();

    let mut update = PageUpdate::new(&page.id);
    update.slug = Some("alice".to_string());
    update.title = Some("Still Alice".to_string());

    let updated = service.update_page("u1", update).await.unwrap();
    assert_eq!(updated.slug, "alice");
    assert_eq!(updated.title, "Still Alice");
}

#[tokio::test]
async fn test_invalid_slug_rejected() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (page, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();

    let mut update = PageUpdate::new(&page.id);
    update.slug = Some("Not A Slug".to_string());

    let result = service.update_page("u1", update).await;
    assert!(matches!(result, Err(LinkleafError::Validation(_))));
}

#[tokio::test]
async fn test_invalid_banner_url_rejected() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (page, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();

    let mut update = PageUpdate::new(&page.id);
    update.banner_image = Some("not a url".to_string());

    let result = service.update_page("u1", update).await;
    assert!(matches!(result, Err(LinkleafError::Validation(_))));
}

#[tokio::test]
async fn test_empty_string_clears_description() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (page, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();

    let mut set = PageUpdate::new(&page.id);
    set.description = Some("A description".to_string());
    let with_description = service.update_page("u1", set).await.unwrap();
    assert_eq!(with_description.description.as_deref(), Some("A description"));

    let mut clear = PageUpdate::new(&page.id);
    clear.description = Some(String::new());
    let cleared = service.update_page("u1", clear).await.unwrap();
    assert!(cleared.description.is_none());
}

// =============================================================================
// Public resolution: slug and aliases
// =============================================================================

#[tokio::test]
async fn test_resolve_by_slug_and_alias() {
    let (storage, _td) = create_temp_storage().await;
    let service = PageService::new(storage);

    let (page, _) = service
        .ensure_page_for_user(&user("u1", Some("alice@example.com"), None))
        .await
        .unwrap();

    let mut update = PageUpdate::new(&page.id);
    update.aliases = Some(vec!["  ally  ".to_string(), "".to_string(), "al".to_string()]);
    service.update_page("u1", update).await.unwrap();

    let by_slug = service.resolve_public("alice").await.unwrap();
    assert!(by_slug.is_some());

    // alias 在保存时被 trim，空白项被丢弃
    let by_alias = service.resolve_public("ally").await.unwrap();
    assert_eq!(by_alias.unwrap().0.id, page.id);

    let by_short_alias = service.resolve_public("al").await.unwrap();
    assert_eq!(by_short_alias.unwrap().0.id, page.id);

    assert!(service.resolve_public("nobody").await.unwrap().is_none());
}
