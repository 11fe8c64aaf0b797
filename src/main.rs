use actix_web::{App, HttpServer, middleware::from_fn, web};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkleaf::api::services::{AnalyticsApiService, EditorApiService, public_routes};
use linkleaf::api::AuthMiddleware;
use linkleaf::config::{get_config, init_config};
use linkleaf::services::{AnalyticsService, PageService, VisitService};
use linkleaf::storage::StorageFactory;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    init_config();
    let config = get_config();

    // 初始化存储（含迁移）
    let storage = StorageFactory::create()
        .await
        .map_err(|e| std::io::Error::other(e.format_simple()))?;
    info!("Using storage backend: {}", storage.get_backend_name());

    let pages = Arc::new(PageService::new(Arc::clone(&storage)));
    let visits = Arc::new(VisitService::new(Arc::clone(&storage)));
    let analytics = Arc::new(AnalyticsService::new(Arc::clone(&storage)));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&pages)))
            .app_data(web::Data::new(Arc::clone(&visits)))
            .app_data(web::Data::new(Arc::clone(&analytics)))
            .service(
                web::scope("/api")
                    .wrap(from_fn(AuthMiddleware::editor_auth))
                    .route("/page", web::get().to(EditorApiService::get_page))
                    .route("/page", web::put().to(EditorApiService::update_page))
                    .route("/page/blocks", web::put().to(EditorApiService::save_blocks))
                    .route(
                        "/analytics",
                        web::get().to(AnalyticsApiService::get_analytics),
                    ),
            )
            .service(public_routes())
    })
    .bind(&bind_address)?
    .run()
    .await
}
