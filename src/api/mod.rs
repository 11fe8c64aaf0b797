pub mod jwt;
pub mod middleware;
pub mod services;

pub use middleware::{AuthMiddleware, AuthUser};
pub use services::{AnalyticsApiService, ApiResponse, EditorApiService, PublicPageService};
