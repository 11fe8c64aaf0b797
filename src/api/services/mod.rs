pub mod analytics;
pub mod editor;
pub mod public;

pub use analytics::AnalyticsApiService;
pub use editor::EditorApiService;
pub use public::{PublicPageService, public_routes};

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::LinkleafError;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, code: i32, data: T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse { code, data })
}

pub(crate) fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, 0, data)
}

/// 将业务错误映射为 HTTP 状态码
pub(crate) fn error_response(error: &LinkleafError) -> HttpResponse {
    let status = match error {
        LinkleafError::Validation(_) => StatusCode::BAD_REQUEST,
        LinkleafError::Unauthorized(_) => StatusCode::FORBIDDEN,
        LinkleafError::NotFound(_) => StatusCode::NOT_FOUND,
        LinkleafError::SlugTaken(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    json_response(
        status,
        1,
        serde_json::json!({
            "error": error.message(),
            "error_code": error.code(),
        }),
    )
}
