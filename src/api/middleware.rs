//! Editor API authentication
//!
//! Bearer-token middleware for the `/api` scope. A valid access token yields
//! a `UserIdentity` stored in request extensions; handlers receive it through
//! the `AuthUser` extractor.

use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::BoxBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
};
use std::future::{Ready, ready};
use tracing::{info, trace};

use crate::api::jwt::get_jwt_service;
use crate::services::UserIdentity;

pub struct AuthMiddleware;

impl AuthMiddleware {
    /// 编辑器 API 身份验证中间件
    pub async fn editor_auth(
        req: ServiceRequest,
        next: Next<BoxBody>,
    ) -> Result<ServiceResponse<BoxBody>, Error> {
        if req.method() == actix_web::http::Method::OPTIONS {
            // 对于 OPTIONS 请求，直接返回 204 No Content
            return Ok(req.into_response(
                HttpResponse::NoContent()
                    .insert_header(("Content-Type", "text/plain; charset=utf-8"))
                    .finish(),
            ));
        }

        // 检查 Authorization header
        if let Some(token) = Self::extract_bearer_token(&req) {
            match get_jwt_service().validate_access_token(&token) {
                Ok(claims) => {
                    trace!("Editor API authentication succeeded for {}", claims.sub);
                    req.extensions_mut().insert(claims.into_identity());
                    return next.call(req).await;
                }
                Err(e) => {
                    info!("Editor API token validation failed: {}", e);
                }
            }
        } else {
            info!("Editor API authentication failed: missing Authorization header");
        }

        Ok(req.into_response(
            HttpResponse::Unauthorized()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(serde_json::json!({
                    "code": 401,
                    "data": { "error": "Unauthorized: Invalid or missing token" }
                })),
        ))
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_string())
    }
}

/// The authenticated user, populated by `AuthMiddleware::editor_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserIdentity);

impl actix_web::FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<UserIdentity>().cloned();
        ready(match identity {
            Some(identity) => Ok(AuthUser(identity)),
            // 只会在未挂载认证中间件的路由上触发
            None => Err(actix_web::error::ErrorUnauthorized(
                "Unauthorized: missing identity",
            )),
        })
    }
}
