//! Authenticated analytics endpoint.

use std::sync::Arc;

use actix_web::{Responder, web};
use serde::Deserialize;
use tracing::error;

use crate::api::middleware::AuthUser;
use crate::errors::LinkleafError;
use crate::services::{AnalyticsService, PageService};
use crate::utils::parse_date_bound;

use super::{error_response, success_response};

/// Optional daily-series window, RFC3339 or `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub struct AnalyticsApiService;

impl AnalyticsApiService {
    pub async fn get_analytics(
        user: AuthUser,
        query: web::Query<AnalyticsQuery>,
        pages: web::Data<Arc<PageService>>,
        analytics: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let page = match pages.page_for_user(&user.0.id).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                return error_response(&LinkleafError::not_found("You don't have a page yet"));
            }
            Err(e) => return error_response(&e),
        };

        let from = match query.from.as_deref().map(parse_date_bound).transpose() {
            Ok(from) => from,
            Err(e) => return error_response(&e),
        };
        let to = match query.to.as_deref().map(parse_date_bound).transpose() {
            Ok(to) => to,
            Err(e) => return error_response(&e),
        };

        match analytics.compute_with_range(&page.id, from, to).await {
            Ok(payload) => success_response(payload),
            Err(e) => {
                error!("Analytics computation failed for page {}: {}", page.id, e);
                error_response(&e)
            }
        }
    }
}
