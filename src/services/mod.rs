pub mod analytics_service;
pub mod page_service;
pub mod visit_service;

pub use analytics_service::{
    AnalyticsService, DailyVisits, PageAnalytics, SourceCount, TopLinkStats,
};
pub use page_service::{PageService, UserIdentity, UserPageRepository};
pub use visit_service::VisitService;
