//! Content block entity: one ordered block (LINK / TEXT / HEADER) of a page

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "content_blocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub page_id: String,
    /// One of "LINK", "TEXT", "HEADER"
    pub block_type: String,
    pub position: i32,
    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub url: Option<String>,
    pub icon: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_content: Option<String>,
    pub clicks: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
