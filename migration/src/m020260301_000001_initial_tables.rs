use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 pages 表
        manager
            .create_table(
                Table::create()
                    .table(Page::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Page::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Page::UserId).string().not_null())
                    .col(ColumnDef::new(Page::Slug).string().not_null())
                    .col(ColumnDef::new(Page::Title).string().not_null())
                    .col(ColumnDef::new(Page::Description).text().null())
                    .col(ColumnDef::new(Page::BannerImage).text().null())
                    .col(
                        ColumnDef::new(Page::BackgroundColor)
                            .string()
                            .not_null()
                            .default("#FFFFFF"),
                    )
                    .col(
                        ColumnDef::new(Page::TextColor)
                            .string()
                            .not_null()
                            .default("#000000"),
                    )
                    .col(
                        ColumnDef::new(Page::AccentColor)
                            .string()
                            .not_null()
                            .default("#3B82F6"),
                    )
                    .col(ColumnDef::new(Page::FontFamily).string().null())
                    // JSON 数组，如 ["alias-a", "alias-b"]
                    .col(
                        ColumnDef::new(Page::Aliases)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Page::ShowWatermark)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Page::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Page::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个用户最多一个页面
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pages_user_id")
                    .table(Page::Table)
                    .col(Page::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // slug 全局唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pages_slug")
                    .table(Page::Table)
                    .col(Page::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 创建 content_blocks 表
        manager
            .create_table(
                Table::create()
                    .table(ContentBlock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentBlock::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentBlock::PageId).string().not_null())
                    .col(ColumnDef::new(ContentBlock::BlockType).string().not_null())
                    .col(
                        ColumnDef::new(ContentBlock::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ContentBlock::Title).string().null())
                    .col(ColumnDef::new(ContentBlock::Url).text().null())
                    .col(ColumnDef::new(ContentBlock::Icon).string().null())
                    .col(ColumnDef::new(ContentBlock::TextContent).text().null())
                    .col(
                        ColumnDef::new(ContentBlock::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContentBlock::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentBlock::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_content_blocks_page_id")
                    .table(ContentBlock::Table)
                    .col(ContentBlock::PageId)
                    .to_owned(),
            )
            .await?;

        // 创建 page_visits 表
        manager
            .create_table(
                Table::create()
                    .table(PageVisit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PageVisit::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PageVisit::PageId).string().not_null())
                    .col(ColumnDef::new(PageVisit::VisitorUserId).string().null())
                    .col(ColumnDef::new(PageVisit::Ip).string().null())
                    .col(ColumnDef::new(PageVisit::UserAgent).text().null())
                    .col(ColumnDef::new(PageVisit::Referrer).text().null())
                    .col(ColumnDef::new(PageVisit::Country).string().null())
                    .col(ColumnDef::new(PageVisit::City).string().null())
                    .col(
                        ColumnDef::new(PageVisit::VisitedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PageVisit::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ContentBlock::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_pages_slug").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_pages_user_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Page::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Page {
    #[sea_orm(iden = "pages")]
    Table,
    Id,
    UserId,
    Slug,
    Title,
    Description,
    BannerImage,
    BackgroundColor,
    TextColor,
    AccentColor,
    FontFamily,
    Aliases,
    ShowWatermark,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContentBlock {
    #[sea_orm(iden = "content_blocks")]
    Table,
    Id,
    PageId,
    BlockType,
    Position,
    Title,
    Url,
    Icon,
    TextContent,
    Clicks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PageVisit {
    #[sea_orm(iden = "page_visits")]
    Table,
    Id,
    PageId,
    VisitorUserId,
    Ip,
    UserAgent,
    Referrer,
    Country,
    City,
    VisitedAt,
}
