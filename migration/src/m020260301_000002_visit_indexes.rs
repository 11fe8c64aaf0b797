//! Indexes for the analytics group-by queries over page_visits.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_visits_page_id_visited_at")
                    .table(PageVisit::Table)
                    .col(PageVisit::PageId)
                    .col(PageVisit::VisitedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_visits_referrer")
                    .table(PageVisit::Table)
                    .col(PageVisit::PageId)
                    .col(PageVisit::Referrer)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_visits_country")
                    .table(PageVisit::Table)
                    .col(PageVisit::PageId)
                    .col(PageVisit::Country)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_page_visits_country").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_page_visits_referrer").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_page_visits_page_id_visited_at")
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum PageVisit {
    #[sea_orm(iden = "page_visits")]
    Table,
    PageId,
    VisitedAt,
    Referrer,
    Country,
}
