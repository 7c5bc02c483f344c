use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::Chapter;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Chapter::Table)
        .col(
            ColumnDef::new(Chapter::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Chapter::CourseId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(ColumnDef::new(Chapter::TopicId).string().string_len(26))
        .col(
            ColumnDef::new(Chapter::Title)
                .string()
                .not_null()
                .string_len(200),
        )
        .col(ColumnDef::new(Chapter::Description).text())
        .col(ColumnDef::new(Chapter::VideoUrl).string().string_len(2048))
        .col(ColumnDef::new(Chapter::PdfUrl).string().string_len(2048))
        .col(
            ColumnDef::new(Chapter::GoogleFormUrl)
                .string()
                .string_len(2048),
        )
        .col(ColumnDef::new(Chapter::Position).integer().not_null())
        .col(
            ColumnDef::new(Chapter::IsFree)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Chapter::IsPublished)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(Chapter::UnlockAt).big_integer())
        .col(ColumnDef::new(Chapter::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(Chapter::UpdatedAt).big_integer().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Chapter::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

pub struct CreateIdx1;

fn create_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_chapter_Hs8wRt")
        .table(Chapter::Table)
        .col(Chapter::CourseId)
        .col(Chapter::Position)
        .to_owned()
}

fn drop_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_chapter_Hs8wRt")
        .table(Chapter::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx1 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_idx_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

pub struct CreateIdx2;

fn create_idx_2() -> IndexCreateStatement {
    Index::create()
        .name("idx_chapter_Jc5yNd")
        .table(Chapter::Table)
        .col(Chapter::TopicId)
        .to_owned()
}

fn drop_idx_2() -> IndexDropStatement {
    Index::drop()
        .name("idx_chapter_Jc5yNd")
        .table(Chapter::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx2 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx_2().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_idx_2().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
