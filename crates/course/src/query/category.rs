use pensum_db::table::Category;
use sea_query::{Order, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
}

impl super::Query {
    pub async fn list_categories(&self) -> pensum_shared::Result<Vec<CategoryRow>> {
        let statement = sea_query::Query::select()
            .columns([Category::Id, Category::Name])
            .from(Category::Table)
            .order_by(Category::Name, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, CategoryRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?)
    }
}
