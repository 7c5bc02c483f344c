use pensum_db::table::Category;
use pensum_shared::Identity;
use sea_query::{Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

impl super::Command {
    /// Names are unique regardless of case.
    pub async fn create_category(
        &self,
        identity: &Identity,
        input: CreateCategoryInput,
    ) -> pensum_shared::Result<String> {
        self.policy.assert_teacher(identity)?;
        input.validate()?;

        let name = input.name.trim().to_owned();
        if name.is_empty() {
            pensum_shared::bail!("name is required");
        }

        let id = pensum_shared::new_id();
        let statement = Query::insert()
            .into_table(Category::Table)
            .columns([Category::Id, Category::Name, Category::CreatedAt])
            .values_panic([
                id.to_owned().into(),
                name.to_owned().into(),
                pensum_shared::unix_now().into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                pensum_shared::bail!("category '{name}' already exists");
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(category_id = %id, name = %name, "category created");

        Ok(id)
    }
}
