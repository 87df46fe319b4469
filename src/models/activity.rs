use log::trace;
use sqlx::PgPool;

use super::{expect_one_row, PersistenceObject, StoreError};

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Activity {
    pub activity_id: String,
    pub name: String,
}

impl PersistenceObject for Activity {
    const TYPE_NAME: &'static str = "activity";

    fn id(&self) -> &str {
        &self.activity_id
    }

    async fn exists(db: &PgPool, id: &str) -> Result<bool, StoreError> {
        trace!("entity=activity event=exist database event initiated");
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM activities WHERE activity_id = $1")
            .bind(id)
            .fetch_one(db)
            .await?;
        trace!("entity=activity event=exist database event completed");
        Ok(count == 1)
    }

    async fn get(db: &PgPool, id: &str) -> Result<Self, StoreError> {
        trace!("entity=activity event=get database event initiated");
        let activity = sqlx::query_as::<_, Activity>(
            "SELECT activity_id, name FROM activities WHERE activity_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        trace!("entity=activity event=get database event completed");
        Ok(activity)
    }

    async fn save(&self, db: &PgPool) -> Result<(), StoreError> {
        trace!("entity=activity event=save database event initiated");
        let result = sqlx::query("INSERT INTO activities (activity_id, name) VALUES ($1, $2)")
            .bind(&self.activity_id)
            .bind(&self.name)
            .execute(db)
            .await?;
        expect_one_row(result)?;
        trace!("entity=activity event=save database event completed");
        Ok(())
    }

    async fn update(&self, db: &PgPool) -> Result<(), StoreError> {
        trace!("entity=activity event=update database event initiated");
        let result = sqlx::query("UPDATE activities SET name = $2 WHERE activity_id = $1")
            .bind(&self.activity_id)
            .bind(&self.name)
            .execute(db)
            .await?;
        expect_one_row(result)?;
        trace!("entity=activity event=update database event completed");
        Ok(())
    }

    async fn delete(db: &PgPool, id: &str) -> Result<(), StoreError> {
        trace!("entity=activity event=delete database event initiated");
        let result = sqlx::query("DELETE FROM activities WHERE activity_id = $1")
            .bind(id)
            .execute(db)
            .await?;
        expect_one_row(result)?;
        trace!("entity=activity event=delete database event completed");
        Ok(())
    }

    async fn list_all(db: &PgPool) -> Result<Vec<Self>, StoreError> {
        trace!("entity=activity event=get_all database event initiated");
        let activities = sqlx::query_as::<_, Activity>("SELECT activity_id, name FROM activities")
            .fetch_all(db)
            .await?;
        trace!("entity=activity event=get_all database event completed");
        Ok(activities)
    }
}
