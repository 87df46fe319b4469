use chrono::{DateTime, Utc};
use log::trace;
use sqlx::PgPool;
use std::time::Duration;

use super::{expect_one_row, PersistenceObject, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub workout_id: String,
    pub activity_id: String,
    pub timestamp: DateTime<Utc>,
    pub calories_burned: i64,
    pub duration: Duration,
}

// Column layout of the workouts table; duration is stored in milliseconds.
#[derive(sqlx::FromRow)]
struct WorkoutRow {
    workout_id: String,
    activity_id: String,
    timestamp: DateTime<Utc>,
    calorie: i64,
    duration: i64,
}

impl TryFrom<WorkoutRow> for Workout {
    type Error = StoreError;

    fn try_from(row: WorkoutRow) -> Result<Self, Self::Error> {
        let millis = u64::try_from(row.duration).map_err(|_| StoreError::InvalidColumn {
            column: "duration",
            reason: format!("negative duration {}", row.duration),
        })?;
        Ok(Workout {
            workout_id: row.workout_id,
            activity_id: row.activity_id,
            timestamp: row.timestamp,
            calories_burned: row.calorie,
            duration: Duration::from_millis(millis),
        })
    }
}

impl Workout {
    fn duration_millis(&self) -> Result<i64, StoreError> {
        i64::try_from(self.duration.as_millis()).map_err(|_| StoreError::InvalidColumn {
            column: "duration",
            reason: "duration does not fit in a BIGINT".to_string(),
        })
    }
}

impl PersistenceObject for Workout {
    const TYPE_NAME: &'static str = "workout";

    fn id(&self) -> &str {
        &self.workout_id
    }

    async fn exists(db: &PgPool, id: &str) -> Result<bool, StoreError> {
        trace!("entity=workout event=exist database event initiated");
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM workouts WHERE workout_id = $1")
            .bind(id)
            .fetch_one(db)
            .await?;
        trace!("entity=workout event=exist database event completed");
        Ok(count == 1)
    }

    async fn get(db: &PgPool, id: &str) -> Result<Self, StoreError> {
        trace!("entity=workout event=get database event initiated");
        let row = sqlx::query_as::<_, WorkoutRow>(
            "SELECT workout_id, activity_id, timestamp, calorie, duration FROM workouts WHERE workout_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        trace!("entity=workout event=get database event completed");
        Workout::try_from(row)
    }

    async fn save(&self, db: &PgPool) -> Result<(), StoreError> {
        trace!("entity=workout event=save database event initiated");
        let result = sqlx::query(
            "INSERT INTO workouts (workout_id, activity_id, timestamp, calorie, duration) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&self.workout_id)
        .bind(&self.activity_id)
        .bind(self.timestamp)
        .bind(self.calories_burned)
        .bind(self.duration_millis()?)
        .execute(db)
        .await?;
        expect_one_row(result)?;
        trace!("entity=workout event=save database event completed");
        Ok(())
    }

    async fn update(&self, db: &PgPool) -> Result<(), StoreError> {
        trace!("entity=workout event=update database event initiated");
        let result = sqlx::query(
            "UPDATE workouts SET activity_id = $2, timestamp = $3, calorie = $4, duration = $5 WHERE workout_id = $1",
        )
        .bind(&self.workout_id)
        .bind(&self.activity_id)
        .bind(self.timestamp)
        .bind(self.calories_burned)
        .bind(self.duration_millis()?)
        .execute(db)
        .await?;
        expect_one_row(result)?;
        trace!("entity=workout event=update database event completed");
        Ok(())
    }

    async fn delete(db: &PgPool, id: &str) -> Result<(), StoreError> {
        trace!("entity=workout event=delete database event initiated");
        let result = sqlx::query("DELETE FROM workouts WHERE workout_id = $1")
            .bind(id)
            .execute(db)
            .await?;
        expect_one_row(result)?;
        trace!("entity=workout event=delete database event completed");
        Ok(())
    }

    async fn list_all(db: &PgPool) -> Result<Vec<Self>, StoreError> {
        trace!("entity=workout event=get_all database event initiated");
        let rows = sqlx::query_as::<_, WorkoutRow>(
            "SELECT workout_id, activity_id, timestamp, calorie, duration FROM workouts",
        )
        .fetch_all(db)
        .await?;
        trace!("entity=workout event=get_all database event completed");
        rows.into_iter().map(Workout::try_from).collect()
    }
}
