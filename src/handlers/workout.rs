use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use super::resource::Resource;
use crate::errors::AppError;
use crate::models::activity::Activity;
use crate::models::workout::Workout;
use crate::models::PersistenceObject;
use crate::utils::validation::{
    duration_from_millis, duration_to_millis, format_timestamp, parse_timestamp, required,
};

#[derive(Deserialize, Validate, Debug)]
pub struct WorkoutRequest {
    #[validate(required(message = "Activity id is required"))]
    activity_id: Option<String>,

    #[validate(required(message = "Timestamp is required"))]
    timestamp: Option<String>,

    #[validate(required(message = "Calories burned is required"))]
    calories_burned: Option<i64>,

    /// Milliseconds; negative values are rejected when the workout is built.
    #[validate(required(message = "Duration is required"))]
    duration: Option<i64>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct WorkoutResponse {
    workout_id: String,
    activity_id: String,
    timestamp: String,
    calories_burned: i64,
    duration: i64,
}

impl Resource for Workout {
    const COLLECTION: &'static str = "workouts";

    type Request = WorkoutRequest;
    type Response = WorkoutResponse;

    fn from_request(id: String, request: WorkoutRequest) -> Result<Self, AppError> {
        Ok(Workout {
            workout_id: id,
            activity_id: required(request.activity_id)?,
            timestamp: parse_timestamp(&required(request.timestamp)?)?,
            calories_burned: required(request.calories_burned)?,
            duration: duration_from_millis(required(request.duration)?)?,
        })
    }

    fn to_response(&self) -> WorkoutResponse {
        WorkoutResponse {
            workout_id: self.workout_id.clone(),
            activity_id: self.activity_id.clone(),
            timestamp: format_timestamp(&self.timestamp),
            calories_burned: self.calories_burned,
            duration: duration_to_millis(&self.duration),
        }
    }

    async fn check_references(&self, db: &PgPool) -> Result<(), AppError> {
        match Activity::exists(db, &self.activity_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::bad_request("referenced activity does not exist")),
            Err(err) => Err(AppError::store("error checking activity existence in database", err)),
        }
    }
}
