use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resource::Resource;
use crate::errors::AppError;
use crate::models::activity::Activity;
use crate::utils::validation::required;

#[derive(Deserialize, Validate, Debug)]
pub struct ActivityRequest {
    #[validate(required(message = "Name is required"))]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    name: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ActivityResponse {
    activity_id: String,
    name: String,
}

impl Resource for Activity {
    const COLLECTION: &'static str = "activities";

    type Request = ActivityRequest;
    type Response = ActivityResponse;

    fn from_request(id: String, request: ActivityRequest) -> Result<Self, AppError> {
        Ok(Activity {
            activity_id: id,
            name: required(request.name)?,
        })
    }

    fn to_response(&self) -> ActivityResponse {
        ActivityResponse {
            activity_id: self.activity_id.clone(),
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shape() {
        let activity = Activity::from_request(
            "a-1".to_string(),
            ActivityRequest { name: Some("Running".to_string()) },
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(activity.to_response()).unwrap(),
            serde_json::json!({ "activity_id": "a-1", "name": "Running" })
        );
    }
}
