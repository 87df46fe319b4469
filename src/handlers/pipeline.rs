//! Stages shared by every entity handler. Each stage either lets the request
//! continue or returns the single `AppError` that becomes its response.

use actix_web::error::JsonPayloadError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use log::{debug, error, warn};
use serde::Serialize;
use sqlx::PgPool;
use std::future::Future;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::{PersistenceObject, StoreError};
use crate::routes::API_PREFIX;
use crate::utils::validation::validate_payload;

/// Per-request logging context.
pub struct RequestContext {
    request_id: Uuid,
    endpoint: String,
}

impl RequestContext {
    pub fn new(endpoint: String) -> Self {
        let ctx = RequestContext { request_id: Uuid::new_v4(), endpoint };
        debug!("request_id={} endpoint={} request received", ctx.request_id, ctx.endpoint);
        ctx
    }

    /// Context for failures raised before a handler runs, named the same
    /// way handlers name their endpoint.
    pub fn for_request(req: &HttpRequest) -> Self {
        let pattern = req.match_pattern().unwrap_or_else(|| req.path().to_string());
        let path = pattern.strip_prefix(API_PREFIX).unwrap_or(&pattern);
        Self::new(format!("{}.{}", path, req.method()))
    }

    pub fn completed(&self) {
        debug!("request_id={} endpoint={} request completed", self.request_id, self.endpoint);
    }

    /// Logs a stage failure and hands the error back for the response.
    pub fn fail(&self, err: AppError) -> AppError {
        if err.status_code().is_server_error() {
            error!("request_id={} endpoint={} {}", self.request_id, self.endpoint, err);
        } else {
            warn!("request_id={} endpoint={} {}", self.request_id, self.endpoint, err);
        }
        err
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Get,
    GetAll,
    Save,
    Update,
    Delete,
}

impl StoreOp {
    fn describe(self, type_name: &str) -> String {
        match self {
            StoreOp::Get => format!("error getting {} from database", type_name),
            StoreOp::GetAll => format!("error getting all of type {} from database", type_name),
            StoreOp::Save => format!("error saving {} to database", type_name),
            StoreOp::Update => format!("error updating {} in database", type_name),
            StoreOp::Delete => format!("error deleting {} from database", type_name),
        }
    }
}

/// Decode failures surface as a JSON error body instead of actix's plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err: JsonPayloadError, req: &HttpRequest| {
            let ctx = RequestContext::for_request(req);
            ctx.fail(AppError::bad_request("error decoding request body").with_error(err))
                .into()
        })
}

pub fn validate<R: Validate>(ctx: &RequestContext, request: &R) -> Result<(), AppError> {
    validate_payload(request).map_err(|err| ctx.fail(err))
}

/// Rejects the request unless a row with `id` is present.
pub async fn check_exists<E: PersistenceObject>(
    ctx: &RequestContext,
    db: &PgPool,
    id: &str,
) -> Result<(), AppError> {
    match E::exists(db, id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ctx.fail(AppError::not_found(format!("{} does not exist", E::TYPE_NAME)))),
        Err(err) => Err(ctx.fail(AppError::store(
            format!("error checking {} existence in database", E::TYPE_NAME),
            err,
        ))),
    }
}

/// Rejects the request if a row with `id` is already present.
pub async fn check_absent<E: PersistenceObject>(
    ctx: &RequestContext,
    db: &PgPool,
    id: &str,
) -> Result<(), AppError> {
    match E::exists(db, id).await {
        Ok(false) => Ok(()),
        Ok(true) => Err(ctx.fail(AppError::Store {
            message: format!("{} already exists", E::TYPE_NAME),
            error: None,
        })),
        Err(err) => Err(ctx.fail(AppError::store(
            format!("error checking {} existence in database", E::TYPE_NAME),
            err,
        ))),
    }
}

/// Runs one persistence operation and classifies its failure.
pub async fn execute<E, T, F>(ctx: &RequestContext, op: StoreOp, action: F) -> Result<T, AppError>
where
    E: PersistenceObject,
    F: Future<Output = Result<T, StoreError>>,
{
    action
        .await
        .map_err(|err| ctx.fail(AppError::from_store(E::TYPE_NAME, op.describe(E::TYPE_NAME), err)))
}

/// Serializes the response body up front so an encoding failure still
/// produces a well-formed error response.
pub fn encode<T: Serialize>(
    ctx: &RequestContext,
    status: StatusCode,
    body: &T,
) -> Result<HttpResponse, AppError> {
    let body = serde_json::to_vec(body)
        .map_err(|err| ctx.fail(AppError::serialization("error encoding response body", err)))?;
    Ok(HttpResponse::build(status)
        .content_type(ContentType::json())
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn encode_failure_is_a_serialization_error() {
        let ctx = RequestContext::new("/test.GET".to_string());
        let err = encode(&ctx, StatusCode::OK, &Unencodable).unwrap_err();
        assert!(matches!(err, AppError::Serialization { .. }));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "error encoding response body");
    }

    #[test]
    fn encode_writes_json() {
        let ctx = RequestContext::new("/test.GET".to_string());
        let resp = encode(&ctx, StatusCode::CREATED, &serde_json::json!({ "name": "Running" })).unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[actix_web::test]
    async fn empty_listing_is_an_array() {
        let ctx = RequestContext::new("/test.GET".to_string());
        let resp = encode(&ctx, StatusCode::OK, &Vec::<serde_json::Value>::new()).unwrap();
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(&body[..], b"[]");
    }

    #[test]
    fn request_context_names_endpoint_like_handlers() {
        let req = actix_web::test::TestRequest::post()
            .uri("/v1/activities")
            .to_http_request();
        let ctx = RequestContext::for_request(&req);
        assert_eq!(ctx.endpoint, "/activities.POST");
    }

    #[test]
    fn store_messages() {
        assert_eq!(StoreOp::Get.describe("activity"), "error getting activity from database");
        assert_eq!(
            StoreOp::GetAll.describe("workout"),
            "error getting all of type workout from database"
        );
    }
}
