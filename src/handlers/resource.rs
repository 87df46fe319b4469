use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::pipeline::{self, RequestContext, StoreOp};
use crate::config::AppData;
use crate::errors::AppError;
use crate::models::PersistenceObject;

/// Binds a persisted entity to its HTTP wire format.
#[allow(async_fn_in_trait)]
pub trait Resource: PersistenceObject + 'static {
    /// Path segment of the collection, e.g. `activities`.
    const COLLECTION: &'static str;

    /// POST and PUT body; every required field is an `Option` so absence is detectable.
    type Request: DeserializeOwned + Validate + 'static;
    type Response: Serialize;

    /// Builds the entity from a request body that already passed validation.
    fn from_request(id: String, request: Self::Request) -> Result<Self, AppError>;

    fn to_response(&self) -> Self::Response;

    /// Verifies records this entity points at. Runs before save and update.
    async fn check_references(&self, _db: &PgPool) -> Result<(), AppError> {
        Ok(())
    }
}

fn endpoint<E: Resource>(with_id: bool, method: &str) -> String {
    if with_id {
        format!("/{}/{{id}}.{}", E::COLLECTION, method)
    } else {
        format!("/{}.{}", E::COLLECTION, method)
    }
}

// GET /{collection}/{id}
pub async fn get_one<E: Resource>(
    app: web::Data<AppData>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = RequestContext::new(endpoint::<E>(true, "GET"));
    let id = id.into_inner();

    pipeline::check_exists::<E>(&ctx, &app.db, &id).await?;
    let entity = pipeline::execute::<E, _, _>(&ctx, StoreOp::Get, E::get(&app.db, &id)).await?;

    let response = pipeline::encode(&ctx, StatusCode::OK, &entity.to_response())?;
    ctx.completed();
    Ok(response)
}

// GET /{collection}
pub async fn get_all<E: Resource>(app: web::Data<AppData>) -> Result<HttpResponse, AppError> {
    let ctx = RequestContext::new(endpoint::<E>(false, "GET"));

    let entities = pipeline::execute::<E, _, _>(&ctx, StoreOp::GetAll, E::list_all(&app.db)).await?;
    let body: Vec<E::Response> = entities.iter().map(E::to_response).collect();

    let response = pipeline::encode(&ctx, StatusCode::OK, &body)?;
    ctx.completed();
    Ok(response)
}

// POST /{collection}
pub async fn create<E: Resource>(
    app: web::Data<AppData>,
    payload: web::Json<E::Request>,
) -> Result<HttpResponse, AppError> {
    let ctx = RequestContext::new(endpoint::<E>(false, "POST"));
    let id = Uuid::new_v4().to_string();
    let payload = payload.into_inner();

    pipeline::validate(&ctx, &payload)?;
    let entity = E::from_request(id, payload).map_err(|err| ctx.fail(err))?;

    pipeline::check_absent::<E>(&ctx, &app.db, entity.id()).await?;
    entity.check_references(&app.db).await.map_err(|err| ctx.fail(err))?;
    pipeline::execute::<E, _, _>(&ctx, StoreOp::Save, entity.save(&app.db)).await?;

    let response = pipeline::encode(&ctx, StatusCode::CREATED, &entity.to_response())?;
    ctx.completed();
    Ok(response)
}

// PUT /{collection}/{id}
pub async fn replace<E: Resource>(
    app: web::Data<AppData>,
    id: web::Path<String>,
    payload: web::Json<E::Request>,
) -> Result<HttpResponse, AppError> {
    let ctx = RequestContext::new(endpoint::<E>(true, "PUT"));
    let id = id.into_inner();
    let payload = payload.into_inner();

    pipeline::validate(&ctx, &payload)?;
    let entity = E::from_request(id, payload).map_err(|err| ctx.fail(err))?;

    pipeline::check_exists::<E>(&ctx, &app.db, entity.id()).await?;
    entity.check_references(&app.db).await.map_err(|err| ctx.fail(err))?;
    pipeline::execute::<E, _, _>(&ctx, StoreOp::Update, entity.update(&app.db)).await?;

    ctx.completed();
    Ok(HttpResponse::NoContent().finish())
}

// DELETE /{collection}/{id}
pub async fn remove<E: Resource>(
    app: web::Data<AppData>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = RequestContext::new(endpoint::<E>(true, "DELETE"));
    let id = id.into_inner();

    pipeline::check_exists::<E>(&ctx, &app.db, &id).await?;
    pipeline::execute::<E, _, _>(&ctx, StoreOp::Delete, E::delete(&app.db, &id)).await?;

    ctx.completed();
    Ok(HttpResponse::NoContent().finish())
}
