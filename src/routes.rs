use actix_web::web;

use crate::handlers::pipeline::json_config;
use crate::handlers::resource::{self, Resource};
use crate::models::activity::Activity;
use crate::models::workout::Workout;

pub const API_PREFIX: &str = "/v1";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope(API_PREFIX)
            .configure(entity_routes::<Activity>)
            .configure(entity_routes::<Workout>),
    );
}

fn entity_routes<E: Resource>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(format!("/{}", E::COLLECTION))
            .route(web::get().to(resource::get_all::<E>))
            .route(web::post().to(resource::create::<E>)),
    )
    .service(
        web::resource(format!("/{}/{{id}}", E::COLLECTION))
            .route(web::get().to(resource::get_one::<E>))
            .route(web::put().to(resource::replace::<E>))
            .route(web::delete().to(resource::remove::<E>)),
    );
}
