mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod utils;

#[cfg(test)]
mod test_support;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use log::{error, info};
use std::collections::HashMap;

use crate::config::{AppData, Config};
use crate::errors::StartupError;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    env_logger::Builder::new().filter_level(config.log_level).init();
    info!("starting program");

    let app_data = match init_app_data(config).await {
        Ok(app_data) => web::Data::new(app_data),
        Err(err) => {
            error!("cannot initialize digital trainer data: {}", err);
            std::process::exit(1);
        }
    };

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "digital_trainer".to_string());
    let prometheus = match PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
    {
        Ok(prometheus) => prometheus,
        Err(err) => {
            error!("{}", StartupError::Metrics(err.to_string()));
            std::process::exit(1);
        }
    };

    let bind_address = app_data.config.bind_address.clone();
    let workers = app_data.config.workers;
    info!("starting API server at {} with {} workers", bind_address, workers);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(app_data.clone())
            .configure(routes::configure)
    })
    .workers(workers)
    .bind(&bind_address)?
    .run()
    .await?;

    info!("shutting down");
    Ok(())
}

async fn init_app_data(config: Config) -> Result<AppData, StartupError> {
    let db = db::init_database(&config.db).await?;
    db::init_schema(&db, &config.schema_path).await?;
    Ok(AppData { config, db })
}
