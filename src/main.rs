use std::fs::OpenOptions;

use actix_web::{web, App, HttpServer};
use payroll_engine::{config, pages, store::DbStore};
use sea_orm::Database;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

#[actix_web::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("trace.log")
        .unwrap();

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_line_number(true)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_file)
                .with_filter(filter::LevelFilter::from_level(Level::TRACE))
        );

    tracing::subscriber::set_global_default(subscriber).unwrap();

    let config::Config {
        host_address,
        database_opt,
        policy,
    } = config::load();

    info!(?policy, "payroll policy loaded");

    let store = web::Data::new(DbStore::new(Database::connect(database_opt).await.expect("Unable to connect to database")));
    let policy = web::Data::new(policy);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(policy.clone())
            .wrap(TracingLogger::default())
            .configure(pages::config)
    });

    server
        .bind(host_address).unwrap()
        .run().await.unwrap();
}
