use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use log::{error, info};

use std::convert::Infallible;

#[macro_use]
extern crate lazy_static;

mod api;
mod config;
mod error;
mod logger;
mod models;
mod persistence;
mod seed;

use config::CONFIG;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
        // without a signal handler there is nothing to wait for
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logger::init_logger(logger::level_from_env());

    let config = &*CONFIG;

    let conn = persistence::get_sql_connection(&config.database_url, config.max_connections)
        .await
        .map_err(|e| {
            error!("failed to open {}: {}", config.database_url, e);
            e
        })?;

    persistence::init_db(&conn).await?;

    if config.seed_demo_data {
        seed::seed_if_empty(&conn).await?;
    }

    let addr = config.socket_addr();

    let svc_conn = conn.clone();
    let make_svc = make_service_fn(move |_conn| {
        let conn = svc_conn.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| api::req_handler(req, conn.clone())))
        }
    });

    let server = Server::try_bind(&addr)?
        .serve(make_svc)
        .with_graceful_shutdown(shutdown_signal());

    info!("listening on http://{}", addr);

    if let Err(e) = server.await {
        error!("server error: {}", e);
    }

    conn.close().await;

    Ok(())
}

#[cfg(test)]
#[ctor::ctor]
fn init_test_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .filter_module("sqlx", log::LevelFilter::Warn)
        .try_init();
}
