use {
    portal_audit::{
        AppState,
        adapters::{http, ipapi_client::IpApiClient},
        config::Config,
        infra::postgres::log_repo::PgLogStore,
        services::{
            log_writer::LogWriter,
            revocation::{RevocationCache, run_revocation_reaper},
            worker::{AuditQueue, spawn_workers},
        },
        telemetry,
    },
    sqlx::postgres::PgPoolOptions,
    std::{sync::Arc, time::Duration},
    tokio::{signal, sync::watch},
    tower::ServiceBuilder,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("invalid configuration");
    telemetry::init(config.diagnostic_log_path.as_deref()).expect("failed to init tracing");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let locator = IpApiClient::new(&config.geo_endpoint, config.geo_timeout)
        .expect("failed to build geolocation client");
    let writer = LogWriter::new(
        Arc::new(PgLogStore::new(pool.clone())),
        Arc::new(locator),
        config.enrich_retry,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (queue, receivers) = AuditQueue::new(config.queue_capacity);
    let workers = spawn_workers(
        writer,
        queue.clone(),
        receivers,
        config.workers,
        shutdown_rx.clone(),
    );

    let revocations = RevocationCache::new();
    let reaper = tokio::spawn(run_revocation_reaper(
        revocations.clone(),
        config.revocation_sweep,
        shutdown_rx,
    ));

    let state = AppState {
        queue: queue.clone(),
        revocations,
    };
    let app = http::router(state)
        .layer(ServiceBuilder::new().layer(TimeoutLayer::new(Duration::from_secs(10))));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Workers drain what was already accepted, including pending redeliveries.
    queue.close();
    let _ = shutdown_tx.send(true);
    for handle in workers {
        let _ = handle.await;
    }
    let _ = reaper.await;
    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
