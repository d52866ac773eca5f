use payment_service::config::{AppConfig, StoreBackend};
use payment_service::domain::entity::{Payment, Transfer};
use payment_service::http::middleware::basic_auth::BasicCredentials;
use payment_service::http::router::build_router;
use payment_service::repo::memory::MemoryRecordStore;
use payment_service::repo::records_repo::RecordsRepo;
use payment_service::repo::RecordStore;
use payment_service::service::draw::{DrawSource, ThreadRngDraw};
use payment_service::service::record_service::RecordService;
use payment_service::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;
    cfg.validate()?;

    match cfg.store_backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(cfg.db_max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&cfg.database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            serve(
                &cfg,
                RecordsRepo::<Payment>::new(pool.clone()),
                RecordsRepo::<Transfer>::new(pool),
            )
            .await
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store, records are lost on exit");
            serve(
                &cfg,
                MemoryRecordStore::<Payment>::new(),
                MemoryRecordStore::<Transfer>::new(),
            )
            .await
        }
    }
}

async fn serve<P: RecordStore, T: RecordStore>(
    cfg: &AppConfig,
    payments: P,
    transfers: T,
) -> anyhow::Result<()> {
    let draw: Arc<dyn DrawSource> = Arc::new(ThreadRngDraw);
    let state = AppState {
        payments: RecordService::new(payments, draw.clone(), cfg.error_chance),
        transfers: RecordService::new(transfers, draw, cfg.error_chance),
        update_credentials: BasicCredentials {
            user: cfg.update_user.clone(),
            pass: cfg.update_pass.clone(),
        },
        request_timeout: cfg.request_timeout,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(
        "listening on {} (error chance {})",
        cfg.bind_addr,
        cfg.error_chance
    );

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = stop_tx.send(true);
            })
            .await
    };

    let shutdown_timeout = cfg.shutdown_timeout;
    let drain_deadline = async move {
        if stop_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        res = server => res?,
        _ = drain_deadline => {
            tracing::error!("in-flight requests did not drain within {:?}", shutdown_timeout);
        }
    }

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("can't listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("can't listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
