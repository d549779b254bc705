use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use acme_importer_server::adapter::handler::{router, AppState};
use acme_importer_server::adapter::repository::{
    ImportJobPostgresRepository, InMemoryImportJobRepository, InMemoryProductRepository,
    InMemoryProgressStore, InMemoryWebhookRepository, ProductPostgresRepository,
    ProgressRedisStore, WebhookPostgresRepository,
};
use acme_importer_server::domain::repository::{
    ImportJobRepository, ProductRepository, ProgressStore, WebhookRepository,
};
use acme_importer_server::infrastructure::config::Config;
use acme_importer_server::infrastructure::database::create_pool;
use acme_importer_server::usecase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let cfg = Config::load(&config_path)?;

    info!(
        service = %cfg.app.name,
        environment = %cfg.app.environment,
        port = cfg.server.port,
        "starting importer server"
    );

    // --- PostgreSQL or InMemory fallback ---
    let mut db_pool = None;
    let (product_repo, job_repo, webhook_repo): (
        Arc<dyn ProductRepository>,
        Arc<dyn ImportJobRepository>,
        Arc<dyn WebhookRepository>,
    ) = if let Some(ref db_cfg) = cfg.database {
        info!("connecting to PostgreSQL");
        let pool = create_pool(&db_cfg.url, db_cfg.max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("PostgreSQL connection pool established, migrations applied");
        db_pool = Some(pool.clone());
        (
            Arc::new(ProductPostgresRepository::new(pool.clone())),
            Arc::new(ImportJobPostgresRepository::new(pool.clone())),
            Arc::new(WebhookPostgresRepository::new(pool)),
        )
    } else {
        info!("Database not configured, using InMemory repositories");
        (
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryImportJobRepository::new()),
            Arc::new(InMemoryWebhookRepository::new()),
        )
    };

    // --- Redis or InMemory fallback ---
    let mut redis_conn = None;
    let progress: Arc<dyn ProgressStore> = if let Some(ref redis_cfg) = cfg.redis {
        info!(url = %redis_cfg.url, "connecting to Redis");
        let client = redis::Client::open(redis_cfg.url.as_str())
            .map_err(|e| anyhow::anyhow!("failed to create Redis client: {}", e))?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| anyhow::anyhow!("failed to connect to Redis: {}", e))?;
        info!("Redis connection established");
        redis_conn = Some(conn.clone());
        Arc::new(ProgressRedisStore::new(conn))
    } else {
        info!("Redis not configured, using InMemory progress store");
        Arc::new(InMemoryProgressStore::new())
    };

    let runner = Arc::new(usecase::ImportRunner::new(
        product_repo.clone(),
        job_repo.clone(),
        progress.clone(),
        cfg.import.chunk_size,
        cfg.import.progress_ttl_seconds,
    ));

    let state = AppState {
        upload_uc: Arc::new(usecase::UploadCsvUseCase::new(job_repo.clone(), runner)),
        status_uc: Arc::new(usecase::GetImportStatusUseCase::new(
            job_repo.clone(),
            progress.clone(),
        )),
        cancel_uc: Arc::new(usecase::CancelImportUseCase::new(
            job_repo.clone(),
            progress.clone(),
            cfg.import.cancel_ttl_seconds,
        )),
        list_jobs_uc: Arc::new(usecase::ListImportJobsUseCase::new(job_repo.clone())),
        update_job_uc: Arc::new(usecase::UpdateImportJobUseCase::new(job_repo.clone())),
        delete_job_uc: Arc::new(usecase::DeleteImportJobUseCase::new(job_repo)),
        list_products_uc: Arc::new(usecase::ListProductsUseCase::new(
            product_repo.clone(),
            progress.clone(),
            cfg.import.listing_cache_ttl_seconds,
        )),
        create_product_uc: Arc::new(usecase::CreateProductUseCase::new(
            product_repo.clone(),
            progress.clone(),
        )),
        update_product_uc: Arc::new(usecase::UpdateProductUseCase::new(
            product_repo.clone(),
            progress.clone(),
        )),
        delete_product_uc: Arc::new(usecase::DeleteProductUseCase::new(
            product_repo.clone(),
            progress,
        )),
        webhooks_uc: Arc::new(usecase::ManageWebhooksUseCase::new(webhook_repo.clone())),
        metrics_uc: Arc::new(usecase::GetMetricsUseCase::new(product_repo, webhook_repo)),
        db_pool,
        redis_conn,
    };

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!("REST server starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
