pub mod import_job_in_memory;
pub mod import_job_postgres;
pub mod product_in_memory;
pub mod product_postgres;
pub mod progress_in_memory;
pub mod progress_redis;
pub mod webhook_in_memory;
pub mod webhook_postgres;

pub use import_job_in_memory::InMemoryImportJobRepository;
pub use import_job_postgres::ImportJobPostgresRepository;
pub use product_in_memory::InMemoryProductRepository;
pub use product_postgres::ProductPostgresRepository;
pub use progress_in_memory::InMemoryProgressStore;
pub use progress_redis::ProgressRedisStore;
pub use webhook_in_memory::InMemoryWebhookRepository;
pub use webhook_postgres::WebhookPostgresRepository;
