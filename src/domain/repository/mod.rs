pub mod import_job_repository;
pub mod product_repository;
pub mod progress_store;
pub mod webhook_repository;

pub use import_job_repository::ImportJobRepository;
pub use product_repository::{ProductFilter, ProductRepository};
pub use progress_store::ProgressStore;
pub use webhook_repository::WebhookRepository;
