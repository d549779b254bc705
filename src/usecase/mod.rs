pub mod cancel_import;
pub mod create_product;
pub mod delete_import_job;
pub mod delete_product;
pub mod get_import_status;
pub mod get_metrics;
pub mod list_import_jobs;
pub mod list_products;
pub mod manage_webhooks;
pub mod run_import;
pub mod update_import_job;
pub mod update_product;
pub mod upload_csv;

pub use cancel_import::CancelImportUseCase;
pub use create_product::CreateProductUseCase;
pub use delete_import_job::DeleteImportJobUseCase;
pub use delete_product::DeleteProductUseCase;
pub use get_import_status::GetImportStatusUseCase;
pub use get_metrics::GetMetricsUseCase;
pub use list_import_jobs::ListImportJobsUseCase;
pub use list_products::ListProductsUseCase;
pub use manage_webhooks::ManageWebhooksUseCase;
pub use run_import::ImportRunner;
pub use update_import_job::UpdateImportJobUseCase;
pub use update_product::UpdateProductUseCase;
pub use upload_csv::UploadCsvUseCase;
