pub mod import_job;
pub mod product;
pub mod progress;
pub mod webhook;
