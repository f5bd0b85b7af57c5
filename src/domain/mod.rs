pub mod error;
pub mod log_record;
pub mod provider;
pub mod severity;
pub mod store;
pub mod task;
