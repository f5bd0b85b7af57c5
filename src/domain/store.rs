use {
    super::{error::AuditError, log_record::LogRecord},
    std::{future::Future, pin::Pin},
};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AuditError>> + Send + 'a>>;

/// Durable home of audit records.
pub trait LogStore: Send + Sync {
    /// Persist a record in base form and return its key. Inserting the same
    /// `submission_id` twice returns the existing key instead of a new row.
    fn insert<'a>(&'a self, record: &'a LogRecord) -> StoreFuture<'a, i64>;

    /// Overwrite the mutable columns of an already persisted record.
    fn update<'a>(&'a self, record: &'a LogRecord) -> StoreFuture<'a, ()>;
}
