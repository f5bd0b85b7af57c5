use {
    crate::{
        domain::{
            error::AuditError,
            log_record::{GeoDetails, LogRecord, LogSubmission},
            provider::GeoLocator,
            store::LogStore,
        },
        services::poller::RetryPolicy,
    },
    std::sync::Arc,
    uuid::Uuid,
};

/// Persists audit records and enriches them with IP geolocation.
#[derive(Clone)]
pub struct LogWriter {
    store: Arc<dyn LogStore>,
    locator: Arc<dyn GeoLocator>,
    retry: RetryPolicy,
}

impl LogWriter {
    pub fn new(store: Arc<dyn LogStore>, locator: Arc<dyn GeoLocator>, retry: RetryPolicy) -> Self {
        Self {
            store,
            locator,
            retry,
        }
    }

    /// Log, persist, enrich, persist again.
    ///
    /// The base record is written before any network I/O. Enrichment failures
    /// are logged and swallowed; only store errors reach the caller, which
    /// owns redelivery.
    #[tracing::instrument(
        name = "write_log",
        skip_all,
        fields(submission_id = %submission_id, action = %submission.action)
    )]
    pub async fn write(
        &self,
        submission_id: Uuid,
        submission: LogSubmission,
    ) -> Result<LogRecord, AuditError> {
        submission
            .severity
            .emit(&submission.action, &submission.message);

        let mut record = LogRecord::new(submission_id, submission);
        record.id = Some(self.store.insert(&record).await?);

        let Some(ip) = record.lookup_ip().map(str::to_owned) else {
            return Ok(record);
        };

        match self.retry.run(|| self.locator.lookup(&ip)).await {
            Ok(details) => {
                record.geo = GeoDetails::from_map(&details);
                tracing::debug!(ip = %ip, country = ?record.geo.country, "log record enriched");
            }
            Err(AuditError::RetryLimitExceeded { attempts }) => {
                tracing::error!(ip = %ip, attempts, "Failed to get location details for {ip}");
            }
            Err(e) => {
                tracing::error!(ip = %ip, error = %e, "geolocation lookup failed");
            }
        }

        self.store.update(&record).await?;
        Ok(record)
    }
}
