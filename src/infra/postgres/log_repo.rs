use {
    crate::domain::{
        error::AuditError,
        log_record::LogRecord,
        store::{LogStore, StoreFuture},
    },
    sqlx::PgPool,
};

/// `audit_logs` table access.
#[derive(Clone)]
pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LogStore for PgLogStore {
    fn insert<'a>(&'a self, record: &'a LogRecord) -> StoreFuture<'a, i64> {
        Box::pin(insert_log(&self.pool, record))
    }

    fn update<'a>(&'a self, record: &'a LogRecord) -> StoreFuture<'a, ()> {
        Box::pin(update_log(&self.pool, record))
    }
}

/// Insert the base form of a record. A redelivered submission hits the
/// unique `submission_id` and gets the original row's id back.
pub async fn insert_log(pool: &PgPool, record: &LogRecord) -> Result<i64, AuditError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO audit_logs
            (submission_id, user_id, message, action, domain, ip_address,
             severity, mail_to, subject, body, "timestamp")
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (submission_id) DO UPDATE SET submission_id = EXCLUDED.submission_id
        RETURNING id
        "#,
    )
    .bind(record.submission_id)
    .bind(record.user_id)
    .bind(&record.message)
    .bind(&record.action)
    .bind(record.domain.as_deref())
    .bind(record.ip_address.as_deref())
    .bind(record.severity.as_str())
    .bind(record.mail_to.as_deref())
    .bind(record.subject.as_deref())
    .bind(record.body.as_deref())
    .bind(record.timestamp())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Write the geolocation columns of a persisted record.
pub async fn update_log(pool: &PgPool, record: &LogRecord) -> Result<(), AuditError> {
    let id = record
        .id
        .ok_or_else(|| AuditError::Validation("cannot update an unpersisted log record".into()))?;
    let geo = &record.geo;

    let result = sqlx::query(
        r#"
        UPDATE audit_logs
        SET city = $2, region = $3, region_code = $4, country = $5,
            country_name = $6, continent_code = $7, in_eu = $8, postal = $9,
            latitude = $10, longitude = $11, timezone = $12, utc_offset = $13,
            country_calling_code = $14, currency = $15, languages = $16,
            asn = $17, org = $18
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(geo.city.as_deref())
    .bind(geo.region.as_deref())
    .bind(geo.region_code.as_deref())
    .bind(geo.country.as_deref())
    .bind(geo.country_name.as_deref())
    .bind(geo.continent_code.as_deref())
    .bind(geo.in_eu)
    .bind(geo.postal.as_deref())
    .bind(geo.latitude)
    .bind(geo.longitude)
    .bind(geo.timezone.as_deref())
    .bind(geo.utc_offset.as_deref())
    .bind(geo.country_calling_code.as_deref())
    .bind(geo.currency.as_deref())
    .bind(geo.languages.as_deref())
    .bind(geo.asn.as_deref())
    .bind(geo.org.as_deref())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AuditError::Database(sqlx::Error::RowNotFound));
    }
    Ok(())
}
