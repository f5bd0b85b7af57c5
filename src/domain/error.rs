use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("remote service responded {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("maximum retries exceeded after {attempts} attempt(s)")]
    RetryLimitExceeded { attempts: u32 },

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("validation: {0}")]
    Validation(String),

    #[error("queue {0} is full")]
    QueueFull(String),

    #[error("queue {0} is closed")]
    QueueClosed(String),

    #[error("config: {0}")]
    Config(String),
}
