use {
    super::{error::AuditError, log_record::LogSubmission},
    derive_more::Display,
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

/// Routing class of a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueueClass {
    #[display("LONG")]
    Long,
    #[display("SHORT")]
    Short,
    #[default]
    #[display("NORMAL")]
    Normal,
    #[display("MAIL")]
    Mail,
    #[display("TRANSACTIONS")]
    Transactions,
}

impl QueueClass {
    pub const ALL: [QueueClass; 5] = [
        QueueClass::Long,
        QueueClass::Short,
        QueueClass::Normal,
        QueueClass::Mail,
        QueueClass::Transactions,
    ];
}

impl TryFrom<&str> for QueueClass {
    type Error = AuditError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_uppercase().as_str() {
            "LONG" => Ok(Self::Long),
            "SHORT" => Ok(Self::Short),
            "NORMAL" => Ok(Self::Normal),
            "MAIL" => Ok(Self::Mail),
            "TRANSACTIONS" => Ok(Self::Transactions),
            other => Err(AuditError::Validation(format!("unknown queue: {other}"))),
        }
    }
}

/// Unit of work moved through the audit queue. `id` doubles as the
/// persistence idempotency key, so redelivery never duplicates a row.
#[derive(Debug, Clone)]
pub struct AuditTask {
    pub id: Uuid,
    pub queue: QueueClass,
    pub submission: LogSubmission,
    pub attempt: u32,
}

impl AuditTask {
    pub fn new(queue: QueueClass, submission: LogSubmission) -> Self {
        Self {
            id: Uuid::now_v7(),
            queue,
            submission,
            attempt: 0,
        }
    }
}
