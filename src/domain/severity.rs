use {
    serde::{Deserialize, Deserializer, Serialize, Serializer},
    std::fmt,
};

/// Severity of an audit event. Codes match the `type` column of the legacy
/// portal schema (1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Critical,
    #[default]
    Info,
    Error,
    Warning,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Info,
        Severity::Error,
        Severity::Warning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }

    pub fn code(&self) -> i16 {
        match self {
            Self::Critical => 1,
            Self::Info => 2,
            Self::Error => 3,
            Self::Warning => 4,
        }
    }

    /// Unknown codes fall back to `Error`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Critical,
            2 => Self::Info,
            3 => Self::Error,
            4 => Self::Warning,
            other => {
                tracing::warn!(code = other, "unknown severity code, defaulting to ERROR");
                Self::Error
            }
        }
    }

    /// Case-insensitive label lookup. Unknown labels fall back to `Error`.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_uppercase().as_str() {
            "CRITICAL" => Self::Critical,
            "INFO" => Self::Info,
            "ERROR" => Self::Error,
            "WARNING" | "WARN" => Self::Warning,
            _ => {
                tracing::warn!(label, "unknown severity label, defaulting to ERROR");
                Self::Error
            }
        }
    }

    /// Write `message` to the process logger at this severity's level.
    pub fn emit(&self, action: &str, message: &str) {
        match self {
            Self::Critical => tracing::error!(critical = true, action, "{message}"),
            Self::Info => tracing::info!(action, "{message}"),
            Self::Error => tracing::error!(action, "{message}"),
            Self::Warning => tracing::warn!(action, "{message}"),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Accepts either the label ("WARNING") or the legacy numeric code (4).
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Label(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Severity::from_code(code),
            Raw::Label(label) => Severity::from_label(&label),
        })
    }
}
