use {
    super::severity::Severity,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    std::net::IpAddr,
    uuid::Uuid,
};

/// What a caller hands to the audit queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSubmission {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub message: String,
    #[serde(default)]
    pub action: String,
    /// Registry domain the event concerns, if any.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default, alias = "type")]
    pub severity: Severity,
    #[serde(default)]
    pub mail_to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl LogSubmission {
    pub fn new(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Record of an outbound email, logged after the mail has been handed to
    /// the transport.
    pub fn mail_echo(
        mail_to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let mail_to = mail_to.into();
        let subject = subject.into();
        Self {
            message: format!("Mail \"{subject}\" sent to {mail_to}"),
            action: "Mail sent".into(),
            severity: Severity::Warning,
            mail_to: Some(mail_to),
            subject: Some(subject),
            body: Some(body.into()),
            ..Self::default()
        }
    }
}

/// True when `ip` is worth sending to the geolocation service.
pub fn is_lookup_eligible(ip: &str) -> bool {
    match ip.trim().parse::<IpAddr>() {
        Ok(addr) => !(addr.is_loopback() || addr.is_unspecified()),
        Err(_) => false,
    }
}

/// Geolocation columns of a log record. Every field is optional; a missing
/// key in the lookup result means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoDetails {
    pub city: Option<String>,
    pub region: Option<String>,
    pub region_code: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub continent_code: Option<String>,
    pub in_eu: Option<bool>,
    pub postal: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub utc_offset: Option<String>,
    pub country_calling_code: Option<String>,
    pub currency: Option<String>,
    pub languages: Option<String>,
    pub asn: Option<String>,
    pub org: Option<String>,
}

impl GeoDetails {
    /// Lenient conversion: absent keys, nulls and values of an unusable type
    /// all become `None`.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            city: text(map, "city"),
            region: text(map, "region"),
            region_code: text(map, "region_code"),
            country: text(map, "country"),
            country_name: text(map, "country_name"),
            continent_code: text(map, "continent_code"),
            in_eu: map.get("in_eu").and_then(Value::as_bool),
            postal: text(map, "postal"),
            latitude: number(map, "latitude"),
            longitude: number(map, "longitude"),
            timezone: text(map, "timezone"),
            utc_offset: text(map, "utc_offset"),
            country_calling_code: text(map, "country_calling_code"),
            currency: text(map, "currency"),
            languages: text(map, "languages"),
            asn: text(map, "asn"),
            org: text(map, "org"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// One audit entry. `id` is assigned by the store on first persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub id: Option<i64>,
    pub submission_id: Uuid,
    pub user_id: Option<i64>,
    pub message: String,
    pub action: String,
    pub domain: Option<String>,
    pub ip_address: Option<String>,
    pub severity: Severity,
    pub mail_to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub geo: GeoDetails,
    timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(submission_id: Uuid, submission: LogSubmission) -> Self {
        Self::at(submission_id, submission, Utc::now())
    }

    pub fn at(submission_id: Uuid, submission: LogSubmission, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            submission_id,
            user_id: submission.user_id,
            message: submission.message,
            action: submission.action,
            domain: submission.domain,
            ip_address: submission.ip_address,
            severity: submission.severity,
            mail_to: submission.mail_to,
            subject: submission.subject,
            body: submission.body,
            geo: GeoDetails::default(),
            timestamp,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The address to enrich, if there is one worth looking up.
    pub fn lookup_ip(&self) -> Option<&str> {
        self.ip_address
            .as_deref()
            .map(str::trim)
            .filter(|ip| is_lookup_eligible(ip))
    }
}
