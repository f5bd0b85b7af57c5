use {
    super::error::AuditError,
    serde_json::{Map, Value},
    std::{future::Future, pin::Pin},
};

pub type GeoLookup<'a> =
    Pin<Box<dyn Future<Output = Result<Map<String, Value>, AuditError>> + Send + 'a>>;

/// IP geolocation source. Returns the raw field mapping of the remote
/// service; callers decide which keys they care about.
pub trait GeoLocator: Send + Sync {
    fn lookup<'a>(&'a self, ip: &'a str) -> GeoLookup<'a>;
}
