use {
    crate::domain::{
        error::AuditError,
        log_record::is_lookup_eligible,
        provider::{GeoLocator, GeoLookup},
    },
    reqwest::{StatusCode, header},
    serde_json::{Map, Value},
    std::time::Duration,
};

pub const DEFAULT_ENDPOINT: &str = "https://ipapi.co";

/// Target of the raw request/response dumps. The telemetry setup routes it
/// to the diagnostic file.
pub const HTTP_EXCHANGE_TARGET: &str = "http_exchange";

/// Client for ipapi.co-style services (`GET {endpoint}/{ip}/json`).
pub struct IpApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl IpApiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portal_audit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    async fn lookup_inner(&self, ip: &str) -> Result<Map<String, Value>, AuditError> {
        let ip = ip.trim();
        if !is_lookup_eligible(ip) {
            return Err(AuditError::InvalidInput(format!("Invalid IP {ip}")));
        }

        let url = format!("{}/{ip}/json", self.endpoint);
        let request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .build()?;
        let request_headers = request.headers().clone();

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::info!(
                    target: HTTP_EXCHANGE_TARGET,
                    method = "GET",
                    url = %url,
                    ?request_headers,
                    error = %e,
                    "request failed"
                );
                return Err(e.into());
            }
        };

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::info!(
                    target: HTTP_EXCHANGE_TARGET,
                    method = "GET",
                    url = %url,
                    ?request_headers,
                    status = status.as_u16(),
                    ?response_headers,
                    error = %e,
                    "response body unreadable"
                );
                return Err(e.into());
            }
        };

        tracing::info!(
            target: HTTP_EXCHANGE_TARGET,
            method = "GET",
            url = %url,
            ?request_headers,
            status = status.as_u16(),
            ?response_headers,
            "{body}"
        );

        if status != StatusCode::OK {
            tracing::error!(url = %url, status = status.as_u16(), "geolocation lookup rejected");
            return Err(AuditError::RemoteService {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Value>(&body)? {
            Value::Object(map) => Ok(map),
            other => Err(AuditError::RemoteService {
                status: status.as_u16(),
                body: format!("expected a JSON object, got: {other}"),
            }),
        }
    }
}

impl GeoLocator for IpApiClient {
    fn lookup<'a>(&'a self, ip: &'a str) -> GeoLookup<'a> {
        Box::pin(self.lookup_inner(ip))
    }
}
