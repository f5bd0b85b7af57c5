pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;
pub mod telemetry;

use services::{revocation::RevocationCache, worker::AuditQueue};

#[derive(Clone)]
pub struct AppState {
    pub queue: AuditQueue,
    pub revocations: RevocationCache,
}
