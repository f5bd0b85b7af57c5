use {
    chrono::{DateTime, Utc},
    std::{collections::HashMap, sync::Arc, time::Duration},
    tokio::sync::{RwLock, watch},
};

/// Revoked JWT ids, each kept until the token itself would have expired.
#[derive(Clone, Default)]
pub struct RevocationCache {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl RevocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, jti: impl Into<String>, expires_at: DateTime<Utc>) {
        let jti = jti.into();
        tracing::debug!(jti = %jti, %expires_at, "token revoked");
        self.entries.write().await.insert(jti, expires_at);
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.is_revoked_at(jti, Utc::now()).await
    }

    pub async fn is_revoked_at(&self, jti: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .read()
            .await
            .get(jti)
            .is_some_and(|expires_at| *expires_at > now)
    }

    /// Drop entries whose token has expired. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Periodically evict expired revocations.
pub async fn run_revocation_reaper(
    cache: RevocationCache,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!("revocation reaper started");

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("revocation reaper shutting down");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        match cache.purge_expired().await {
            0 => {}
            n => tracing::info!(count = n, "purged expired revocations"),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::Duration as ChronoDuration};

    #[tokio::test]
    async fn revoked_until_expiry() {
        let cache = RevocationCache::new();
        let now = Utc::now();
        cache.revoke("jti-1", now + ChronoDuration::hours(3)).await;

        assert!(cache.is_revoked_at("jti-1", now).await);
        assert!(!cache.is_revoked_at("jti-1", now + ChronoDuration::hours(4)).await);
        assert!(!cache.is_revoked_at("jti-2", now).await);
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let cache = RevocationCache::new();
        let now = Utc::now();
        cache.revoke("old", now - ChronoDuration::minutes(1)).await;
        cache.revoke("live", now + ChronoDuration::minutes(10)).await;

        assert_eq!(cache.purge_expired_at(now).await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.is_revoked_at("live", now).await);
    }
}
