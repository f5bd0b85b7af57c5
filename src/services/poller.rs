use {
    crate::domain::error::AuditError,
    std::{fmt, future::Future, time::Duration},
};

/// Fixed-delay retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub step: Duration,
    /// `None` retries forever.
    pub max_tries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            step: Duration::from_secs(2),
            max_tries: Some(2),
        }
    }
}

impl RetryPolicy {
    pub async fn run<T, E, F, Fut>(&self, target: F) -> Result<T, AuditError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        poll(target, self.step, self.max_tries).await
    }
}

/// Call `target` until it succeeds, sleeping `step` between failed attempts.
///
/// With `max_tries = Some(n)` at most `n` calls are made; once the budget is
/// spent the poller fails with [`AuditError::RetryLimitExceeded`] without a
/// trailing sleep. `Some(0)` fails before calling `target` at all.
pub async fn poll<T, E, F, Fut>(
    mut target: F,
    step: Duration,
    max_tries: Option<u32>,
) -> Result<T, AuditError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let exhausted = |tries: u32| max_tries.is_some_and(|max| tries >= max);
    let mut tries = 0u32;

    while !exhausted(tries) {
        match target().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                tries += 1;
                tracing::warn!(attempt = tries, ?max_tries, error = %e, "poll attempt failed");
            }
        }

        if exhausted(tries) {
            break;
        }
        tokio::time::sleep(step).await;
    }

    Err(AuditError::RetryLimitExceeded { attempts: tries })
}
