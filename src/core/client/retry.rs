use std::time::Duration;

use rand::Rng;
use reqwest::{RequestBuilder, Response, StatusCode, header::RETRY_AFTER};

use crate::core::AlpacaError;

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay is calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
        /// Whether to apply random jitter (+/- 50%) to the delay.
        jitter: bool,
    },
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let mut secs = base.as_secs_f64() * factor.powi(exp);
                if *jitter {
                    secs *= rand::thread_rng().gen_range(0.5..1.5);
                }
                // a zero base or NaN factor can overflow into NaN
                if !secs.is_finite() {
                    return *max;
                }
                Duration::from_secs_f64(secs.clamp(0.0, max.as_secs_f64()))
            }
        }
    }
}

/// Configuration for the automatic retry mechanism.
///
/// The default only retries `429 Too Many Requests`; every other failure is
/// surfaced to the caller on the first attempt.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// A list of HTTP status codes that should trigger a retry.
    pub retry_on_status: Vec<u16>,
    /// Whether to retry on request timeouts.
    pub retry_on_timeout: bool,
    /// Whether to retry on connection errors.
    pub retry_on_connect: bool,
    /// Longest `Retry-After` wait honored on a 429; longer hints are cut to this.
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 4,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(200),
                factor: 2.0,
                max: Duration::from_secs(5),
                jitter: true,
            },
            retry_on_status: vec![429],
            retry_on_timeout: false,
            retry_on_connect: false,
            max_retry_after: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn can_retry(&self, attempt: u32) -> bool {
        self.enabled && attempt < self.max_retries
    }
}

impl super::AlpacaClient {
    /// Sends `req` with credentials attached, retrying per the effective policy.
    ///
    /// Returns the final response whatever its status; mapping statuses to
    /// errors is up to the caller.
    pub(crate) async fn send_with_retry(
        &self,
        req: RequestBuilder,
        retry_override: Option<&RetryConfig>,
    ) -> Result<Response, AlpacaError> {
        let cfg = retry_override.unwrap_or(&self.retry);
        let req = self.credentials.apply(req);
        let mut attempt = 0u32;

        loop {
            let this_try = req
                .try_clone()
                .ok_or_else(|| AlpacaError::invalid("request body cannot be retried"))?;

            match this_try.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if !cfg.retry_on_status.contains(&status.as_u16()) || !cfg.can_retry(attempt) {
                        return Ok(resp);
                    }
                    let mut delay = cfg.backoff.delay(attempt);
                    if status == StatusCode::TOO_MANY_REQUESTS
                        && let Some(hint) = retry_after(&resp)
                    {
                        delay = delay.max(hint.min(cfg.max_retry_after));
                    }

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        status = status.as_u16(),
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        url = %resp.url(),
                        "retrying request"
                    );

                    drop(resp);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    let retryable = (e.is_timeout() && cfg.retry_on_timeout)
                        || (e.is_connect() && cfg.retry_on_connect);
                    if !retryable || !cfg.can_retry(attempt) {
                        return Err(e.into());
                    }

                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, error = %e, "retrying after transport error");

                    tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                }
            }
            attempt += 1;
        }
    }
}

/// Honors `Retry-After` given in whole seconds.
fn retry_after(resp: &Response) -> Option<Duration> {
    let secs: u64 = resp.headers().get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(secs))
}
