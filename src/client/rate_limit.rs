//! Rate limit headers and client-side request pacing
//!
//! GitHub reports its quota in `X-RateLimit-*` headers: 60 requests per hour
//! for anonymous callers, 5000 for authenticated ones (or anonymous callers
//! presenting OAuth app credentials). The suites assert on the limit.
//!
//! Separately, [`RequestPacer`] spaces out our own calls so a suite run never
//! bursts into GitHub's secondary limits. Pacing only delays; nothing is
//! retried.

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::header::HeaderMap;
use serde::Serialize;

/// Header carrying the quota size
pub const HEADER_LIMIT: &str = "x-ratelimit-limit";

/// Header carrying the calls left in the window
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";

/// Header carrying the window reset as a Unix timestamp
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Quota for anonymous callers
pub const ANONYMOUS_LIMIT: u32 = 60;

/// Quota for authenticated callers
pub const AUTHENTICATED_LIMIT: u32 = 5000;

/// Parsed `X-RateLimit-*` headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    /// Parse from response headers. Returns `None` without a limit header.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let number = |name: &str| -> Option<i64> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<i64>().ok())
        };

        let limit = u32::try_from(number(HEADER_LIMIT)?).ok()?;
        let remaining = number(HEADER_REMAINING).and_then(|n| u32::try_from(n).ok());
        let reset_at = number(HEADER_RESET).and_then(|secs| DateTime::from_timestamp(secs, 0));

        Some(Self {
            limit,
            remaining,
            reset_at,
        })
    }

    /// Whether the quota is the authenticated one
    pub fn is_authenticated(&self) -> bool {
        self.limit >= AUTHENTICATED_LIMIT
    }
}

/// Client-side limiter applied before every outgoing request
pub struct RequestPacer {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    per_second: u32,
}

impl RequestPacer {
    /// Allow at most `per_second` requests per second (minimum 1).
    pub fn per_second(per_second: u32) -> Self {
        let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::direct(Quota::per_second(rate)),
            per_second: rate.get(),
        }
    }

    /// Wait until the next request may go out.
    pub async fn until_ready(&self) {
        if self.limiter.check().is_err() {
            debug!("Pacing requests at {}/s", self.per_second);
            self.limiter.until_ready().await;
        }
    }

    pub fn rate(&self) -> u32 {
        self.per_second
    }
}
