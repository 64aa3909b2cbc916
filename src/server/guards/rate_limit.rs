use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{HeaderName, header::USER_AGENT, request::Parts},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
};
use std::{
    marker::PhantomData,
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};
use tracing::{debug, warn};

use super::auth::user_id;
use crate::config::{LimitsConfig, RateLimitRule};
use crate::error::CatalogError;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Keyed state is pruned once this many clients are tracked.
const RETAIN_THRESHOLD: usize = 10_000;

const ANONYMOUS: &str = "anonymous";

/// `max` requests per `window_secs` for each key, replenished evenly over the window.
pub struct KeyedLimiter {
    inner: RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>,
}

impl KeyedLimiter {
    /// `None` when the rule allows nothing to be counted (`max == 0` or an empty window).
    pub fn new(rule: &RateLimitRule) -> Option<Self> {
        let burst = NonZeroU32::new(rule.max)?;
        let period = Duration::from_secs(rule.window_secs).checked_div(rule.max)?;
        let quota = Quota::with_period(period)?.allow_burst(burst);
        Some(Self {
            inner: RateLimiter::keyed(quota),
        })
    }

    /// `Err(retry_after_secs)` when `key` is over quota.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        if self.inner.len() > RETAIN_THRESHOLD {
            self.inner.retain_recent();
        }
        self.inner.check_key(&key.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1)
        })
    }
}

/// One limiter per guarded route family.
pub struct RateLimiters {
    pub write: Option<KeyedLimiter>,
    pub upload: Option<KeyedLimiter>,
    pub ai: Option<KeyedLimiter>,
    pub secret: Option<KeyedLimiter>,
}

impl RateLimiters {
    pub fn from_config(cfg: &LimitsConfig) -> Self {
        Self {
            write: KeyedLimiter::new(&cfg.write),
            upload: KeyedLimiter::new(&cfg.upload),
            ai: KeyedLimiter::new(&cfg.ai),
            secret: KeyedLimiter::new(&cfg.secret),
        }
    }
}

/// First `X-Forwarded-For` entry, else the socket peer address.
pub(crate) fn client_ip(parts: &Parts) -> Option<String> {
    let forwarded = parts
        .headers
        .get(&X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

pub trait ThrottleScope: Send + Sync + 'static {
    const NAME: &'static str;

    fn limiter(limiters: &RateLimiters) -> Option<&KeyedLimiter>;

    /// Signed-in user when known, else the client address.
    fn key(parts: &Parts) -> String {
        user_id(parts)
            .or_else(|| client_ip(parts))
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }
}

pub struct WriteScope;
pub struct UploadScope;
pub struct AiScope;
pub struct SecretScope;

impl ThrottleScope for WriteScope {
    const NAME: &'static str = "write";

    fn limiter(limiters: &RateLimiters) -> Option<&KeyedLimiter> {
        limiters.write.as_ref()
    }
}

impl ThrottleScope for UploadScope {
    const NAME: &'static str = "upload";

    fn limiter(limiters: &RateLimiters) -> Option<&KeyedLimiter> {
        limiters.upload.as_ref()
    }
}

impl ThrottleScope for AiScope {
    const NAME: &'static str = "ai";

    fn limiter(limiters: &RateLimiters) -> Option<&KeyedLimiter> {
        limiters.ai.as_ref()
    }
}

impl ThrottleScope for SecretScope {
    const NAME: &'static str = "secret";

    fn limiter(limiters: &RateLimiters) -> Option<&KeyedLimiter> {
        limiters.secret.as_ref()
    }

    // Reveal is unauthenticated; count per address only.
    fn key(parts: &Parts) -> String {
        client_ip(parts).unwrap_or_else(|| ANONYMOUS.to_string())
    }
}

/// Consumes one request from scope `T`'s quota or rejects with 429.
pub struct Throttled<T>(PhantomData<T>);

impl<S, T> FromRequestParts<S> for Throttled<T>
where
    Arc<RateLimiters>: FromRef<S>,
    S: Send + Sync,
    T: ThrottleScope,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let limiters = Arc::<RateLimiters>::from_ref(state);
        let Some(limiter) = T::limiter(&limiters) else {
            return Ok(Throttled(PhantomData));
        };
        let key = T::key(parts);
        match limiter.check(&key) {
            Ok(()) => {
                debug!(scope = T::NAME, key = %key, "rate limit passed");
                Ok(Throttled(PhantomData))
            }
            Err(retry_after) => {
                warn!(scope = T::NAME, key = %key, retry_after, "rate limit exceeded");
                Err(CatalogError::RateLimited { retry_after })
            }
        }
    }
}

/// Addresses allowed to reveal secrets. Empty allows everyone.
#[derive(Debug, Clone, Default)]
pub struct IpAllowlist(pub Arc<[IpAddr]>);

impl IpAllowlist {
    pub fn allows(&self, ip: Option<&str>) -> bool {
        if self.0.is_empty() {
            return true;
        }
        ip.and_then(|ip| ip.parse::<IpAddr>().ok())
            .is_some_and(|ip| self.0.contains(&ip))
    }
}

/// The caller's address, checked against [`IpAllowlist`]; 403 otherwise.
#[derive(Debug, Clone)]
pub struct AllowlistedIp(pub String);

impl<S> FromRequestParts<S> for AllowlistedIp
where
    IpAllowlist: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let allowlist = IpAllowlist::from_ref(state);
        let ip = client_ip(parts);
        if allowlist.allows(ip.as_deref()) {
            return Ok(AllowlistedIp(ip.unwrap_or_default()));
        }
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        warn!(
            ip = ip.as_deref().unwrap_or("-"),
            path = parts.uri.path(),
            user_agent,
            "secret access denied: address not allowlisted"
        );
        Err(CatalogError::Forbidden)
    }
}
