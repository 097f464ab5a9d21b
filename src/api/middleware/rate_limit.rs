//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Token bucket parameters, applied per client IP.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    /// Seconds between token refills.
    pub refill_interval_secs: u64,
    /// Requests allowed in a burst.
    pub burst_size: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            refill_interval_secs: 2,
            burst_size: 100,
        }
    }
}

type Layer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a rate limiter keyed by the socket peer address.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
/// Returns `None` if the settings are rejected by the governor (zero values).
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/links", post(create_link_handler))
///     .layer(rate_limit::layer(RateLimitSettings::default()).unwrap());
/// ```
pub fn layer(settings: RateLimitSettings) -> Option<Layer<PeerIpKeyExtractor>> {
    build(PeerIpKeyExtractor, settings)
}

/// Creates a rate limiter that trusts `X-Forwarded-For` / `X-Real-IP` / `Forwarded`.
///
/// Use only behind a reverse proxy that overwrites these headers; otherwise
/// clients can pick their own bucket.
pub fn proxied_layer(settings: RateLimitSettings) -> Option<Layer<SmartIpKeyExtractor>> {
    build(SmartIpKeyExtractor, settings)
}

fn build<K>(key_extractor: K, settings: RateLimitSettings) -> Option<Layer<K>>
where
    K: KeyExtractor,
{
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(key_extractor)
        .per_second(settings.refill_interval_secs)
        .burst_size(settings.burst_size)
        .finish()?;

    Some(GovernorLayer::new(Arc::new(governor_conf)))
}
