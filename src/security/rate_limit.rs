//! Per-client-IP token bucket rate limiting.
//!
//! Buckets are created lazily on the first request from an IP and start
//! full. Each bucket refills continuously at `refill_rate` tokens per second
//! up to `capacity`; an allowed request consumes one token. A periodic sweep
//! evicts buckets whose client has been idle for longer than a threshold so
//! one-off clients do not accumulate.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::http::error::ApiError;
use crate::lifecycle::PeriodicTask;
use crate::observability::metrics;

/// Token bucket state for a single client.
#[derive(Debug)]
struct ClientBucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
    capacity: u32,
    refill_rate: f64,
}

impl ClientBucket {
    fn new(capacity: u32, refill_rate: f64, now: Instant) -> Self {
        Self {
            tokens: f64::from(capacity),
            last_refill: now,
            last_seen: now,
            capacity,
            refill_rate,
        }
    }

    fn try_acquire(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();

        // Refill tokens; the fractional part carries over to the next call
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(f64::from(self.capacity));
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limiter keyed by client IP.
#[derive(Debug)]
pub struct IpRateLimiter {
    clients: Mutex<HashMap<String, ClientBucket>>,
    capacity: u32,
    refill_rate: f64,
}

impl IpRateLimiter {
    /// Create a limiter whose buckets hold `capacity` tokens and refill at
    /// `refill_rate` tokens per second.
    pub fn new(refill_rate: f64, capacity: u32) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            capacity,
            refill_rate,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.burst_size)
    }

    /// Consume a token for `ip`. Returns `false` if its bucket is empty.
    pub fn allow(&self, ip: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        // Lookup and creation happen under the same guard so concurrent first
        // requests from one IP share a bucket.
        if let Some(bucket) = clients.get_mut(ip) {
            bucket.last_seen = now;
            return bucket.try_acquire(now);
        }

        tracing::debug!(client = %ip, "Tracking new client");
        clients
            .entry(ip.to_owned())
            .or_insert_with(|| ClientBucket::new(self.capacity, self.refill_rate, now))
            .try_acquire(now)
    }

    /// Remove every client not seen for longer than `idle_threshold`.
    /// Returns the number of buckets evicted.
    pub fn cleanup_expired(&self, idle_threshold: Duration) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        let before = clients.len();
        clients.retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) <= idle_threshold);
        let evicted = before - clients.len();
        let remaining = clients.len();
        drop(clients);

        if evicted > 0 {
            tracing::debug!(evicted, remaining, "Evicted idle rate limiter clients");
        }
        metrics::record_limiter_sweep(evicted, remaining);
        evicted
    }

    /// Run [`cleanup_expired`](Self::cleanup_expired) every `interval` until
    /// the returned handle is stopped.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn start_cleanup_loop(
        self: &Arc<Self>,
        interval: Duration,
        idle_threshold: Duration,
    ) -> PeriodicTask {
        let limiter = Arc::clone(self);
        tracing::info!(?interval, ?idle_threshold, "Starting rate limiter cleanup");
        PeriodicTask::spawn("rate-limit-cleanup", interval, move || {
            limiter.cleanup_expired(idle_threshold);
        })
    }

    /// Number of clients currently holding a bucket.
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Middleware gating the wrapped handler on the client's bucket.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => addr.ip().to_string(),
        None => return ApiError::ClientAddressUnavailable.into_response(),
    };

    if limiter.allow(&ip) {
        next.run(request).await
    } else {
        tracing::warn!(client = %ip, "Rate limit exceeded");
        metrics::record_rate_limited();
        ApiError::RateLimited.into_response()
    }
}
