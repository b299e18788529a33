//! Admission control for the newsletter routes.
//!
//! Every source IP gets a sliding-window log of the instants its requests were admitted.
//! A request is admitted while fewer than `max_requests` entries are younger than `window`.
//! Rejected requests are not recorded, so a source that keeps hammering the endpoint
//! gets back in as soon as its oldest admitted request leaves the window.

use std::{
    collections::VecDeque,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    config::RateLimitConfig,
    web::{Error, WebResult, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER},
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { remaining: u32 },
    Rejected { retry_after: Duration },
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    sweep_interval: Duration,
    hits: DashMap<IpAddr, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window(),
            sweep_interval: config.sweep_interval(),
            hits: DashMap::new(),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, source: IpAddr) -> Admission {
        self.check_at(source, Instant::now())
    }

    pub fn check_at(&self, source: IpAddr, now: Instant) -> Admission {
        let mut log = self.hits.entry(source).or_default();

        while log
            .front()
            .is_some_and(|admitted| now.duration_since(*admitted) >= self.window)
        {
            log.pop_front();
        }

        let used = u32::try_from(log.len()).unwrap_or(u32::MAX);
        if used < self.max_requests {
            log.push_back(now);
            return Admission::Admitted {
                remaining: self.max_requests - used - 1,
            };
        }

        let retry_after = log
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(self.window);
        Admission::Rejected { retry_after }
    }

    /// Drops every source whose log has fully expired.
    pub fn sweep_at(&self, now: Instant) {
        self.hits.retain(|_, log| {
            log.back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });
    }

    pub fn tracked_sources(&self) -> usize {
        self.hits.len()
    }

    /// Periodically sweeps expired sources until the returned handle is aborted.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(self.sweep_interval.max(Duration::from_secs(1)));
            loop {
                interval.tick().await;
                self.sweep_at(Instant::now());
                debug!(
                    "{:<20} - tracking {} sources",
                    "rate_limit_sweep",
                    self.tracked_sources()
                );
            }
        })
    }
}

/// Rejects the request before it reaches the handler once its source is over quota.
/// The source is the peer address of the connection.
pub async fn rate_limit(
    State(app_state): State<AppState>,
    req: Request,
    next: Next,
) -> WebResult<Response> {
    let source_ip = match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => addr.ip(),
        None => {
            warn!(
                "{:<20} - no ConnectInfo on the request, all such requests share one quota. \
                Serve the router with `into_make_service_with_connect_info::<SocketAddr>()`",
                "rate_limit"
            );
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        }
    };

    let limiter = &app_state.rate_limiter;
    match limiter.check(source_ip) {
        Admission::Admitted { remaining } => {
            let mut res = next.run(req).await;
            let headers = res.headers_mut();
            headers.insert(
                RATE_LIMIT_LIMIT_HEADER,
                HeaderValue::from(limiter.max_requests()),
            );
            headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));
            Ok(res)
        }
        Admission::Rejected { retry_after } => {
            warn!("Rate limit exceeded for {source_ip}");
            // Round up so clients never retry too early.
            let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            Err(Error::RateLimited {
                source_ip,
                limit: limiter.max_requests(),
                retry_after_secs,
            })
        }
    }
}
