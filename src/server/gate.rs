//! IP-allowlist + shared-secret access gate wrapping the HTTP handlers.
//!
//! Known weakness, kept deliberately: entries never expire unless a ttl is
//! configured, and there is no rate limiting or brute-force protection on the
//! secret. Allowlist state lives for the process lifetime only.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

use super::state::AppState;

/// Entry point clients are redirected to when not yet allowed.
pub const AUTH_PATH: &str = "/auth/";

/// Decides which caller addresses may reach the gated handlers.
#[derive(Debug)]
pub struct AccessGate {
    allow_all: bool,
    secret: Option<String>,
    ttl: Option<Duration>,
    allowed: DashMap<IpAddr, Instant>,
}

impl AccessGate {
    /// Build a gate from startup configuration.
    #[must_use]
    pub fn new(
        allow_all: bool,
        secret: Option<String>,
        pre_authorized: &[IpAddr],
        ttl: Option<Duration>,
    ) -> Self {
        let allowed = DashMap::new();
        let now = Instant::now();
        for &addr in pre_authorized {
            allowed.insert(addr, now);
        }
        Self {
            allow_all,
            secret,
            ttl,
            allowed,
        }
    }

    /// Whether `addr` may pass the gate right now.
    ///
    /// With a ttl configured, stale entries are evicted on the way through.
    #[must_use]
    pub fn is_allowed(&self, addr: IpAddr) -> bool {
        if self.allow_all {
            return true;
        }
        match self.allowed.get(&addr) {
            Some(entry) => match self.ttl {
                Some(ttl) if entry.elapsed() > ttl => {
                    drop(entry);
                    self.allowed.remove(&addr);
                    false
                }
                _ => true,
            },
            None => false,
        }
    }

    /// Add `addr` to the allowlist if `submitted` matches the configured
    /// secret. Returns whether the caller is now allowed.
    ///
    /// A wrong secret is indistinguishable from a missing one: the caller is
    /// simply not added.
    pub fn try_authorize(&self, addr: IpAddr, submitted: &str) -> bool {
        match &self.secret {
            Some(secret) if submitted == secret => {
                tracing::info!(%addr, "caller authorized via shared secret");
                self.allowed.insert(addr, Instant::now());
                true
            }
            _ => false,
        }
    }
}

/// Middleware applied to every gated route.
///
/// Unknown callers are never hard-rejected; they get a temporary redirect to
/// the authentication entry point (plus an `HX-Redirect` header for htmx
/// clients).
pub async fn require_allowed(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if state.gate.is_allowed(peer.ip()) {
        return next.run(request).await;
    }

    tracing::debug!(addr = %peer.ip(), path = %request.uri().path(), "gating unauthenticated caller");
    redirect_to(AUTH_PATH)
}

/// Temporary redirect carrying both a `Location` and an htmx `HX-Redirect`
/// header.
pub fn redirect_to(target: &'static str) -> Response {
    (
        StatusCode::TEMPORARY_REDIRECT,
        [
            (header::LOCATION, HeaderValue::from_static(target)),
            (
                header::HeaderName::from_static("hx-redirect"),
                HeaderValue::from_static(target),
            ),
        ],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn unknown_caller_is_not_allowed() {
        let gate = AccessGate::new(false, Some("hunter2".into()), &[], None);
        assert!(!gate.is_allowed(ip("192.0.2.1")));
    }

    #[test]
    fn allow_all_admits_everyone() {
        let gate = AccessGate::new(true, None, &[], None);
        assert!(gate.is_allowed(ip("192.0.2.1")));
    }

    #[test]
    fn pre_authorized_addresses_pass() {
        let gate = AccessGate::new(false, None, &[ip("10.0.0.7")], None);
        assert!(gate.is_allowed(ip("10.0.0.7")));
        assert!(!gate.is_allowed(ip("10.0.0.8")));
    }

    #[test]
    fn correct_secret_admits_permanently() {
        let gate = AccessGate::new(false, Some("hunter2".into()), &[], None);
        let caller = ip("192.0.2.1");
        assert!(!gate.is_allowed(caller));
        assert!(gate.try_authorize(caller, "hunter2"));
        assert!(gate.is_allowed(caller));
    }

    #[test]
    fn wrong_secret_is_silently_ignored() {
        let gate = AccessGate::new(false, Some("hunter2".into()), &[], None);
        let caller = ip("192.0.2.1");
        assert!(!gate.try_authorize(caller, "hunter3"));
        assert!(!gate.is_allowed(caller));
    }

    #[test]
    fn no_secret_configured_means_no_authorization_path() {
        let gate = AccessGate::new(false, None, &[], None);
        assert!(!gate.try_authorize(ip("192.0.2.1"), "anything"));
    }

    #[test]
    fn ttl_evicts_stale_entries() {
        let gate = AccessGate::new(false, Some("s".into()), &[], Some(Duration::ZERO));
        let caller = ip("192.0.2.1");
        gate.try_authorize(caller, "s");
        std::thread::sleep(Duration::from_millis(5));
        assert!(!gate.is_allowed(caller));
    }
}
