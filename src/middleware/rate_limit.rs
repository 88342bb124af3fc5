use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

const WINDOW: Duration = Duration::from_secs(1);
// Stale windows are swept once the map grows past this.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed-window limiter keyed per caller. Every player polls status on its
/// own cadence, so one shared window would let a single noisy client starve
/// the rest of the session; keying on the id segment of the path gives each
/// player (and each admin session) its own budget.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    windows: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow(&self, key: &str) -> bool {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.start) < WINDOW);
        }

        let window = windows.entry(key.to_string()).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if now.duration_since(window.start) >= WINDOW {
            window.start = now;
            window.count = 0;
        }
        if window.count < self.rps {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// The player/session/game id embedded in the path, if any. Requests
/// without one (listings, game creation) share a single bucket.
fn caller_key(path: &str) -> &str {
    path.split('/')
        .find(|segment| Uuid::parse_str(segment).is_ok())
        .unwrap_or("unkeyed")
}

pub async fn rps_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.allow(caller_key(req.uri().path())) {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

pub fn new_rps_state(rps: u32) -> RateLimiter {
    RateLimiter::new(rps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_refuses() {
        let limiter = RateLimiter::new(3);
        let player = Uuid::new_v4().to_string();
        for _ in 0..3 {
            assert!(limiter.allow(&player));
        }
        assert!(!limiter.allow(&player));
    }

    #[test]
    fn callers_have_independent_windows() {
        let limiter = RateLimiter::new(1);
        let alice = Uuid::new_v4().to_string();
        let bob = Uuid::new_v4().to_string();
        assert!(limiter.allow(&alice));
        assert!(!limiter.allow(&alice));
        assert!(limiter.allow(&bob));
    }

    #[test]
    fn caller_key_picks_the_id_segment() {
        let player = Uuid::new_v4();
        let path = format!("/play/{}/status", player);
        assert_eq!(caller_key(&path), player.to_string());
        assert_eq!(caller_key("/admin/games"), "unkeyed");
    }
}
