//! Client-side metrics
//!
//! Emitted through the `metrics` facade; they are no-ops until the host
//! application installs a recorder.
//!
//! - `storefront_requests_total` (counter): labels `method`, `status`
//! - `storefront_transport_errors_total` (counter): label `kind`
//! - `storefront_retries_total` (counter)
//! - `storefront_token_refresh_total` (counter): label `outcome`
//! - `storefront_refresh_waiters_total` (counter)

/// Record one HTTP exchange that produced a response.
pub fn record_request(method: &str, status: u16) {
    metrics::counter!(
        "storefront_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a transport failure surfaced to the caller (`timeout` or `connection`).
pub fn record_transport_error(kind: &'static str) {
    metrics::counter!("storefront_transport_errors_total", "kind" => kind).increment(1);
}

/// Record one executor retry.
pub fn record_retry() {
    metrics::counter!("storefront_retries_total").increment(1);
}

/// Record a settled refresh (`success` or `failure`).
pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("storefront_token_refresh_total", "outcome" => outcome).increment(1);
}

/// Record a caller queued behind an in-flight refresh.
pub fn record_refresh_waiter() {
    metrics::counter!("storefront_refresh_waiters_total").increment(1);
}
