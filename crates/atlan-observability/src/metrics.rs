//! API call metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::sync::Once;
use std::time::Duration;

pub const API_REQUESTS_TOTAL: &str = "atlan_api_requests_total";
pub const API_ERRORS_TOTAL: &str = "atlan_api_errors_total";
pub const API_REQUEST_DURATION: &str = "atlan_api_request_duration_seconds";
pub const API_RETRIES_TOTAL: &str = "atlan_api_retries_total";

static REGISTER: Once = Once::new();

/// Registers metric descriptions. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        describe_counter!(API_REQUESTS_TOTAL, "Requests sent to the catalog API");
        describe_counter!(
            API_ERRORS_TOTAL,
            "Catalog API calls that ended in an error, by error kind"
        );
        describe_counter!(API_RETRIES_TOTAL, "Retried catalog API requests");
        describe_histogram!(
            API_REQUEST_DURATION,
            "Latency of catalog API requests in seconds"
        );
    });
}

/// Whether [`register_metrics`] has run in this process.
pub fn metrics_registered() -> bool {
    REGISTER.is_completed()
}

/// Records a completed HTTP exchange.
pub fn record_api_call(method: &str, status: u16, elapsed: Duration) {
    counter!(API_REQUESTS_TOTAL, "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!(API_REQUEST_DURATION, "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

/// Records a failed call by error kind (`not_found`, `rate_limited`, ...).
pub fn record_api_error(kind: &'static str) {
    counter!(API_ERRORS_TOTAL, "kind" => kind).increment(1);
}

/// Records a retry attempt.
pub fn record_retry(method: &str) {
    counter!(API_RETRIES_TOTAL, "method" => method.to_string()).increment(1);
}
