#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Default-endpoint resolution and environment override.

use session_cache::config::{default_http_endpoint, DEFAULT_HTTP_ENDPOINT, HTTP_ENDPOINT_ENV};
use url::Url;

// Both scenarios share one test because they mutate process environment and
// the test harness runs tests in parallel threads.
#[test]
fn default_endpoint_respects_environment_override() {
    std::env::remove_var(HTTP_ENDPOINT_ENV);
    assert_eq!(
        default_http_endpoint().unwrap(),
        Url::parse(DEFAULT_HTTP_ENDPOINT).unwrap()
    );
    assert_eq!(
        default_http_endpoint().unwrap(),
        Url::parse("http://localhost:8545").unwrap()
    );

    std::env::set_var(HTTP_ENDPOINT_ENV, "http://node.example:9000");
    assert_eq!(
        default_http_endpoint().unwrap(),
        Url::parse("http://node.example:9000").unwrap()
    );

    // The value is read on each call, never cached as process state.
    std::env::set_var(HTTP_ENDPOINT_ENV, "http://other.example:7000");
    assert_eq!(
        default_http_endpoint().unwrap(),
        Url::parse("http://other.example:7000").unwrap()
    );

    std::env::set_var(HTTP_ENDPOINT_ENV, "not a url");
    assert!(default_http_endpoint().is_err());

    std::env::remove_var(HTTP_ENDPOINT_ENV);
}
