use std::time::Duration;

use axum::http;
use reqwest::Client;

/// HTTP client for talking to inference workers
///
/// No overall request timeout is set: streaming synthesis keeps the response
/// open for as long as the utterance takes, so only connecting is bounded.
pub fn http_client(connect_timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
}
