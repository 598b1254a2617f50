//! Upstream clients: the primary generators and the verse retrieval source.
//!
//! All clients are thin reqwest wrappers with a `with_base_url` constructor
//! so tests can point them at a wiremock server.

pub mod bible_api;
pub mod gemini;
pub mod openai;
pub mod retry;
pub mod traits;

use std::time::Duration;

use reqwest::{Client, Response};

pub use bible_api::BibleApiClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiCompatClient;
pub use retry::RetryConfig;
pub use traits::{GenerateProvider, VerseSource};

use crate::{LectioError, Result};

/// Default per-request HTTP timeout for upstream clients.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_http(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LectioError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Pass successful responses through and map failures to [`LectioError`].
///
/// 429 honours `retry-after` (seconds), 401/403 are authentication
/// failures, anything else keeps the status and the response body so the
/// classifier can inspect provider messages.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 | 403 => Err(LectioError::AuthenticationFailed),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(LectioError::RateLimited { retry_after })
        }
        code => {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            Err(LectioError::Api {
                status: code,
                message,
            })
        }
    }
}
