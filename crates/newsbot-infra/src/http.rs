//! Shared plumbing for the provider HTTP clients.

use std::time::Duration;

use newsbot_types::error::ProviderError;

/// Longest upstream error body kept in a [`ProviderError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Build a `reqwest` client with a whole-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("failed to create HTTP client: {e}")))
}

/// Map transport failures (connect, timeout, TLS) to `ProviderError::Http`.
pub fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Http(format!("request timed out: {err}"))
    } else {
        ProviderError::Http(format!("HTTP request failed: {err}"))
    }
}

/// Pass successful responses through; turn everything else into the
/// matching `ProviderError`.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }

    Err(match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationFailed,
        429 => ProviderError::RateLimited,
        code => ProviderError::Status { status: code, body },
    })
}

/// Decode a JSON response body.
pub async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Deserialization(format!("failed to parse response: {e}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Serve `router` on an ephemeral localhost port and return its base URL.
    pub async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}
