use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} API error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ProviderError {
    pub(crate) fn http(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Http { provider, source }
    }
}

/// Turns a non-success response into [`ProviderError::Status`], keeping the body for logs.
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}
