//! reqwest-based transport for the hosted OpenAI and Anthropic APIs.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::{ProviderError, ProviderFuture, ProviderId, ProviderRequest, ProviderResponse, ProviderTransport};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    provider: ProviderId,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(provider: ProviderId, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let base_url = match provider {
            ProviderId::OpenAi => OPENAI_BASE_URL,
            ProviderId::Anthropic => ANTHROPIC_BASE_URL,
            ProviderId::Echo => {
                return Err(ProviderError::invalid_request(
                    "the echo provider has no HTTP endpoint",
                ));
            }
        };

        Ok(Self {
            client: Client::new(),
            provider,
            base_url: base_url.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            provider: ProviderId::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn anthropic(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            provider: ProviderId::Anthropic,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the provider's API key from its conventional environment variable.
    pub fn from_env(provider: ProviderId) -> Result<Self, ProviderError> {
        let variable = match provider {
            ProviderId::OpenAi => OPENAI_API_KEY_ENV,
            ProviderId::Anthropic => ANTHROPIC_API_KEY_ENV,
            ProviderId::Echo => {
                return Err(ProviderError::invalid_request(
                    "the echo provider has no HTTP endpoint",
                ));
            }
        };

        let api_key = std::env::var(variable)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::authentication(format!("{variable} is not set")))?;

        Self::new(provider, api_key)
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        let path = match self.provider {
            ProviderId::OpenAi => "responses",
            ProviderId::Anthropic | ProviderId::Echo => "messages",
        };

        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn apply_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.provider {
            ProviderId::Anthropic => builder
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            ProviderId::OpenAi | ProviderId::Echo => builder.bearer_auth(&self.api_key),
        }
    }

    async fn parse_error(&self, response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("{} request failed with status {status}", self.provider));

        error_for_status(status, message)
    }
}

impl ProviderTransport for HttpTransport {
    fn send<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> ProviderFuture<'a, Result<ProviderResponse, ProviderError>> {
        Box::pin(async move {
            if request.provider != self.provider {
                return Err(ProviderError::invalid_request(format!(
                    "{} transport cannot send a {} request",
                    self.provider, request.provider
                )));
            }

            let builder = self
                .client
                .post(self.endpoint())
                .timeout(self.timeout)
                .json(&request.body);
            let response = self.apply_auth(builder).send().await.map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

            if !response.status().is_success() {
                return Err(self.parse_error(response).await);
            }

            let body: Value = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(ProviderResponse::new(self.provider, body))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

pub(crate) fn error_for_status(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::timeout(message),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        // Anthropic reports overload as 529.
        status if status.as_u16() == 529 => ProviderError::unavailable(message),
        _ => ProviderError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn endpoints_follow_the_provider() {
        assert_eq!(
            HttpTransport::openai("key").endpoint(),
            "https://api.openai.com/v1/responses"
        );
        assert_eq!(
            HttpTransport::anthropic("key")
                .with_base_url("http://localhost:8080/v1/")
                .endpoint(),
            "http://localhost:8080/v1/messages"
        );
    }

    #[test]
    fn echo_has_no_http_transport() {
        let error = HttpTransport::new(ProviderId::Echo, "key").expect_err("echo");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn error_messages_are_extracted_from_both_envelopes() {
        let openai = r#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#;
        let anthropic = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;

        assert_eq!(extract_error_message(openai).as_deref(), Some("bad key"));
        assert_eq!(extract_error_message(anthropic).as_deref(), Some("Overloaded"));
        assert_eq!(extract_error_message("<html>"), None);
    }

    #[test]
    fn statuses_map_to_error_kinds() {
        let kind = |code: u16| {
            let status = StatusCode::from_u16(code).expect("valid status");
            error_for_status(status, "x".to_string()).kind
        };

        assert_eq!(kind(401), ProviderErrorKind::Authentication);
        assert_eq!(kind(429), ProviderErrorKind::RateLimited);
        assert_eq!(kind(504), ProviderErrorKind::Timeout);
        assert_eq!(kind(422), ProviderErrorKind::InvalidRequest);
        assert_eq!(kind(529), ProviderErrorKind::Unavailable);
        assert_eq!(kind(500), ProviderErrorKind::Transport);
    }
}
