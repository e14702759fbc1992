use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use snafu::{ResultExt, ensure};
use textsense_core::{
    FeedbackRequest, GenerateRequest, GenerateResponse, HealthStatus, ReplyOption, UsageStats,
};

use super::backend::{BoxFuture, ReplyBackend};
use super::error::{
    ApiSnafu, BuildHttpClientSnafu, ClientError, ClientResult, DecodeSnafu, EmptyTranscriptSnafu,
    InvalidBaseUrlSnafu, NetworkSnafu,
};

pub const DEFAULT_BASE_URL: &str = "https://ilyabnae-mynineapp.hf.space";

pub const GENERATE_PATH: &str = "/generate_reply";
pub const FEEDBACK_PATH: &str = "/feedback";
pub const HEALTH_PATH: &str = "/health";
pub const STATS_PATH: &str = "/stats";

const USER_AGENT: &str = concat!("textsense/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim().to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Talks to the reply service over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpReplyClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpReplyClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context(BuildHttpClientSnafu {
                stage: "build-http-client",
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_generate(&self, request: &GenerateRequest) -> ClientResult<GenerateResponse> {
        ensure!(
            !request.messages.is_empty(),
            EmptyTranscriptSnafu {
                stage: "validate-generate-request",
            }
        );

        let endpoint = self.endpoint(GENERATE_PATH);
        let response = self
            .http
            .post(&endpoint)
            .json(request)
            .send()
            .await
            .context(NetworkSnafu {
                stage: "send-generate-request",
                endpoint: endpoint.clone(),
            })?;

        let generated: GenerateResponse = read_json(response, endpoint, "generate").await?;
        tracing::debug!(
            generation_id = %generated.id,
            option_count = generated.options.len(),
            "reply service returned options"
        );
        Ok(generated)
    }

    async fn post_feedback(&self, body: &FeedbackRequest) -> ClientResult<()> {
        let endpoint = self.endpoint(FEEDBACK_PATH);
        let response = self
            .http
            .post(&endpoint)
            .json(body)
            .send()
            .await
            .context(NetworkSnafu {
                stage: "send-feedback",
                endpoint: endpoint.clone(),
            })?;

        // Any body is ignored; only the status matters for the debug log.
        let status = response.status();
        ensure!(
            status.is_success(),
            ApiSnafu {
                stage: "feedback-http-status",
                endpoint,
                status: status.as_u16(),
                body: String::new(),
            }
        );
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        stage: &'static str,
    ) -> ClientResult<T> {
        let endpoint = self.endpoint(path);
        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .context(NetworkSnafu {
                stage,
                endpoint: endpoint.clone(),
            })?;

        read_json(response, endpoint, stage).await
    }
}

impl ReplyBackend for HttpReplyClient {
    fn generate<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> BoxFuture<'a, ClientResult<GenerateResponse>> {
        Box::pin(self.post_generate(request))
    }

    fn send_feedback<'a>(
        &'a self,
        generation_id: &'a str,
        chosen: Option<&'a ReplyOption>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let body = FeedbackRequest::new(generation_id, chosen);
            match self.post_feedback(&body).await {
                Ok(()) => tracing::debug!(generation_id, "feedback delivered"),
                Err(error) => {
                    tracing::debug!(generation_id, error = %error, "feedback dropped")
                }
            }
        })
    }

    fn health<'a>(&'a self) -> BoxFuture<'a, ClientResult<HealthStatus>> {
        Box::pin(self.get_json(HEALTH_PATH, "health"))
    }

    fn stats<'a>(&'a self) -> BoxFuture<'a, ClientResult<UsageStats>> {
        Box::pin(self.get_json(STATS_PATH, "stats"))
    }
}

/// Reads the whole body, then maps non-2xx to `Api` and undecodable 2xx to `Decode`.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: String,
    stage: &'static str,
) -> ClientResult<T> {
    let status = response.status();
    let body = response.text().await.context(NetworkSnafu {
        stage,
        endpoint: endpoint.clone(),
    })?;

    if !status.is_success() {
        tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "reply service error");
        return ApiSnafu {
            stage,
            endpoint,
            status: status.as_u16(),
            body,
        }
        .fail();
    }

    serde_json::from_str(&body).context(DecodeSnafu { stage, endpoint })
}

fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed).map_err(|source| ClientError::InvalidBaseUrl {
        stage: "parse-base-url",
        raw: raw.to_string(),
        details: source.to_string(),
    })?;

    ensure!(
        matches!(parsed.scheme(), "http" | "https"),
        InvalidBaseUrlSnafu {
            stage: "check-base-url-scheme",
            raw: raw.to_string(),
            details: format!("unsupported scheme '{}'", parsed.scheme()),
        }
    );

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed_and_validated() {
        let client = HttpReplyClient::new(ClientConfig::new(" https://example.test/api/ ")).unwrap();
        assert_eq!(client.base_url(), "https://example.test/api");
        assert_eq!(
            client.endpoint(GENERATE_PATH),
            "https://example.test/api/generate_reply"
        );

        let error = HttpReplyClient::new(ClientConfig::new("not a url")).unwrap_err();
        assert!(matches!(error, ClientError::InvalidBaseUrl { .. }));

        let error = HttpReplyClient::new(ClientConfig::new("ftp://example.test")).unwrap_err();
        assert!(matches!(
            error,
            ClientError::InvalidBaseUrl {
                stage: "check-base-url-scheme",
                ..
            }
        ));
    }

    #[test]
    fn default_config_points_at_the_hosted_service() {
        let client = HttpReplyClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }
}
