use snafu::Snafu;
use textsense_core::SessionError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("base URL '{raw}' is invalid: {details}"))]
    InvalidBaseUrl {
        stage: &'static str,
        raw: String,
        details: String,
    },
    #[snafu(display("failed to build HTTP client on `{stage}`, {source}"))]
    BuildHttpClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("cannot generate replies from an empty transcript"))]
    EmptyTranscript { stage: &'static str },
    #[snafu(display("session refused to start a generation: {source}"))]
    Session {
        stage: &'static str,
        source: SessionError,
    },
    #[snafu(display("request to {endpoint} failed on `{stage}`, {source}"))]
    Network {
        stage: &'static str,
        endpoint: String,
        source: reqwest::Error,
    },
    #[snafu(display("{endpoint} returned status {status}: {body}"))]
    Api {
        stage: &'static str,
        endpoint: String,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode response from {endpoint}: {source}"))]
    Decode {
        stage: &'static str,
        endpoint: String,
        source: serde_json::Error,
    },
}

impl ClientError {
    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text for the front-end. Transport and decode failures collapse into a generic
    /// message; API errors show the server's body when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status, body, .. } if body.trim().is_empty() => {
                format!("The server returned an error ({status}).")
            }
            ClientError::Api { status, body, .. } => {
                format!("The server returned an error ({status}): {}", body.trim())
            }
            ClientError::Network { .. } | ClientError::Decode { .. } => {
                "Could not reach the reply service. Please try again.".to_string()
            }
            ClientError::EmptyTranscript { .. } => {
                "Add at least one message before generating replies.".to_string()
            }
            ClientError::Session { source, .. } => source.to_string(),
            ClientError::InvalidBaseUrl { .. } | ClientError::BuildHttpClient { .. } => {
                self.to_string()
            }
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
