//! HTTP client for the TextSense reply service.

mod backend;
mod error;
mod http;

use std::sync::Arc;

pub use backend::{BoxFuture, ReplyBackend, generate_for_session, spawn_feedback};
pub use error::{ClientError, ClientResult};
pub use http::{
    ClientConfig, DEFAULT_BASE_URL, FEEDBACK_PATH, GENERATE_PATH, HEALTH_PATH, HttpReplyClient,
    STATS_PATH,
};

pub fn create_backend(config: ClientConfig) -> ClientResult<Arc<dyn ReplyBackend>> {
    Ok(Arc::new(HttpReplyClient::new(config)?))
}
