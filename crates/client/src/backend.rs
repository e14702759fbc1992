use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use snafu::ResultExt;
use textsense_core::{
    GenerateRequest, GenerateResponse, HealthStatus, Intensify, ReplyOption, Session, UsageStats,
};

use super::error::{ClientResult, SessionSnafu};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote reply service as seen by the front-end.
pub trait ReplyBackend: Send + Sync {
    /// Single attempt, no retry. Fails before any I/O on an empty transcript.
    fn generate<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> BoxFuture<'a, ClientResult<GenerateResponse>>;

    /// Best-effort: failures are logged and dropped, the caller never sees them.
    fn send_feedback<'a>(
        &'a self,
        generation_id: &'a str,
        chosen: Option<&'a ReplyOption>,
    ) -> BoxFuture<'a, ()>;

    fn health<'a>(&'a self) -> BoxFuture<'a, ClientResult<HealthStatus>>;

    fn stats<'a>(&'a self) -> BoxFuture<'a, ClientResult<UsageStats>>;
}

/// Fires feedback on a detached task. The join handle is dropped on purpose: the
/// surrounding user action must not wait on it, and there is no result to observe.
///
/// Must be called from within a tokio runtime.
pub fn spawn_feedback(
    backend: Arc<dyn ReplyBackend>,
    generation_id: String,
    chosen: Option<ReplyOption>,
) {
    let _detached = tokio::spawn(async move {
        backend
            .send_feedback(&generation_id, chosen.as_ref())
            .await;
    });
}

/// Runs one generation for the session: validate, call the backend, record the outcome.
/// The response is read back through [`Session::last_response`].
///
/// On failure the session keeps the user-facing message and no options; the error is
/// also returned so the caller can log it.
pub async fn generate_for_session(
    backend: &dyn ReplyBackend,
    session: &mut Session,
    intensify: Option<Intensify>,
) -> ClientResult<()> {
    let request = session.begin_generation(intensify).context(SessionSnafu {
        stage: "generate-for-session",
    })?;

    let turn_count = request.messages.len();
    tracing::debug!(turn_count, intensify = ?intensify, "starting generation");

    match backend.generate(&request).await {
        Ok(response) => {
            tracing::info!(
                generation_id = %response.id,
                option_count = response.options.len(),
                language = ?response.language,
                "generation finished"
            );
            session.finish_generation(Ok(response));
            Ok(())
        }
        Err(error) => {
            tracing::debug!(error = %error, "generation failed");
            session.finish_generation(Err(error.user_message()));
            Err(error)
        }
    }
}
