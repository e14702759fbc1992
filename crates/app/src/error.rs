use std::path::PathBuf;

use snafu::Snafu;
use textsense_client::ClientError;
use textsense_core::CoreError;

use crate::settings::SettingsError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AppError {
    #[snafu(display("failed to read dialog from {path:?}: {source}"))]
    ReadDialog {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to read dialog from stdin: {source}"))]
    ReadStdin {
        stage: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("the dialog has no non-blank lines"))]
    EmptyDialog { stage: &'static str },
    #[snafu(display("invalid parameter: {source}"))]
    Parameter {
        stage: &'static str,
        source: CoreError,
    },
    #[snafu(display("option {position} does not exist, the service returned {count}"))]
    NoSuchOption {
        stage: &'static str,
        position: usize,
        count: usize,
    },
    #[snafu(display("{}", source.user_message()))]
    Client {
        stage: &'static str,
        source: ClientError,
    },
    #[snafu(display("{source}"))]
    Settings {
        stage: &'static str,
        source: SettingsError,
    },
    #[snafu(display("failed to encode output: {source}"))]
    EncodeOutput {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("terminal input failed: {source}"))]
    Terminal {
        stage: &'static str,
        source: std::io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;
