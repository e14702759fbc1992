mod cli;
mod error;
mod interactive;
mod render;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use snafu::{OptionExt, ResultExt};
use textsense_client::{ReplyBackend, create_backend, generate_for_session};
use textsense_core::Session;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, SettingsCommand};
use crate::error::{
    AppResult, ClientSnafu, EmptyDialogSnafu, EncodeOutputSnafu, NoSuchOptionSnafu,
    ParameterSnafu, ReadDialogSnafu, ReadStdinSnafu, SettingsSnafu, TerminalSnafu,
};
use crate::settings::{AppSettings, SettingsStore};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for replies and JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(error = ?error, "command failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let store = match &cli.config {
        Some(path) => SettingsStore::new(path.clone()),
        None => SettingsStore::load(),
    };
    let mut settings = (*store.settings()).clone();
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
        settings = settings.normalized();
    }

    match cli.cmd {
        Command::Parse { file, json } => {
            let turns = textsense_core::parse_dialog(&read_dialog(file.as_deref())?);
            if json {
                let encoded = serde_json::to_string_pretty(&turns).context(EncodeOutputSnafu {
                    stage: "encode-parsed-turns",
                })?;
                println!("{encoded}");
            } else {
                print!("{}", render::turns(&turns));
            }
        }
        Command::Generate {
            file,
            overrides,
            intensify,
            choose,
            json,
        } => {
            let parameters = overrides
                .apply(settings.defaults.clone())
                .context(ParameterSnafu {
                    stage: "apply-parameter-overrides",
                })?;
            let mut session = Session::new(parameters);
            if session.paste(&read_dialog(file.as_deref())?) == 0 {
                return EmptyDialogSnafu {
                    stage: "generate-paste",
                }
                .fail();
            }

            let backend = backend_for(&settings)?;
            generate_for_session(backend.as_ref(), &mut session, intensify)
                .await
                .context(ClientSnafu { stage: "generate" })?;

            if let Some(response) = session.last_response() {
                if json {
                    let encoded =
                        serde_json::to_string_pretty(response).context(EncodeOutputSnafu {
                            stage: "encode-generate-response",
                        })?;
                    println!("{encoded}");
                } else {
                    print!("{}", render::response(response));
                }
            }

            if let Some(position) = choose {
                report_choice(backend.as_ref(), &session, position).await?;
            }
        }
        Command::Interactive { overrides } => {
            let parameters = overrides
                .apply(settings.defaults.clone())
                .context(ParameterSnafu {
                    stage: "apply-parameter-overrides",
                })?;
            let backend = backend_for(&settings)?;
            interactive::run(backend, Session::new(parameters))
                .await
                .context(TerminalSnafu {
                    stage: "interactive-loop",
                })?;
        }
        Command::Health => {
            let backend = backend_for(&settings)?;
            let health = backend
                .health()
                .await
                .context(ClientSnafu { stage: "health" })?;
            print!("{}", render::health(&health));
        }
        Command::Stats { json } => {
            let backend = backend_for(&settings)?;
            let stats = backend
                .stats()
                .await
                .context(ClientSnafu { stage: "stats" })?;
            if json {
                let encoded = serde_json::to_string_pretty(&stats).context(EncodeOutputSnafu {
                    stage: "encode-stats",
                })?;
                println!("{encoded}");
            } else {
                print!("{}", render::stats(&stats));
            }
        }
        Command::Settings { cmd } => match cmd {
            SettingsCommand::Show => {
                let encoded = serde_json::to_string_pretty(&settings).context(EncodeOutputSnafu {
                    stage: "encode-settings",
                })?;
                println!("{encoded}");
            }
            SettingsCommand::Path => println!("{}", store.config_path().display()),
            SettingsCommand::Save => {
                store.update(settings).context(SettingsSnafu {
                    stage: "save-settings",
                })?;
                println!("saved {}", store.config_path().display());
            }
        },
    }

    Ok(())
}

fn backend_for(settings: &AppSettings) -> AppResult<Arc<dyn ReplyBackend>> {
    create_backend(settings.to_client_config()).context(ClientSnafu {
        stage: "create-backend",
    })
}

/// One-shot runs exit right after, so feedback is awaited here instead of detached.
/// It still cannot fail the command.
async fn report_choice(
    backend: &dyn ReplyBackend,
    session: &Session,
    position: usize,
) -> AppResult<()> {
    let count = session
        .last_response()
        .map(|response| response.options.len())
        .unwrap_or(0);
    let index = position
        .checked_sub(1)
        .filter(|index| *index < count)
        .context(NoSuchOptionSnafu {
            stage: "choose-option",
            position,
            count,
        })?;

    if let Ok((generation_id, option)) = session.feedback_for(index) {
        backend.send_feedback(&generation_id, Some(&option)).await;
        eprintln!("reported option {position} ({})", option.label);
    }
    Ok(())
}

fn read_dialog(file: Option<&Path>) -> AppResult<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).context(ReadDialogSnafu {
            stage: "read-dialog-file",
            path: PathBuf::from(path),
        }),
        None => std::io::read_to_string(std::io::stdin()).context(ReadStdinSnafu {
            stage: "read-dialog-stdin",
        }),
    }
}
