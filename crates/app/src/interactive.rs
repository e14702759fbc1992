//! Line-oriented transcript builder: the terminal counterpart of the composer,
//! paste helper, settings panel and result cards.

use std::sync::Arc;

use snafu::{OptionExt, ResultExt, Snafu};
use textsense_client::{ReplyBackend, generate_for_session, spawn_feedback};
use textsense_core::{
    CoreError, GenerationParameters, Intensify, Personalness, Relationship, Role, Scenario,
    Session, TargetGender, Tone, normalize_language,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

const PASTE_TERMINATOR: &str = ".";

pub const HELP: &str = "\
commands:
  add <you|partner|other> <text>   append a turn
  rm <n>                           remove turn n
  up <n> / down <n>                move turn n
  paste                            replace the transcript with pasted lines, end with '.'
  show                             list turns
  clear                            drop every turn
  params                           show generation parameters
  set <param> <value>              relationship, scenario, tone, language,
                                   target-gender, personalness
  gen                              generate replies
  softer / edgier                  regenerate in a softer or edgier register
  use <n>                          pick option n
  copy <n>                         print option n alone and pick it
  help                             this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { role: Role, text: String },
    Remove(usize),
    Up(usize),
    Down(usize),
    Paste,
    Show,
    Clear,
    Params,
    Set { key: String, value: String },
    Generate(Option<Intensify>),
    Use(usize),
    Copy(usize),
    Help,
    Quit,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("unknown command '{word}', try 'help'"))]
    UnknownCommand { stage: &'static str, word: String },
    #[snafu(display("'{command}' needs {what}"))]
    MissingArgument {
        stage: &'static str,
        command: &'static str,
        what: &'static str,
    },
    #[snafu(display("'{raw}' is not a position, use 1 for the first item"))]
    InvalidPosition { stage: &'static str, raw: String },
    #[snafu(display("unknown parameter '{key}'"))]
    UnknownParameter { stage: &'static str, key: String },
    #[snafu(display("{source}"))]
    InvalidValue {
        stage: &'static str,
        source: CoreError,
    },
    #[snafu(display("'{raw}' is not a number"))]
    InvalidNumber {
        stage: &'static str,
        raw: String,
        source: std::num::ParseIntError,
    },
}

/// Parses one input line. Positions are 1-based on input and zero-based in the result.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "add" => {
            let (role_raw, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if role_raw.is_empty() {
                return MissingArgumentSnafu {
                    stage: "parse-add",
                    command: "add",
                    what: "a role and some text",
                }
                .fail();
            }
            Command::Add {
                role: parse_role(role_raw)?,
                text: text.trim().to_string(),
            }
        }
        "rm" | "remove" | "del" => Command::Remove(parse_position(rest, "rm")?),
        "up" => Command::Up(parse_position(rest, "up")?),
        "down" => Command::Down(parse_position(rest, "down")?),
        "paste" => Command::Paste,
        "show" | "ls" => Command::Show,
        "clear" => Command::Clear,
        "params" => Command::Params,
        "set" => {
            let (key, value) = rest.split_once(char::is_whitespace).context(
                MissingArgumentSnafu {
                    stage: "parse-set",
                    command: "set",
                    what: "a parameter and a value",
                },
            )?;
            Command::Set {
                key: key.to_ascii_lowercase(),
                value: value.trim().to_string(),
            }
        }
        "gen" | "generate" => Command::Generate(None),
        "softer" => Command::Generate(Some(Intensify::Softer)),
        "edgier" => Command::Generate(Some(Intensify::Edgier)),
        "use" => Command::Use(parse_position(rest, "use")?),
        "copy" => Command::Copy(parse_position(rest, "copy")?),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => {
            return UnknownCommandSnafu {
                stage: "parse-command",
                word: word.to_string(),
            }
            .fail();
        }
    };
    Ok(command)
}

/// Accepts the wire names plus the `you` label the paste format uses.
fn parse_role(raw: &str) -> Result<Role, CommandError> {
    if raw.eq_ignore_ascii_case("you") || raw.eq_ignore_ascii_case("me") {
        return Ok(Role::User);
    }
    raw.parse::<Role>().context(InvalidValueSnafu { stage: "parse-role" })
}

fn parse_position(raw: &str, command: &'static str) -> Result<usize, CommandError> {
    if raw.is_empty() {
        return MissingArgumentSnafu {
            stage: "parse-position",
            command,
            what: "a position",
        }
        .fail();
    }

    match raw.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position - 1),
        _ => InvalidPositionSnafu {
            stage: "parse-position",
            raw: raw.to_string(),
        }
        .fail(),
    }
}

/// Applies a `set` command to the current selection.
pub fn apply_setting(
    parameters: &mut GenerationParameters,
    key: &str,
    value: &str,
) -> Result<(), CommandError> {
    match key {
        "relationship" => {
            parameters.relationship =
                value
                    .parse::<Relationship>()
                    .context(InvalidValueSnafu {
                        stage: "set-relationship",
                    })?;
        }
        "scenario" => {
            parameters.scenario = value.parse::<Scenario>().context(InvalidValueSnafu {
                stage: "set-scenario",
            })?;
        }
        "tone" => {
            parameters.tone = value
                .parse::<Tone>()
                .context(InvalidValueSnafu { stage: "set-tone" })?;
        }
        "language" | "lang" => {
            parameters.language = normalize_language(Some(value.to_string()));
        }
        "target-gender" | "target_gender" | "gender" => {
            parameters.target_gender = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(
                    value
                        .parse::<TargetGender>()
                        .context(InvalidValueSnafu {
                            stage: "set-target-gender",
                        })?,
                )
            };
        }
        "personalness" => {
            let raw = value.parse::<i64>().context(InvalidNumberSnafu {
                stage: "set-personalness",
                raw: value.to_string(),
            })?;
            parameters.personalness = Personalness::clamped(raw);
        }
        _ => {
            return UnknownParameterSnafu {
                stage: "apply-setting",
                key: key.to_string(),
            }
            .fail();
        }
    }
    Ok(())
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run(backend: Arc<dyn ReplyBackend>, mut session: Session) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("TextSense. Build the conversation, then 'gen'. Type 'help' for commands.");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Paste => {
                let mut pasted = Vec::new();
                while let Some(line) = lines.next_line().await? {
                    if line.trim() == PASTE_TERMINATOR {
                        break;
                    }
                    pasted.push(line);
                }
                let count = session.paste(&pasted.join("\n"));
                println!("parsed {count} turns");
                print!("{}", render::turns(session.transcript().turns()));
            }
            Command::Generate(intensify) => {
                if !session.can_generate() {
                    println!("Add at least one message before generating replies.");
                    continue;
                }
                println!("Generating...");
                match generate_for_session(backend.as_ref(), &mut session, intensify).await {
                    Ok(()) => {
                        if let Some(response) = session.last_response() {
                            print!("{}", render::response(response));
                        }
                    }
                    Err(_) => {
                        if let Some(message) = session.last_error() {
                            println!("{message}");
                        }
                    }
                }
            }
            Command::Use(index) => pick_option(&backend, &session, index, false),
            Command::Copy(index) => pick_option(&backend, &session, index, true),
            other => {
                if let Err(message) = apply_local(&mut session, other) {
                    println!("{message}");
                }
            }
        }
    }

    Ok(())
}

/// Copy and use both report the choice; copy also prints the bare text so it can
/// be piped or selected.
fn pick_option(backend: &Arc<dyn ReplyBackend>, session: &Session, index: usize, copy: bool) {
    match session.feedback_for(index) {
        Ok((generation_id, option)) => {
            if copy {
                println!("{}", option.text);
            } else {
                println!("picked '{}'", option.label);
            }
            spawn_feedback(Arc::clone(backend), generation_id, Some(option));
        }
        Err(error) => println!("{error}"),
    }
}

/// Commands that only touch local state.
fn apply_local(session: &mut Session, command: Command) -> Result<(), String> {
    match command {
        Command::Add { role, text } => {
            if !session.transcript_mut().add_turn(role, &text) {
                return Err("nothing to add, the text is empty".to_string());
            }
            print!("{}", render::turns(session.transcript().turns()));
        }
        Command::Remove(index) => {
            let removed = session
                .transcript_mut()
                .remove_turn(index)
                .map_err(|error| error.to_string())?;
            println!("removed {}: {}", removed.role.display_label(), removed.text);
        }
        Command::Up(index) => {
            session.transcript_mut().move_up(index);
            print!("{}", render::turns(session.transcript().turns()));
        }
        Command::Down(index) => {
            session.transcript_mut().move_down(index);
            print!("{}", render::turns(session.transcript().turns()));
        }
        Command::Show => print!("{}", render::turns(session.transcript().turns())),
        Command::Clear => session.transcript_mut().clear(),
        Command::Params => print!("{}", render::parameters(session.parameters())),
        Command::Set { key, value } => {
            apply_setting(session.parameters_mut(), &key, &value)
                .map_err(|error| error.to_string())?;
            print!("{}", render::parameters(session.parameters()));
        }
        Command::Help => println!("{HELP}"),
        Command::Paste
        | Command::Generate(_)
        | Command::Use(_)
        | Command::Copy(_)
        | Command::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(parse_command("rm 1").unwrap(), Command::Remove(0));
        assert_eq!(parse_command("  DOWN 3 ").unwrap(), Command::Down(2));
        assert!(matches!(
            parse_command("up 0").unwrap_err(),
            CommandError::InvalidPosition { .. }
        ));
        assert!(matches!(
            parse_command("use").unwrap_err(),
            CommandError::MissingArgument { command: "use", .. }
        ));
    }

    #[test]
    fn add_accepts_you_as_the_user_role() {
        assert_eq!(
            parse_command("add you   on my way ").unwrap(),
            Command::Add {
                role: Role::User,
                text: "on my way".to_string(),
            }
        );
        assert_eq!(
            parse_command("add partner").unwrap(),
            Command::Add {
                role: Role::Partner,
                text: String::new(),
            }
        );
        assert!(matches!(
            parse_command("add boss hi").unwrap_err(),
            CommandError::InvalidValue { .. }
        ));
    }

    #[test]
    fn intensify_commands_map_to_modifiers() {
        assert_eq!(parse_command("gen").unwrap(), Command::Generate(None));
        assert_eq!(
            parse_command("softer").unwrap(),
            Command::Generate(Some(Intensify::Softer))
        );
        assert_eq!(
            parse_command("edgier").unwrap(),
            Command::Generate(Some(Intensify::Edgier))
        );
        assert!(matches!(
            parse_command("dance").unwrap_err(),
            CommandError::UnknownCommand { .. }
        ));
    }

    #[test]
    fn settings_update_the_selection() {
        let mut parameters = GenerationParameters::default();
        apply_setting(&mut parameters, "relationship", "Boss").unwrap();
        apply_setting(&mut parameters, "scenario", "say-no").unwrap();
        apply_setting(&mut parameters, "target-gender", "female").unwrap();
        apply_setting(&mut parameters, "personalness", "140").unwrap();
        apply_setting(&mut parameters, "language", "es").unwrap();

        assert_eq!(parameters.relationship, Relationship::Boss);
        assert_eq!(parameters.scenario, Scenario::SayNo);
        assert_eq!(parameters.target_gender, Some(TargetGender::Female));
        assert_eq!(parameters.personalness.value(), 100);
        assert_eq!(parameters.language.as_deref(), Some("es"));

        apply_setting(&mut parameters, "target-gender", "none").unwrap();
        apply_setting(&mut parameters, "language", "auto").unwrap();
        assert_eq!(parameters.target_gender, None);
        assert_eq!(parameters.language, None);

        assert!(apply_setting(&mut parameters, "mood", "x").is_err());
        assert!(apply_setting(&mut parameters, "personalness", "lots").is_err());
    }

    #[test]
    fn local_commands_edit_the_transcript() {
        let mut session = Session::default();
        apply_local(
            &mut session,
            Command::Add {
                role: Role::Partner,
                text: "first".to_string(),
            },
        )
        .unwrap();
        apply_local(
            &mut session,
            Command::Add {
                role: Role::User,
                text: "second".to_string(),
            },
        )
        .unwrap();
        assert!(
            apply_local(
                &mut session,
                Command::Add {
                    role: Role::User,
                    text: "   ".to_string(),
                },
            )
            .is_err()
        );

        apply_local(&mut session, Command::Up(1)).unwrap();
        assert_eq!(session.transcript().turns()[0].text, "second");

        assert!(apply_local(&mut session, Command::Remove(5)).is_err());
        apply_local(&mut session, Command::Remove(0)).unwrap();
        assert_eq!(session.transcript().len(), 1);
    }
}
