use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use textsense_core::{GenerationParameters, Intensify, Relationship, Scenario, TargetGender, Tone};

#[derive(Debug, Parser)]
#[command(name = "textsense")]
#[command(about = "Suggest replies for a chat conversation", version)]
pub struct Cli {
    /// Settings file, defaults to the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reply service base URL, overrides settings
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse pasted dialog into turns
    Parse {
        /// Dialog file, stdin when omitted
        file: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Generate reply options for a dialog
    Generate {
        /// Dialog file in `You: ...` / `Partner: ...` form, stdin when omitted
        file: Option<PathBuf>,

        #[command(flatten)]
        overrides: ParameterArgs,

        #[arg(long)]
        intensify: Option<Intensify>,

        /// Report option N (1-based) as the one used
        #[arg(long, value_name = "N")]
        choose: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Build a conversation interactively
    Interactive {
        #[command(flatten)]
        overrides: ParameterArgs,
    },
    /// Check the reply service is up
    Health,
    /// Show reply service usage counters
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Inspect or write settings
    Settings {
        #[command(subcommand)]
        cmd: SettingsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print effective settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Write effective settings (including --base-url) to the settings file
    Save,
}

/// Per-run overrides of the configured default parameters.
#[derive(Debug, Clone, Default, Args)]
pub struct ParameterArgs {
    #[arg(long)]
    pub relationship: Option<Relationship>,

    #[arg(long)]
    pub scenario: Option<Scenario>,

    #[arg(long)]
    pub tone: Option<Tone>,

    /// Language code, `auto` to let the service detect it
    #[arg(long)]
    pub language: Option<String>,

    /// female, male, other, or none
    #[arg(long, value_name = "GENDER")]
    pub target_gender: Option<String>,

    /// 0 (formal) to 100 (very personal), clamped
    #[arg(long, allow_negative_numbers = true)]
    pub personalness: Option<i64>,
}

impl ParameterArgs {
    pub fn apply(
        &self,
        mut parameters: GenerationParameters,
    ) -> Result<GenerationParameters, textsense_core::CoreError> {
        if let Some(relationship) = self.relationship {
            parameters.relationship = relationship;
        }
        if let Some(scenario) = self.scenario {
            parameters.scenario = scenario;
        }
        if let Some(tone) = self.tone {
            parameters.tone = tone;
        }
        if let Some(language) = &self.language {
            parameters = parameters.with_language(Some(language.clone()));
        }
        if let Some(gender) = &self.target_gender {
            parameters.target_gender = if gender.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(gender.parse::<TargetGender>()?)
            };
        }
        if let Some(personalness) = self.personalness {
            parameters.personalness = textsense_core::Personalness::clamped(personalness);
        }
        Ok(parameters)
    }
}
