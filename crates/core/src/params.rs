use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::error::{CoreError, CoreResult, PersonalnessOutOfRangeSnafu};

define_wire_enum! {
    /// Who the user is talking to.
    Relationship, "relationship" {
        Girlfriend => "girlfriend",
        Boyfriend => "boyfriend",
        Friend => "friend",
        Coworker => "coworker",
        Boss => "boss",
        Stranger => "stranger",
        Family => "family",
        Other => "other",
    }
}

define_wire_enum! {
    /// What the reply is supposed to achieve.
    Scenario, "scenario" {
        DefuseTension => "defuse_tension",
        Apologize => "apologize",
        Flirt => "flirt",
        AskOut => "ask_out",
        Schedule => "schedule",
        Negotiate => "negotiate",
        FollowUp => "follow_up",
        RejectPolitely => "reject_politely",
        SayNo => "say_no",
        Clarify => "clarify",
        Congratulate => "congratulate",
        Thank => "thank",
        Other => "other",
    }
}

define_wire_enum! {
    Tone, "tone" {
        Confident => "confident",
        Friendly => "friendly",
        Neutral => "neutral",
        Apologetic => "apologetic",
        Playful => "playful",
        Flirty => "flirty",
        Formal => "formal",
        Direct => "direct",
        Other => "other",
    }
}

define_wire_enum! {
    TargetGender, "target gender" {
        Female => "female",
        Male => "male",
        Other => "other",
    }
}

define_wire_enum! {
    /// Post-hoc modifier asking the backend for a softer or edgier register.
    Intensify, "intensify modifier" {
        Softer => "softer",
        Edgier => "edgier",
    }
}

/// How personal the generated replies should sound, from 0 (formal) to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Personalness(u8);

impl Personalness {
    pub const MAX: u8 = 100;

    pub fn new(value: i64) -> CoreResult<Self> {
        ensure!(
            (0..=i64::from(Self::MAX)).contains(&value),
            PersonalnessOutOfRangeSnafu {
                stage: "personalness-new",
                value,
            }
        );
        Ok(Self(value as u8))
    }

    /// Slider input is clamped rather than rejected.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX)) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Personalness {
    fn default() -> Self {
        Self(55)
    }
}

impl TryFrom<i64> for Personalness {
    type Error = CoreError;

    fn try_from(value: i64) -> CoreResult<Self> {
        Self::new(value)
    }
}

impl From<Personalness> for u8 {
    fn from(value: Personalness) -> Self {
        value.0
    }
}

impl fmt::Display for Personalness {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// The user's current generation selection. Read at generation time, never persisted
/// with the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    pub relationship: Relationship,
    pub scenario: Scenario,
    pub tone: Tone,
    /// `None` lets the backend detect the language from the transcript.
    pub language: Option<String>,
    pub target_gender: Option<TargetGender>,
    pub personalness: Personalness,
    pub intensify: Option<Intensify>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            relationship: Relationship::Girlfriend,
            scenario: Scenario::DefuseTension,
            tone: Tone::Friendly,
            language: None,
            target_gender: None,
            personalness: Personalness::default(),
            intensify: None,
        }
    }
}

impl GenerationParameters {
    pub fn normalized(mut self) -> Self {
        self.language = normalize_language(self.language);
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = normalize_language(language);
        self
    }
}

/// Blank input and the literal `auto` both mean "let the backend detect it".
pub fn normalize_language(language: Option<String>) -> Option<String> {
    language.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_enums_parse_case_insensitively_and_accept_dashes() {
        assert_eq!("Defuse-Tension".parse::<Scenario>().unwrap(), Scenario::DefuseTension);
        assert_eq!(" BOSS ".parse::<Relationship>().unwrap(), Relationship::Boss);
        assert_eq!("edgier".parse::<Intensify>().unwrap(), Intensify::Edgier);

        let error = "sarcastic".parse::<Tone>().unwrap_err();
        assert!(matches!(error, CoreError::UnknownVariant { kind: "tone", .. }));
    }

    #[test]
    fn wire_names_match_the_generation_endpoint() {
        let names = Scenario::ALL.iter().map(Scenario::as_str).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "defuse_tension",
                "apologize",
                "flirt",
                "ask_out",
                "schedule",
                "negotiate",
                "follow_up",
                "reject_politely",
                "say_no",
                "clarify",
                "congratulate",
                "thank",
                "other",
            ]
        );
        assert_eq!(Relationship::ALL.len(), 8);
        assert_eq!(Tone::ALL.len(), 9);
        assert_eq!(
            serde_json::to_string(&Scenario::RejectPolitely).unwrap(),
            "\"reject_politely\""
        );
    }

    #[test]
    fn personalness_rejects_out_of_range_but_clamps_slider_input() {
        assert_eq!(Personalness::new(0).unwrap().value(), 0);
        assert_eq!(Personalness::new(100).unwrap().value(), 100);
        assert!(Personalness::new(101).is_err());
        assert!(Personalness::new(-1).is_err());
        assert_eq!(Personalness::clamped(250).value(), 100);
        assert_eq!(Personalness::clamped(-3).value(), 0);

        assert!(serde_json::from_str::<Personalness>("140").is_err());
        assert_eq!(serde_json::to_string(&Personalness::clamped(42)).unwrap(), "42");
    }

    #[test]
    fn language_normalization_treats_auto_as_detect() {
        assert_eq!(normalize_language(Some("  ".into())), None);
        assert_eq!(normalize_language(Some("Auto".into())), None);
        assert_eq!(normalize_language(Some(" ru ".into())), Some("ru".to_string()));
        assert_eq!(normalize_language(None), None);
    }

    #[test]
    fn parameters_fill_missing_fields_with_defaults() {
        let parameters: GenerationParameters =
            serde_json::from_str(r#"{"tone": "formal"}"#).unwrap();
        assert_eq!(parameters.tone, Tone::Formal);
        assert_eq!(parameters.relationship, Relationship::Girlfriend);
        assert_eq!(parameters.personalness.value(), 55);
    }
}
