//! Request and response bodies exchanged with the reply backend.
//!
//! Optional fields always serialize as explicit `null`, never omitted, so the backend
//! sees the same shape whether or not a value was chosen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::{
    GenerationParameters, Intensify, Personalness, Relationship, Scenario, TargetGender, Tone,
};
use crate::transcript::ChatTurn;

/// Body of `POST /generate_reply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub messages: Vec<ChatTurn>,
    pub relationship: Relationship,
    pub scenario: Scenario,
    pub tone: Tone,
    pub language: Option<String>,
    pub target_gender: Option<TargetGender>,
    pub personalness: Personalness,
    pub intensify: Option<Intensify>,
}

impl GenerateRequest {
    pub fn new(messages: Vec<ChatTurn>, parameters: &GenerationParameters) -> Self {
        Self {
            messages,
            relationship: parameters.relationship,
            scenario: parameters.scenario,
            tone: parameters.tone,
            language: parameters.language.clone(),
            target_gender: parameters.target_gender,
            personalness: parameters.personalness,
            intensify: parameters.intensify,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOption {
    pub label: String,
    pub text: String,
}

impl ReplyOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    /// Locally unique key for listing options; not a global identity.
    pub fn display_key(&self) -> String {
        format!("{}{}", self.label, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generation identifier, echoed back in feedback.
    pub id: String,
    /// Detected or echoed language; `None` when the backend could not tell.
    pub language: Option<String>,
    pub options: Vec<ReplyOption>,
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub generation_id: String,
    pub chosen_label: Option<String>,
    pub chosen_text: Option<String>,
    pub liked: bool,
}

impl FeedbackRequest {
    pub fn new(generation_id: impl Into<String>, chosen: Option<&ReplyOption>) -> Self {
        Self {
            generation_id: generation_id.into(),
            chosen_label: chosen.map(|option| option.label.clone()),
            chosen_text: chosen.map(|option| option.text.clone()),
            liked: true,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    /// Server clock, unix seconds.
    pub ts: i64,
}

/// Body of `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_generations: u64,
    #[serde(default)]
    pub by_language: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_scenario: BTreeMap<String, u64>,
    pub conversion_rate_guess: f64,
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::transcript::Role;

    fn sample_request() -> GenerateRequest {
        GenerateRequest::new(
            vec![
                ChatTurn::new(Role::Partner, "why so quiet?"),
                ChatTurn::new(Role::User, "long day"),
            ],
            &GenerationParameters::default(),
        )
    }

    #[test]
    fn request_serializes_unset_options_as_null() {
        let value = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(
            value,
            json!({
                "messages": [
                    {"role": "partner", "text": "why so quiet?"},
                    {"role": "user", "text": "long day"},
                ],
                "relationship": "girlfriend",
                "scenario": "defuse_tension",
                "tone": "friendly",
                "language": null,
                "target_gender": null,
                "personalness": 55,
                "intensify": null,
            })
        );
    }

    #[test]
    fn request_round_trip_keeps_nulls_as_nulls() {
        let encoded = serde_json::to_string(&sample_request()).unwrap();
        let as_server_sees_it: Value = serde_json::from_str(&encoded).unwrap();
        for key in ["language", "target_gender", "intensify"] {
            assert_eq!(as_server_sees_it.get(key), Some(&Value::Null), "{key}");
        }

        let decoded: GenerateRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, sample_request());
        assert_eq!(decoded.language, None);
        assert_eq!(decoded.target_gender, None);
        assert_eq!(decoded.intensify, None);
    }

    #[test]
    fn request_carries_chosen_parameters() {
        let parameters = GenerationParameters {
            target_gender: Some(TargetGender::Male),
            intensify: Some(Intensify::Softer),
            ..GenerationParameters::default()
        }
        .with_language(Some("de".into()));
        let value = serde_json::to_value(GenerateRequest::new(Vec::new(), &parameters)).unwrap();

        assert_eq!(value["language"], "de");
        assert_eq!(value["target_gender"], "male");
        assert_eq!(value["intensify"], "softer");
    }

    #[test]
    fn feedback_without_choice_sends_nulls() {
        let value = serde_json::to_value(FeedbackRequest::new("gen-1", None)).unwrap();
        assert_eq!(
            value,
            json!({
                "generation_id": "gen-1",
                "chosen_label": null,
                "chosen_text": null,
                "liked": true,
            })
        );

        let option = ReplyOption::new("Friendly", "Sounds good!");
        let value = serde_json::to_value(FeedbackRequest::new("gen-1", Some(&option))).unwrap();
        assert_eq!(value["chosen_label"], "Friendly");
        assert_eq!(value["chosen_text"], "Sounds good!");
    }

    #[test]
    fn response_accepts_null_or_missing_language() {
        let with_null: GenerateResponse =
            serde_json::from_str(r#"{"id":"a","language":null,"options":[]}"#).unwrap();
        let missing: GenerateResponse =
            serde_json::from_str(r#"{"id":"a","options":[]}"#).unwrap();
        assert_eq!(with_null, missing);
        assert_eq!(with_null.language, None);
    }

    #[test]
    fn display_key_concatenates_label_and_text() {
        assert_eq!(ReplyOption::new("Bold", "Call me").display_key(), "BoldCall me");
    }
}
