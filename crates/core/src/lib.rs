//! Domain model for TextSense: dialog transcripts, generation parameters, the wire
//! contract of the reply backend, and the front-end session state.

#[macro_use]
mod macros;

pub mod error;
pub mod params;
pub mod session;
pub mod transcript;
pub mod wire;

pub use error::{CoreError, CoreResult, SessionError, SessionResult};
pub use params::{
    GenerationParameters, Intensify, Personalness, Relationship, Scenario, TargetGender, Tone,
    normalize_language,
};
pub use session::Session;
pub use transcript::{ChatTurn, Role, Transcript, format_dialog, parse_dialog};
pub use wire::{
    FeedbackRequest, GenerateRequest, GenerateResponse, HealthStatus, ReplyOption, UsageStats,
};
