use snafu::ensure;

use crate::error::{
    EmptyTranscriptSnafu, GenerationInFlightSnafu, NoResponseSnafu, OptionOutOfRangeSnafu,
    SessionResult,
};
use crate::params::{GenerationParameters, Intensify};
use crate::transcript::{Transcript, parse_dialog};
use crate::wire::{GenerateRequest, GenerateResponse, ReplyOption};

/// Everything the front-end currently has selected: the transcript being built, the
/// generation parameters, and the outcome of the last generation.
///
/// A generation goes through [`Session::begin_generation`], the network call, then
/// [`Session::finish_generation`]. Only one may be in flight at a time.
#[derive(Debug, Clone, Default)]
pub struct Session {
    transcript: Transcript,
    parameters: GenerationParameters,
    last_response: Option<GenerateResponse>,
    last_error: Option<String>,
    in_flight: bool,
}

impl Session {
    pub fn new(parameters: GenerationParameters) -> Self {
        Self {
            parameters: parameters.normalized(),
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut GenerationParameters {
        &mut self.parameters
    }

    /// Replaces the whole transcript with the parsed paste. Returns the new turn count.
    pub fn paste(&mut self, raw: &str) -> usize {
        self.transcript.replace_with(parse_dialog(raw));
        self.transcript.len()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight
    }

    /// Whether the generate action should be enabled.
    pub fn can_generate(&self) -> bool {
        !self.in_flight && !self.transcript.is_empty()
    }

    /// Validates the session and snapshots it into a request.
    ///
    /// `intensify` replaces the current modifier: a plain generate passes `None`,
    /// "make softer"/"make edgier" pass theirs. The previous response and error are
    /// cleared so no stale options are shown while the call runs.
    pub fn begin_generation(
        &mut self,
        intensify: Option<Intensify>,
    ) -> SessionResult<GenerateRequest> {
        ensure!(
            !self.in_flight,
            GenerationInFlightSnafu {
                stage: "begin-generation",
            }
        );
        ensure!(
            !self.transcript.is_empty(),
            EmptyTranscriptSnafu {
                stage: "begin-generation",
            }
        );

        self.parameters.intensify = intensify;
        self.last_response = None;
        self.last_error = None;
        self.in_flight = true;

        Ok(GenerateRequest::new(
            self.transcript.turns().to_vec(),
            &self.parameters,
        ))
    }

    /// Records the outcome of the call started by [`Session::begin_generation`].
    /// Failures leave no partial result behind.
    pub fn finish_generation(&mut self, outcome: Result<GenerateResponse, String>) {
        self.in_flight = false;
        match outcome {
            Ok(response) => {
                self.last_response = Some(response);
                self.last_error = None;
            }
            Err(message) => {
                self.last_response = None;
                self.last_error = Some(message);
            }
        }
    }

    pub fn last_response(&self) -> Option<&GenerateResponse> {
        self.last_response.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Looks up an option of the last response by zero-based index.
    pub fn option(&self, index: usize) -> SessionResult<&ReplyOption> {
        let response = self.last_response.as_ref().ok_or_else(|| {
            NoResponseSnafu {
                stage: "select-option",
            }
            .build()
        })?;

        response.options.get(index).ok_or_else(|| {
            OptionOutOfRangeSnafu {
                stage: "select-option",
                index,
                count: response.options.len(),
            }
            .build()
        })
    }

    /// Generation id and chosen option to report when the user copies or uses an option.
    pub fn feedback_for(&self, index: usize) -> SessionResult<(String, ReplyOption)> {
        let option = self.option(index)?.clone();
        let generation_id = self
            .last_response
            .as_ref()
            .map(|response| response.id.clone())
            .unwrap_or_default();
        Ok((generation_id, option))
    }
}
