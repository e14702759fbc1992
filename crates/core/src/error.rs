use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CoreError {
    #[snafu(display("turn index {index} is out of range for a transcript of {len} turns"))]
    IndexOutOfRange {
        stage: &'static str,
        index: usize,
        len: usize,
    },
    #[snafu(display("'{raw}' is not a known {kind}"))]
    UnknownVariant {
        stage: &'static str,
        kind: &'static str,
        raw: String,
    },
    #[snafu(display("personalness {value} is outside 0..=100"))]
    PersonalnessOutOfRange { stage: &'static str, value: i64 },
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by [`crate::Session`] before or after a generation round-trip.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("cannot generate replies from an empty transcript"))]
    EmptyTranscript { stage: &'static str },
    #[snafu(display("a generation is already in flight"))]
    GenerationInFlight { stage: &'static str },
    #[snafu(display("no reply options have been generated yet"))]
    NoResponse { stage: &'static str },
    #[snafu(display("option {index} does not exist, the last generation returned {count}"))]
    OptionOutOfRange {
        stage: &'static str,
        index: usize,
        count: usize,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;
