/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    File contains the error type for verification checks.

--*/

use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VerifyError {
    /// A KAT file line could not be parsed
    Parse { line: usize, msg: String },

    /// Reading a KAT file failed
    Io(String),

    /// An operation result field disagreed with the reference model
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// An expected operation result was never observed
    MissingOperation,

    /// An operation result arrived with nothing left in the expected queue
    UnexpectedOperation,

    /// An expected round record was never observed
    MissingRound { index: usize },

    /// A round record arrived with nothing left in the expected queue
    UnexpectedRound { index: usize },

    /// A round record disagreed with the reference trace
    RoundMismatch {
        index: usize,
        layer: &'static str,
        /// Observed state XOR expected state
        diff_expected: [u64; 5],
        /// Observed state XOR the previous observed record's same layer
        diff_previous: [u64; 5],
    },
}

fn fmt_state(state: &[u64; 5]) -> String {
    state
        .iter()
        .map(|w| format!("{w:016x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Parse { line, msg } => write!(f, "KAT parse error at line {line}: {msg}"),
            VerifyError::Io(msg) => write!(f, "KAT read error: {msg}"),
            VerifyError::Mismatch {
                field,
                expected,
                actual,
            } => write!(f, "{field} mismatch: expected {expected}, got {actual}"),
            VerifyError::MissingOperation => write!(f, "expected operation result never observed"),
            VerifyError::UnexpectedOperation => write!(f, "observed operation result with empty expected queue"),
            VerifyError::MissingRound { index } => {
                write!(f, "expected round record {index} never observed")
            }
            VerifyError::UnexpectedRound { index } => {
                write!(f, "observed round record {index} with empty expected queue")
            }
            VerifyError::RoundMismatch {
                index,
                layer,
                diff_expected,
                diff_previous,
            } => write!(
                f,
                "round record {index} {layer} state mismatch: xor vs expected [{}], xor vs previous [{}]",
                fmt_state(diff_expected),
                fmt_state(diff_previous)
            ),
        }
    }
}

impl std::error::Error for VerifyError {}

impl From<std::io::Error> for VerifyError {
    fn from(err: std::io::Error) -> Self {
        VerifyError::Io(err.to_string())
    }
}
