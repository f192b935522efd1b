use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidate::CandidateKind;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("vocabulary JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty entry in vocabulary table '{table}'")]
    EmptyEntry { table: &'static str },
}

/// Problems found while resolving one candidate group.
///
/// These never abort a batch: the engine records them on the resolved
/// annotation and the validator turns them into report entries.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ResolveError {
    #[error("association asserted but no comparison genotype or metabolizer group was supplied")]
    MissingComparison,

    #[error("unrecognised {kind} term '{value}'")]
    UnrecognizedTerm { kind: CandidateKind, value: String },

    #[error("{kind} '{value}' names gene {found}, annotation gene is {gene}")]
    GeneMismatch {
        kind: CandidateKind,
        value: String,
        gene: String,
        found: String,
    },
}
