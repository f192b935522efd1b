pub mod candidate;
pub mod error;
pub mod normalize;
pub mod record;
pub mod report;
pub mod schema;
pub mod sentence;
pub mod terms;
pub mod vocab;

pub use candidate::{CandidateGroup, CandidateKind, CandidateValue, DocumentInput};
pub use error::{ResolveError, VocabError};
pub use record::{AnnotationRecord, Biogeography, ResolvedAnnotation, ResolvedField, StudyParameters};
pub use report::{
    BatchEntry, BatchSummary, CheckName, CheckResult, DocumentBatch, Severity, ValidationReport,
    Verdict, Violation,
};
pub use schema::annotation_schema;
pub use sentence::{NULL_MARKER, render_sentence};
pub use terms::{Association, Combination, Direction, MetabolizerType, PhenotypeCategory, Significance};
pub use vocab::Vocabulary;
