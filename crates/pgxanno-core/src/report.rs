//! Validation reports and the per-document batch result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::record::AnnotationRecord;

// ── Violations ──

/// How much a violation counts against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reported for review only.
    Advisory,
    /// Reported, record retained in valid output.
    Soft,
    /// Record excluded from valid output, retained in the report.
    Hard,
}

/// A failed check, with the reason carried as the error message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("missing required fields: {}", .fields.join(", "))]
    MissingRequiredField { fields: Vec<String> },

    #[error("{field} has invalid format: {detail}")]
    FormatViolation { field: String, detail: String },

    #[error("association asserted without a comparison allele, genotype or metabolizer group")]
    MissingComparison,

    #[error("unmapped vocabulary term: {term}")]
    UnmappedVocabularyTerm { term: String },

    #[error("flagged for review: {reason}")]
    Inconsistent { reason: String },
}

impl Violation {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingRequiredField { .. } | Self::MissingComparison => Severity::Hard,
            Self::FormatViolation { .. } | Self::UnmappedVocabularyTerm { .. } => Severity::Soft,
            Self::Inconsistent { .. } => Severity::Advisory,
        }
    }
}

// ── Checks ──

/// Validator checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    RequiredFields,
    PValueFormat,
    ComparisonPresent,
    BiogeographicGroup,
    InternalConsistency,
    VariantFormat,
    StudyStatistics,
    TermRecognition,
}

impl CheckName {
    pub const ALL: [CheckName; 8] = [
        Self::RequiredFields,
        Self::PValueFormat,
        Self::ComparisonPresent,
        Self::BiogeographicGroup,
        Self::InternalConsistency,
        Self::VariantFormat,
        Self::StudyStatistics,
        Self::TermRecognition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredFields => "required_fields",
            Self::PValueFormat => "p_value_format",
            Self::ComparisonPresent => "comparison_present",
            Self::BiogeographicGroup => "biogeographic_group",
            Self::InternalConsistency => "internal_consistency",
            Self::VariantFormat => "variant_format",
            Self::StudyStatistics => "study_statistics",
            Self::TermRecognition => "term_recognition",
        }
    }
}

impl std::fmt::Display for CheckName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check against one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub check: CheckName,
    pub passed: bool,
    /// Human-readable reason. Passing checks say what they saw.
    pub detail: String,
    /// The first violation that failed the check. `None` when passed.
    pub violation: Option<Violation>,
}

impl CheckResult {
    pub fn pass(check: CheckName, detail: impl Into<String>) -> Self {
        Self {
            check,
            passed: true,
            detail: detail.into(),
            violation: None,
        }
    }

    pub fn fail(check: CheckName, violation: Violation) -> Self {
        Self {
            check,
            passed: false,
            detail: violation.to_string(),
            violation: Some(violation),
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.violation.as_ref().map(Violation::severity)
    }
}

/// Overall outcome for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    SoftFail,
    HardFail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::SoftFail => "soft_fail",
            Self::HardFail => "hard_fail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub record_id: u64,
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    /// `HardFail` if any hard violation, `SoftFail` for soft or advisory
    /// only, else `Pass`.
    pub fn verdict(&self) -> Verdict {
        match self.checks.iter().filter_map(CheckResult::severity).max() {
            None => Verdict::Pass,
            Some(Severity::Hard) => Verdict::HardFail,
            Some(Severity::Soft | Severity::Advisory) => Verdict::SoftFail,
        }
    }

    pub fn failed_checks(&self) -> Vec<CheckName> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.check)
            .collect()
    }

    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.checks.iter().filter_map(|c| c.violation.as_ref())
    }
}

// ── Batch ──

/// A record paired with its validation report.
///
/// The verdict belongs to the pairing, not the record: records stay
/// immutable after assembly and are validated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub record: AnnotationRecord,
    pub report: ValidationReport,
}

impl BatchEntry {
    pub fn verdict(&self) -> Verdict {
        self.report.verdict()
    }
}

/// Aggregate verdict counts for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub soft_failed: usize,
    pub hard_failed: usize,
}

impl BatchSummary {
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a ValidationReport>) -> Self {
        let mut s = Self::default();
        for report in reports {
            s.total += 1;
            match report.verdict() {
                Verdict::Pass => s.passed += 1,
                Verdict::SoftFail => s.soft_failed += 1,
                Verdict::HardFail => s.hard_failed += 1,
            }
        }
        s
    }
}

/// Terminal result for one document: one entry per candidate group, in
/// input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentBatch {
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
    pub generated_at: DateTime<Utc>,
}

impl DocumentBatch {
    pub fn new(entries: Vec<BatchEntry>) -> Self {
        let summary = BatchSummary::from_reports(entries.iter().map(|e| &e.report));
        Self {
            entries,
            summary,
            generated_at: Utc::now(),
        }
    }

    /// Records that passed or only soft-failed.
    pub fn valid_records(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.entries
            .iter()
            .filter(|e| e.verdict() != Verdict::HardFail)
            .map(|e| &e.record)
    }
}
