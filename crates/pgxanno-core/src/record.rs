//! Resolved fields and the assembled annotation record.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateKind;
use crate::error::ResolveError;
use crate::sentence::render_sentence;
use crate::terms::{Association, Combination, Direction, PhenotypeCategory, Significance};

/// Canonical value for one field, plus which rule produced it.
///
/// Produced by exactly one resolver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    pub value: String,
    /// Candidate kind the value came from. `None` for fallback rules.
    pub source: Option<CandidateKind>,
    /// 1-based priority rank of the rule that won.
    pub rank: usize,
    pub rule: &'static str,
}

impl ResolvedField {
    pub fn new(
        value: impl Into<String>,
        source: Option<CandidateKind>,
        rank: usize,
        rule: &'static str,
    ) -> Self {
        Self {
            value: value.into(),
            source,
            rank,
            rule,
        }
    }
}

/// Standardised population ancestry for a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Biogeography {
    /// Every population term mapped; one standard group (or "Multiple groups").
    Group { group: String },
    /// No population terms, or only explicit "not stated" terms.
    NotStated,
    /// At least one term had no mapping. `terms` holds that raw text
    /// unchanged; `groups` holds what the other terms mapped to.
    Unmapped {
        groups: Vec<String>,
        terms: Vec<String>,
    },
}

impl Biogeography {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group { group: name.into() }
    }

    /// `group`, `not_stated` or `unmapped`.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Group { .. } => "group",
            Self::NotStated => "not_stated",
            Self::Unmapped { .. } => "unmapped",
        }
    }

    /// Value as written in the output column. For unmapped terms: mapped
    /// groups first, then the raw terms.
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            Self::Group { group } => Cow::Borrowed(group),
            Self::NotStated => Cow::Borrowed("not stated"),
            Self::Unmapped { groups, terms } => Cow::Owned(
                groups
                    .iter()
                    .chain(terms)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }
}

/// Study-level parameters attached to a variant annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyParameters {
    pub p_value: Option<String>,
    pub biogeography: Biogeography,
    /// The term that decided `characteristics_type`, if any.
    pub characteristics: Option<String>,
    pub characteristics_type: ResolvedField,
    pub ratio_stat_type: Option<String>,
    pub ratio_stat: Option<f64>,
    pub ci_start: Option<f64>,
    pub ci_stop: Option<f64>,
    pub frequency_in_cases: Option<f64>,
    pub frequency_in_controls: Option<f64>,
    /// Number of cases in the study cohort.
    pub study_cases: Option<u64>,
    pub study_controls: Option<u64>,
}

/// Every field resolved from one candidate group, ready for assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAnnotation {
    pub pmid: Option<String>,
    pub excerpt_ref: Option<String>,
    pub gene: Option<String>,
    pub variant: Option<ResolvedField>,
    /// Genotype/allele subject of the sentence, canonical `" + "` form.
    pub alleles: Option<String>,
    pub drugs: Vec<String>,
    pub drug_operator: Option<Combination>,
    pub comparison: Option<ResolvedField>,
    pub association: Association,
    pub direction: Option<Direction>,
    pub pd_pk_term: Option<String>,
    pub phenotype_category: Option<PhenotypeCategory>,
    pub significance: Significance,
    pub specialty_population: Option<String>,
    /// Population noun for the sentence ("people", "children", ...).
    pub population_noun: String,
    pub diseases: Vec<String>,
    pub disease_operator: Option<Combination>,
    pub study: StudyParameters,
    /// Problems captured during resolution, surfaced by the validator.
    pub issues: Vec<ResolveError>,
}

impl ResolvedAnnotation {
    /// Subject of the sentence: the allele field, or the variant when no
    /// genotype/allele candidate was supplied.
    pub fn subject(&self) -> Option<&str> {
        self.alleles
            .as_deref()
            .or(self.variant.as_ref().map(|v| v.value.as_str()))
    }
}

/// The unit of output: a resolved annotation with its sequential ID and
/// rendered sentence.
///
/// Fields are private so the sentence can never drift from the data it was
/// rendered from. The validation verdict is not stored here; it is read
/// through [`BatchEntry::verdict`](crate::report::BatchEntry::verdict).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRecord {
    id: u64,
    #[serde(flatten)]
    resolved: ResolvedAnnotation,
    sentence: String,
}

impl AnnotationRecord {
    /// Build a record, rendering its sentence from `resolved`.
    pub fn new(id: u64, resolved: ResolvedAnnotation) -> Self {
        let sentence = render_sentence(&resolved);
        Self {
            id,
            resolved,
            sentence,
        }
    }

    /// Variant Annotation ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn resolved(&self) -> &ResolvedAnnotation {
        &self.resolved
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn into_parts(self) -> (u64, ResolvedAnnotation) {
        (self.id, self.resolved)
    }
}
