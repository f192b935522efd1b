//! Raw candidate values handed over by the extraction layer.
//!
//! Candidates arrive already located in source text; this crate never looks
//! at the article itself. Each value carries a `kind` tag saying which field
//! class it could fill, and the resolvers decide which candidate wins.

use serde::{Deserialize, Serialize};

/// Field class a raw extracted token may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    RsId,
    StarAllele,
    Hgvs,
    MetabolizerPhenotype,
    Genotype,
    PopulationTerm,
    PValue,
    FreeText,
    Gene,
    Drug,
    DrugOperator,
    ComparisonGenotype,
    ComparisonMetabolizer,
    Direction,
    Association,
    PdPkTerm,
    PhenotypeCategory,
    Significance,
    Disease,
    DiseaseOperator,
    AgeGroup,
    Gender,
    RatioStatType,
    RatioStat,
    CiStart,
    CiStop,
    FrequencyInCases,
    FrequencyInControls,
    StudyCases,
    StudyControls,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsId => "rs_id",
            Self::StarAllele => "star_allele",
            Self::Hgvs => "hgvs",
            Self::MetabolizerPhenotype => "metabolizer_phenotype",
            Self::Genotype => "genotype",
            Self::PopulationTerm => "population_term",
            Self::PValue => "p_value",
            Self::FreeText => "free_text",
            Self::Gene => "gene",
            Self::Drug => "drug",
            Self::DrugOperator => "drug_operator",
            Self::ComparisonGenotype => "comparison_genotype",
            Self::ComparisonMetabolizer => "comparison_metabolizer",
            Self::Direction => "direction",
            Self::Association => "association",
            Self::PdPkTerm => "pd_pk_term",
            Self::PhenotypeCategory => "phenotype_category",
            Self::Significance => "significance",
            Self::Disease => "disease",
            Self::DiseaseOperator => "disease_operator",
            Self::AgeGroup => "age_group",
            Self::Gender => "gender",
            Self::RatioStatType => "ratio_stat_type",
            Self::RatioStat => "ratio_stat",
            Self::CiStart => "ci_start",
            Self::CiStop => "ci_stop",
            Self::FrequencyInCases => "frequency_in_cases",
            Self::FrequencyInControls => "frequency_in_controls",
            Self::StudyCases => "study_cases",
            Self::StudyControls => "study_controls",
        }
    }
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw extracted token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateValue {
    pub kind: CandidateKind,
    pub value: String,
}

impl CandidateValue {
    pub fn new(kind: CandidateKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// All candidates found for one variant–drug association in a document.
///
/// Candidate order is the order they appeared in the source; resolvers that
/// join several values preserve it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateGroup {
    pub pmid: Option<String>,
    /// Opaque pointer back into the source text (section, sentence offset, ...).
    #[serde(default)]
    pub excerpt_ref: Option<String>,
    #[serde(default)]
    pub candidates: Vec<CandidateValue>,
}

impl CandidateGroup {
    /// Candidates of one kind, in source order, with blank values skipped.
    pub fn of_kind(&self, kind: CandidateKind) -> impl Iterator<Item = &CandidateValue> {
        self.candidates
            .iter()
            .filter(move |c| c.kind == kind && !c.value.trim().is_empty())
    }

    /// First non-blank value of the given kind, trimmed.
    pub fn first(&self, kind: CandidateKind) -> Option<&str> {
        self.of_kind(kind).next().map(|c| c.value.trim())
    }

    pub fn has(&self, kind: CandidateKind) -> bool {
        self.of_kind(kind).next().is_some()
    }
}

/// Document-level input: every candidate group found in one source article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub groups: Vec<CandidateGroup>,
}
