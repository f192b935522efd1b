//! Pre-submission checklist.
//!
//! Every check runs against every record, in [`CHECKS`] order, whatever the
//! earlier checks found. A failing record is reported, never rejected here.

use std::sync::LazyLock;

use pgxanno_core::{
    AnnotationRecord, Biogeography, CandidateKind, CheckName, CheckResult, ResolveError,
    Significance, ValidationReport, Violation,
};
use regex::Regex;
use tracing::debug;

/// `Ok(detail)` when the check passes, else the violation.
pub type Check = fn(&AnnotationRecord) -> Result<String, Violation>;

pub const CHECKS: [(CheckName, Check); 8] = [
    (CheckName::RequiredFields, required_fields),
    (CheckName::PValueFormat, p_value_format),
    (CheckName::ComparisonPresent, comparison_present),
    (CheckName::BiogeographicGroup, biogeographic_group),
    (CheckName::InternalConsistency, internal_consistency),
    (CheckName::VariantFormat, variant_format),
    (CheckName::StudyStatistics, study_statistics),
    (CheckName::TermRecognition, term_recognition),
];

static P_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(<=|>=|<|>|=|≤|≥) [0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?$").expect("valid regex")
});
static RS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rs[0-9]+$").expect("valid regex"));
static STAR_ALLELE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]+\*[0-9]+").expect("valid regex"));
static GENE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9-]+$").expect("valid regex"));

/// Threshold for the ratio-of-one plausibility check.
const SIGNIFICANT_P: f64 = 0.05;

/// Run every check against `record`.
pub fn validate(record: &AnnotationRecord) -> ValidationReport {
    let checks = CHECKS
        .iter()
        .map(|(name, check)| match check(record) {
            Ok(detail) => CheckResult::pass(*name, detail),
            Err(violation) => {
                debug!(record_id = record.id(), check = name.as_str(), %violation, "check failed");
                CheckResult::fail(*name, violation)
            }
        })
        .collect();
    ValidationReport {
        record_id: record.id(),
        checks,
    }
}

// ── Checks ──

fn required_fields(record: &AnnotationRecord) -> Result<String, Violation> {
    let r = record.resolved();
    let present = [
        ("pmid", r.pmid.is_some()),
        ("variant_annotation_id", record.id() > 0),
        ("gene", r.gene.is_some()),
        ("variant_haplotypes", r.variant.is_some()),
    ];
    let missing: Vec<String> = present
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(field, _)| (*field).to_string())
        .collect();
    if missing.is_empty() {
        Ok("pmid, id, gene and variant present".to_string())
    } else {
        Err(Violation::MissingRequiredField { fields: missing })
    }
}

fn p_value_format(record: &AnnotationRecord) -> Result<String, Violation> {
    match record.resolved().study.p_value.as_deref() {
        None => Ok("not reported".to_string()),
        Some(p) if P_VALUE_RE.is_match(p) => Ok(p.to_string()),
        Some(p) => Err(Violation::FormatViolation {
            field: "p_value".to_string(),
            detail: format!("'{p}' is not '<operator> <number>'"),
        }),
    }
}

fn comparison_present(record: &AnnotationRecord) -> Result<String, Violation> {
    let r = record.resolved();
    let missing = r.issues.contains(&ResolveError::MissingComparison)
        || (r.association.asserts_effect() && r.comparison.is_none());
    if missing {
        return Err(Violation::MissingComparison);
    }
    Ok(match &r.comparison {
        Some(c) => format!("compared to {}", c.value),
        None => "no association asserted".to_string(),
    })
}

fn biogeographic_group(record: &AnnotationRecord) -> Result<String, Violation> {
    match &record.resolved().study.biogeography {
        Biogeography::Group { group } => Ok(group.clone()),
        Biogeography::NotStated => Ok("not stated".to_string()),
        Biogeography::Unmapped { terms, .. } => Err(Violation::UnmappedVocabularyTerm {
            term: terms.join(", "),
        }),
    }
}

fn internal_consistency(record: &AnnotationRecord) -> Result<String, Violation> {
    let r = record.resolved();
    if let Some(mismatch) = r
        .issues
        .iter()
        .find(|i| matches!(i, ResolveError::GeneMismatch { .. }))
    {
        return Err(Violation::Inconsistent {
            reason: mismatch.to_string(),
        });
    }
    let Some(direction) = r.direction else {
        return Ok("no direction of effect".to_string());
    };
    if r.significance == Significance::No {
        return Err(Violation::Inconsistent {
            reason: format!("direction '{}' given with significance 'no'", direction.as_str()),
        });
    }
    if !r.association.asserts_effect() {
        return Err(Violation::Inconsistent {
            reason: format!(
                "direction '{}' given with '{}'",
                direction.as_str(),
                r.association.as_str()
            ),
        });
    }
    Ok(format!(
        "{} with significance '{}'",
        direction.as_str(),
        r.significance.as_str()
    ))
}

fn variant_format(record: &AnnotationRecord) -> Result<String, Violation> {
    let r = record.resolved();
    if let Some(gene) = r.gene.as_deref()
        && !GENE_RE.is_match(gene)
    {
        return Err(Violation::FormatViolation {
            field: "gene".to_string(),
            detail: format!("'{gene}' is not an HGNC-style symbol"),
        });
    }

    let Some(variant) = &r.variant else {
        return Ok("no variant".to_string());
    };
    let (pattern, expected) = match variant.source {
        Some(CandidateKind::RsId) => (&*RS_ID_RE, "rs<digits>"),
        Some(CandidateKind::StarAllele) => (&*STAR_ALLELE_RE, "GENE*<digits>"),
        _ => return Ok(format!("{} not format-checked", variant.rule)),
    };
    match variant
        .value
        .split(", ")
        .find(|token| !pattern.is_match(token))
    {
        Some(bad) => Err(Violation::FormatViolation {
            field: "variant_haplotypes".to_string(),
            detail: format!("'{bad}' is not {expected}"),
        }),
        None => Ok(variant.value.clone()),
    }
}

fn study_statistics(record: &AnnotationRecord) -> Result<String, Violation> {
    let r = record.resolved();
    let s = &r.study;

    if let (Some(start), Some(stop)) = (s.ci_start, s.ci_stop) {
        if start >= stop {
            return Err(Violation::Inconsistent {
                reason: format!("CI start {start} is not below CI stop {stop}"),
            });
        }
        if let Some(ratio) = s.ratio_stat
            && !(start..=stop).contains(&ratio)
        {
            return Err(Violation::Inconsistent {
                reason: format!("ratio {ratio} lies outside CI {start}-{stop}"),
            });
        }
    }

    let significant = s
        .p_value
        .as_deref()
        .and_then(|p| crate::resolve::derive_significance(p, SIGNIFICANT_P))
        == Some(Significance::Yes);
    if significant && s.ratio_stat == Some(1.0) {
        return Err(Violation::Inconsistent {
            reason: "significant p-value with a ratio of exactly 1.0".to_string(),
        });
    }

    let frequencies = [
        ("cases", s.frequency_in_cases, s.study_cases),
        ("controls", s.frequency_in_controls, s.study_controls),
    ];
    for (arm, frequency, size) in frequencies {
        if let (Some(f), Some(_)) = (frequency, size)
            && !(0.0..=1.0).contains(&f)
        {
            return Err(Violation::Inconsistent {
                reason: format!("frequency in {arm} {f} is not between 0 and 1"),
            });
        }
    }

    if s.ratio_stat.is_none() && s.ci_start.is_none() && s.ci_stop.is_none() {
        Ok("no statistics reported".to_string())
    } else {
        Ok("statistics consistent".to_string())
    }
}

fn term_recognition(record: &AnnotationRecord) -> Result<String, Violation> {
    let unknown: Vec<String> = record
        .resolved()
        .issues
        .iter()
        .filter_map(|issue| match issue {
            ResolveError::UnrecognizedTerm { kind, value } => Some(format!("{kind} '{value}'")),
            ResolveError::MissingComparison | ResolveError::GeneMismatch { .. } => None,
        })
        .collect();
    if unknown.is_empty() {
        Ok("all terms recognised".to_string())
    } else {
        Err(Violation::UnmappedVocabularyTerm {
            term: unknown.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgxanno_core::{CandidateGroup, CandidateValue, Severity, Verdict, Vocabulary};

    use crate::assemble::{SequenceCounter, assemble};
    use crate::config::EngineConfig;
    use crate::resolve::resolve_group;

    fn record(candidates: &[(CandidateKind, &str)]) -> AnnotationRecord {
        let group = CandidateGroup {
            pmid: Some("39000001".into()),
            excerpt_ref: None,
            candidates: candidates
                .iter()
                .map(|(k, v)| CandidateValue::new(*k, *v))
                .collect(),
        };
        let resolved = resolve_group(&group, &Vocabulary::builtin(), &EngineConfig::default());
        assemble(resolved, &SequenceCounter::new())
    }

    fn complete() -> Vec<(CandidateKind, &'static str)> {
        vec![
            (CandidateKind::Gene, "SLCO1B1"),
            (CandidateKind::RsId, "rs4149056"),
            (CandidateKind::Genotype, "CC+CT"),
            (CandidateKind::ComparisonGenotype, "TT"),
            (CandidateKind::Drug, "simvastatin acid"),
            (CandidateKind::Direction, "increased"),
            (CandidateKind::PdPkTerm, "concentrations of"),
            (CandidateKind::PValue, "= 0.025"),
            (CandidateKind::PopulationTerm, "Caucasian"),
        ]
    }

    fn check(report: &ValidationReport, name: CheckName) -> &CheckResult {
        report.checks.iter().find(|c| c.check == name).unwrap()
    }

    #[test]
    fn complete_record_passes_every_check() {
        let report = validate(&record(&complete()));
        assert_eq!(report.checks.len(), 8);
        assert!(report.checks.iter().all(|c| c.passed), "{report:?}");
        assert_eq!(report.verdict(), Verdict::Pass);
    }

    #[test]
    fn checks_run_in_fixed_order() {
        let report = validate(&record(&[]));
        let order: Vec<_> = report.checks.iter().map(|c| c.check).collect();
        assert_eq!(order, CheckName::ALL.to_vec());
    }

    #[test]
    fn p_value_spacing() {
        let mut c = complete();
        c.retain(|(k, _)| *k != CandidateKind::PValue);
        c.push((CandidateKind::PValue, "=0.025"));
        let report = validate(&record(&c));
        let result = check(&report, CheckName::PValueFormat);
        assert!(!result.passed);
        assert_eq!(result.severity(), Some(Severity::Soft));
        assert_eq!(report.verdict(), Verdict::SoftFail);

        assert!(P_VALUE_RE.is_match("= 0.025"));
        assert!(P_VALUE_RE.is_match("< 1e-5"));
        assert!(P_VALUE_RE.is_match("≤ 0.05"));
        assert!(!P_VALUE_RE.is_match("0.025"));
        assert!(!P_VALUE_RE.is_match("p = 0.025"));
        assert!(!P_VALUE_RE.is_match("=  0.025"));
        // Arabic-Indic digits are not ASCII digits.
        assert!(!P_VALUE_RE.is_match("= ٠.٠٥"));
        assert!(!RS_ID_RE.is_match("rs٤١٤٩"));
    }

    #[test]
    fn absent_p_value_passes() {
        let mut c = complete();
        c.retain(|(k, _)| *k != CandidateKind::PValue);
        let report = validate(&record(&c));
        let result = check(&report, CheckName::PValueFormat);
        assert!(result.passed);
        assert_eq!(result.detail, "not reported");
    }

    #[test]
    fn missing_comparison_is_hard_fail() {
        let mut c = complete();
        c.retain(|(k, _)| *k != CandidateKind::ComparisonGenotype);
        let report = validate(&record(&c));
        let result = check(&report, CheckName::ComparisonPresent);
        assert_eq!(result.violation, Some(Violation::MissingComparison));
        assert_eq!(report.verdict(), Verdict::HardFail);
    }

    #[test]
    fn missing_required_fields() {
        let report = validate(&record(&[(CandidateKind::Drug, "warfarin")]));
        let result = check(&report, CheckName::RequiredFields);
        assert_eq!(
            result.violation,
            Some(Violation::MissingRequiredField {
                fields: vec!["gene".into(), "variant_haplotypes".into()]
            })
        );
        assert!(result.detail.contains("gene"));
        assert!(result.detail.contains("variant_haplotypes"));
        assert_eq!(report.verdict(), Verdict::HardFail);
        // Later checks still ran.
        assert_eq!(report.checks.len(), 8);
    }

    #[test]
    fn unmapped_population_fails_biogeography() {
        let mut c = complete();
        c.push((CandidateKind::PopulationTerm, "Atlantean"));
        let report = validate(&record(&c));
        let result = check(&report, CheckName::BiogeographicGroup);
        assert_eq!(
            result.violation,
            Some(Violation::UnmappedVocabularyTerm {
                term: "Atlantean".into()
            })
        );
    }

    #[test]
    fn direction_with_non_significance_is_advisory() {
        let mut c = complete();
        c.push((CandidateKind::Significance, "no"));
        c.push((CandidateKind::Association, "associated with"));
        let report = validate(&record(&c));
        let result = check(&report, CheckName::InternalConsistency);
        assert!(!result.passed);
        assert_eq!(result.severity(), Some(Severity::Advisory));
        assert_eq!(report.verdict(), Verdict::SoftFail);
    }

    #[test]
    fn direction_with_negative_association_is_advisory() {
        let mut c = complete();
        c.push((CandidateKind::Association, "not associated with"));
        let report = validate(&record(&c));
        assert!(!check(&report, CheckName::InternalConsistency).passed);
    }

    #[test]
    fn malformed_identifiers() {
        let mut c = complete();
        c.retain(|(k, _)| *k != CandidateKind::RsId);
        c.push((CandidateKind::RsId, "RS4149056"));
        let report = validate(&record(&c));
        assert!(!check(&report, CheckName::VariantFormat).passed);

        let report = validate(&record(&[
            (CandidateKind::Gene, "cyp2c19"),
            (CandidateKind::StarAllele, "*2"),
        ]));
        let result = check(&report, CheckName::VariantFormat);
        assert!(result.detail.contains("cyp2c19"), "{}", result.detail);

        let report = validate(&record(&[(CandidateKind::StarAllele, "CYP2C19*17")]));
        assert!(check(&report, CheckName::VariantFormat).passed);
    }

    #[test]
    fn study_statistics_plausibility() {
        let mut c = complete();
        c.extend([
            (CandidateKind::RatioStat, "2.1"),
            (CandidateKind::CiStart, "1.4"),
            (CandidateKind::CiStop, "3.2"),
        ]);
        assert!(check(&validate(&record(&c)), CheckName::StudyStatistics).passed);

        let mut bad_ci = complete();
        bad_ci.extend([(CandidateKind::CiStart, "3.2"), (CandidateKind::CiStop, "1.4")]);
        assert!(!check(&validate(&record(&bad_ci)), CheckName::StudyStatistics).passed);

        let mut outside = complete();
        outside.extend([
            (CandidateKind::RatioStat, "5.0"),
            (CandidateKind::CiStart, "1.4"),
            (CandidateKind::CiStop, "3.2"),
        ]);
        assert!(!check(&validate(&record(&outside)), CheckName::StudyStatistics).passed);

        let mut unity = complete();
        unity.push((CandidateKind::RatioStat, "1.0"));
        let report = validate(&record(&unity));
        let result = check(&report, CheckName::StudyStatistics);
        assert_eq!(result.severity(), Some(Severity::Advisory));
    }

    #[test]
    fn frequencies_must_be_proportions() {
        let mut c = complete();
        c.extend([
            (CandidateKind::StudyCases, "120"),
            (CandidateKind::FrequencyInCases, "0.42"),
            (CandidateKind::StudyControls, "240"),
            (CandidateKind::FrequencyInControls, "0.18"),
        ]);
        assert!(check(&validate(&record(&c)), CheckName::StudyStatistics).passed);

        let mut percent = complete();
        percent.extend([
            (CandidateKind::StudyControls, "240"),
            (CandidateKind::FrequencyInControls, "18"),
        ]);
        let report = validate(&record(&percent));
        let result = check(&report, CheckName::StudyStatistics);
        assert_eq!(result.severity(), Some(Severity::Advisory));
        assert!(result.detail.contains("controls"), "{}", result.detail);

        // Without a cohort size the frequency is not range-checked.
        let mut no_size = complete();
        no_size.push((CandidateKind::FrequencyInCases, "42"));
        assert!(check(&validate(&record(&no_size)), CheckName::StudyStatistics).passed);
    }

    #[test]
    fn metabolizer_gene_mismatch_is_advisory() {
        let report = validate(&record(&[
            (CandidateKind::Gene, "CYP2C19"),
            (CandidateKind::MetabolizerPhenotype, "CYP2D6 PM"),
            (CandidateKind::ComparisonMetabolizer, "NM"),
        ]));
        let result = check(&report, CheckName::InternalConsistency);
        assert_eq!(result.severity(), Some(Severity::Advisory));
        assert!(result.detail.contains("CYP2D6"), "{}", result.detail);
        assert!(check(&report, CheckName::TermRecognition).passed);
    }

    #[test]
    fn unrecognised_terms_are_reported() {
        let mut c = complete();
        c.push((CandidateKind::PhenotypeCategory, "vibes"));
        let report = validate(&record(&c));
        let result = check(&report, CheckName::TermRecognition);
        assert_eq!(
            result.violation,
            Some(Violation::UnmappedVocabularyTerm {
                term: "phenotype_category 'vibes'".into()
            })
        );
    }
}
