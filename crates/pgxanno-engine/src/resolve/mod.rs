//! Field resolvers.
//!
//! Every ambiguous field class is resolved by an ordered table of [`Rule`]s
//! evaluated top to bottom. The first rule with a usable candidate wins, and
//! its rank and name are recorded on the [`ResolvedField`]. Keeping the
//! priority order as data means each table can be read and tested on its own.
//!
//! [`resolve_group`] runs every resolver over one candidate group and collects
//! the problems it finds as [`ResolveError`] issues. Nothing here fails: a
//! group always resolves to a [`ResolvedAnnotation`], and the validator
//! decides what the issues mean.

mod characteristics;
mod comparison;
mod population;
mod variant;

pub use characteristics::{CHARACTERISTICS_RULES, TypePredicate, resolve_characteristics};
pub use comparison::{COMPARISON_RULES, resolve_comparison};
pub use population::resolve_biogeography;
pub use variant::{VARIANT_RULES, resolve_variant};

use pgxanno_core::normalize::{join_alleles, parse_count, parse_numeric, split_alleles};
use pgxanno_core::{
    Association, CandidateGroup, CandidateKind, Combination, MetabolizerType, ResolveError,
    ResolvedAnnotation, ResolvedField, Significance, StudyParameters, Vocabulary,
};
use tracing::debug;

use crate::config::EngineConfig;

// ── Rule tables ──

/// Turns one trimmed candidate value into its canonical form, or `None`
/// when the value is not recognised.
pub type Transform = fn(&str, &RuleContext<'_>) -> Option<String>;

/// One row of a priority table.
pub struct Rule {
    /// 1-based priority; lower wins.
    pub rank: usize,
    pub name: &'static str,
    pub kind: CandidateKind,
    /// Joins several values of the winning kind, in source order.
    pub separator: &'static str,
    pub transform: Transform,
}

/// Read-only context available to every transform.
pub struct RuleContext<'a> {
    pub gene: Option<&'a str>,
    pub vocab: &'a Vocabulary,
}

/// Evaluate `rules` in order and return the first that produces a value.
///
/// Values a transform rejects become `UnrecognizedTerm` issues. A rule whose
/// candidates were all rejected does not fire.
pub(crate) fn apply_rules(
    field: &'static str,
    rules: &[Rule],
    group: &CandidateGroup,
    ctx: &RuleContext<'_>,
    issues: &mut Vec<ResolveError>,
) -> Option<ResolvedField> {
    for rule in rules {
        let mut values = Vec::new();
        for candidate in group.of_kind(rule.kind) {
            let raw = candidate.value.trim();
            match (rule.transform)(raw, ctx) {
                Some(v) => values.push(v),
                None => issues.push(ResolveError::UnrecognizedTerm {
                    kind: rule.kind,
                    value: raw.to_string(),
                }),
            }
        }
        if values.is_empty() {
            continue;
        }
        debug!(field, rule = rule.name, rank = rule.rank, "resolution rule fired");
        return Some(ResolvedField::new(
            values.join(rule.separator),
            Some(rule.kind),
            rule.rank,
            rule.name,
        ));
    }
    None
}

/// Candidate used unchanged.
pub(crate) fn verbatim(value: &str, _: &RuleContext<'_>) -> Option<String> {
    Some(value.to_string())
}

/// `"<gene> <metabolizer type>"`.
///
/// Accepts the type alone (`"PM"`, `"poor metabolizers"`) or prefixed with a
/// gene (`"CYP2D6 poor metabolizer"`). An embedded gene is kept as written;
/// the context gene only fills in when none is given.
pub(crate) fn metabolizer_group(value: &str, ctx: &RuleContext<'_>) -> Option<String> {
    let (embedded, kind) = split_metabolizer(value, ctx.vocab)?;
    Some(match embedded.or(ctx.gene) {
        Some(gene) => format!("{gene} {}", kind.as_str()),
        None => kind.as_str().to_string(),
    })
}

/// Split `"CYP2D6 PM"` into its embedded gene (if any) and metabolizer type.
fn split_metabolizer<'v>(
    value: &'v str,
    vocab: &Vocabulary,
) -> Option<(Option<&'v str>, MetabolizerType)> {
    if let Some(kind) = vocab.metabolizer(value) {
        return Some((None, kind));
    }
    let (head, rest) = value.split_once(char::is_whitespace)?;
    Some((Some(head), vocab.metabolizer(rest)?))
}

/// Metabolizer candidates that name a different gene than the annotation.
fn gene_mismatches(
    group: &CandidateGroup,
    ctx: &RuleContext<'_>,
    issues: &mut Vec<ResolveError>,
) {
    let Some(gene) = ctx.gene else {
        return;
    };
    for kind in [
        CandidateKind::MetabolizerPhenotype,
        CandidateKind::ComparisonMetabolizer,
    ] {
        for candidate in group.of_kind(kind) {
            let value = candidate.value.trim();
            if let Some((Some(found), _)) = split_metabolizer(value, ctx.vocab)
                && !found.eq_ignore_ascii_case(gene)
            {
                issues.push(ResolveError::GeneMismatch {
                    kind,
                    value: value.to_string(),
                    gene: gene.to_string(),
                    found: found.to_string(),
                });
            }
        }
    }
}

// ── Group resolution ──

/// Resolve every field of one candidate group.
pub fn resolve_group(
    group: &CandidateGroup,
    vocab: &Vocabulary,
    config: &EngineConfig,
) -> ResolvedAnnotation {
    let mut issues = Vec::new();

    let gene = resolve_gene(group);
    let ctx = RuleContext {
        gene: gene.as_deref(),
        vocab,
    };

    gene_mismatches(group, &ctx, &mut issues);
    let variant = resolve_variant(group, &ctx, &mut issues);
    let alleles = resolve_alleles(group);
    let (drugs, drug_operator) = resolve_combined(
        group,
        CandidateKind::Drug,
        CandidateKind::DrugOperator,
        &mut issues,
    );
    let (diseases, disease_operator) = resolve_combined(
        group,
        CandidateKind::Disease,
        CandidateKind::DiseaseOperator,
        &mut issues,
    );

    let p_value = group.first(CandidateKind::PValue).map(str::to_string);
    let significance = lookup(group, CandidateKind::Significance, &mut issues, |t| {
        vocab.significance(t)
    })
    .or_else(|| {
        p_value
            .as_deref()
            .and_then(|p| derive_significance(p, config.significance_threshold))
    })
    .unwrap_or(Significance::NotStated);

    let association = lookup(group, CandidateKind::Association, &mut issues, |t| {
        vocab.association(t)
    })
    .unwrap_or(match significance {
        Significance::No => Association::NotAssociated,
        Significance::Yes | Significance::NotStated => Association::Associated,
    });

    let direction = lookup(group, CandidateKind::Direction, &mut issues, |t| {
        vocab.direction(t)
    });
    let pd_pk_term = group.first(CandidateKind::PdPkTerm).map(str::to_string);
    let phenotype_category = lookup(group, CandidateKind::PhenotypeCategory, &mut issues, |t| {
        vocab.phenotype_category(t)
    })
    .or_else(|| pd_pk_term.as_deref().and_then(|t| vocab.infer_category(t)));

    let specialty_population = group
        .of_kind(CandidateKind::AgeGroup)
        .find_map(|c| vocab.specialty_population(&c.value))
        .map(str::to_string);
    let population_noun = vocab
        .population_noun(specialty_population.as_deref())
        .to_string();

    let comparison = resolve_comparison(group, &ctx, association, &mut issues);
    let (characteristics, characteristics_type) = resolve_characteristics(group);

    let study = StudyParameters {
        p_value,
        biogeography: resolve_biogeography(group, vocab),
        characteristics,
        characteristics_type,
        ratio_stat_type: group.first(CandidateKind::RatioStatType).map(str::to_string),
        ratio_stat: numeric(group, CandidateKind::RatioStat, &mut issues),
        ci_start: numeric(group, CandidateKind::CiStart, &mut issues),
        ci_stop: numeric(group, CandidateKind::CiStop, &mut issues),
        frequency_in_cases: numeric(group, CandidateKind::FrequencyInCases, &mut issues),
        frequency_in_controls: numeric(group, CandidateKind::FrequencyInControls, &mut issues),
        study_cases: count(group, CandidateKind::StudyCases, &mut issues),
        study_controls: count(group, CandidateKind::StudyControls, &mut issues),
    };

    ResolvedAnnotation {
        pmid: group.pmid.as_deref().map(str::trim).filter(|p| !p.is_empty()).map(str::to_string),
        excerpt_ref: group.excerpt_ref.clone(),
        gene,
        variant,
        alleles,
        drugs,
        drug_operator,
        comparison,
        association,
        direction,
        pd_pk_term,
        phenotype_category,
        significance,
        specialty_population,
        population_noun,
        diseases,
        disease_operator,
        study,
        issues,
    }
}

/// First `gene` candidate, else the prefix of the first `GENE*n` star allele.
fn resolve_gene(group: &CandidateGroup) -> Option<String> {
    if let Some(gene) = group.first(CandidateKind::Gene) {
        return Some(gene.to_string());
    }
    group
        .of_kind(CandidateKind::StarAllele)
        .find_map(|c| {
            let (prefix, _) = c.value.trim().split_once('*')?;
            let prefix = prefix.trim();
            (!prefix.is_empty()).then(|| prefix.to_string())
        })
}

/// Genotype candidates as one canonical `" + "` field.
fn resolve_alleles(group: &CandidateGroup) -> Option<String> {
    let tokens: Vec<String> = group
        .of_kind(CandidateKind::Genotype)
        .flat_map(|c| split_alleles(&c.value))
        .collect();
    (!tokens.is_empty()).then(|| join_alleles(&tokens))
}

/// Items of `kind` in source order plus their combination operator.
///
/// The operator is only kept for two or more items and defaults to `and`.
fn resolve_combined(
    group: &CandidateGroup,
    kind: CandidateKind,
    operator_kind: CandidateKind,
    issues: &mut Vec<ResolveError>,
) -> (Vec<String>, Option<Combination>) {
    let items: Vec<String> = group
        .of_kind(kind)
        .map(|c| c.value.trim().to_string())
        .collect();
    let explicit = lookup(group, operator_kind, issues, Combination::parse);
    let operator = if items.len() >= 2 {
        Some(explicit.unwrap_or(Combination::And))
    } else {
        None
    };
    (items, operator)
}

/// Look up the first candidate of `kind`; an unknown value becomes an issue.
fn lookup<T>(
    group: &CandidateGroup,
    kind: CandidateKind,
    issues: &mut Vec<ResolveError>,
    find: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = group.first(kind)?;
    let found = find(raw);
    if found.is_none() {
        issues.push(ResolveError::UnrecognizedTerm {
            kind,
            value: raw.to_string(),
        });
    }
    found
}

fn numeric(
    group: &CandidateGroup,
    kind: CandidateKind,
    issues: &mut Vec<ResolveError>,
) -> Option<f64> {
    lookup(group, kind, issues, parse_numeric)
}

fn count(
    group: &CandidateGroup,
    kind: CandidateKind,
    issues: &mut Vec<ResolveError>,
) -> Option<u64> {
    lookup(group, kind, issues, parse_count)
}

// ── P-values ──

/// Comparison operator of a reported p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PComparator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

/// Leniently split a p-value such as `"< 0.001"`, `"=0.025"` or `"0.03"`
/// into operator and number. A bare number reads as `=`.
///
/// Strict format checking is the validator's job.
pub fn parse_p_value(text: &str) -> Option<(PComparator, f64)> {
    const OPERATORS: [(&str, PComparator); 7] = [
        ("<=", PComparator::Le),
        (">=", PComparator::Ge),
        ("≤", PComparator::Le),
        ("≥", PComparator::Ge),
        ("<", PComparator::Lt),
        (">", PComparator::Gt),
        ("=", PComparator::Eq),
    ];
    let text = text.trim();
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|(sym, op)| text.strip_prefix(*sym).map(|rest| (*op, rest)))
        .unwrap_or((PComparator::Eq, text));
    parse_numeric(rest).map(|v| (op, v))
}

/// Significance implied by a p-value, if the bound decides it.
///
/// `< 0.1` against a 0.05 threshold decides nothing and yields `None`.
pub fn derive_significance(p_value: &str, threshold: f64) -> Option<Significance> {
    let (op, value) = parse_p_value(p_value)?;
    match op {
        PComparator::Lt | PComparator::Le | PComparator::Eq if value <= threshold => {
            Some(Significance::Yes)
        }
        PComparator::Eq | PComparator::Gt | PComparator::Ge if value >= threshold => {
            Some(Significance::No)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgxanno_core::{CandidateValue, Direction, PhenotypeCategory};

    fn group(candidates: &[(CandidateKind, &str)]) -> CandidateGroup {
        CandidateGroup {
            pmid: Some("39000001".into()),
            excerpt_ref: None,
            candidates: candidates
                .iter()
                .map(|(k, v)| CandidateValue::new(*k, *v))
                .collect(),
        }
    }

    fn resolve(candidates: &[(CandidateKind, &str)]) -> ResolvedAnnotation {
        resolve_group(
            &group(candidates),
            &Vocabulary::builtin(),
            &EngineConfig::default(),
        )
    }

    #[test]
    fn p_value_parsing() {
        assert_eq!(parse_p_value("< 0.001"), Some((PComparator::Lt, 0.001)));
        assert_eq!(parse_p_value("=0.025"), Some((PComparator::Eq, 0.025)));
        assert_eq!(parse_p_value("≤ 0.05"), Some((PComparator::Le, 0.05)));
        assert_eq!(parse_p_value("0.3"), Some((PComparator::Eq, 0.3)));
        assert_eq!(parse_p_value("ns"), None);
    }

    #[test]
    fn significance_from_p_value() {
        assert_eq!(derive_significance("< 0.001", 0.05), Some(Significance::Yes));
        assert_eq!(derive_significance("= 0.05", 0.05), Some(Significance::Yes));
        assert_eq!(derive_significance("= 0.2", 0.05), Some(Significance::No));
        assert_eq!(derive_significance("> 0.05", 0.05), Some(Significance::No));
        assert_eq!(derive_significance("< 0.1", 0.05), None);
        assert_eq!(derive_significance("> 0.01", 0.05), None);
    }

    #[test]
    fn gene_from_star_allele_prefix() {
        let r = resolve(&[(CandidateKind::StarAllele, "CYP2C19*2")]);
        assert_eq!(r.gene.as_deref(), Some("CYP2C19"));

        let r = resolve(&[
            (CandidateKind::StarAllele, "CYP2C19*2"),
            (CandidateKind::Gene, "ABCB1"),
        ]);
        assert_eq!(r.gene.as_deref(), Some("ABCB1"));
    }

    #[test]
    fn genotype_candidates_are_canonicalised() {
        let r = resolve(&[
            (CandidateKind::Genotype, "CC+CT"),
            (CandidateKind::Genotype, "TT"),
        ]);
        assert_eq!(r.alleles.as_deref(), Some("CC + CT + TT"));
    }

    #[test]
    fn drug_operator_defaults_to_and() {
        let r = resolve(&[
            (CandidateKind::Drug, "warfarin"),
            (CandidateKind::Drug, "acenocoumarol"),
        ]);
        assert_eq!(r.drugs, vec!["warfarin", "acenocoumarol"]);
        assert_eq!(r.drug_operator, Some(Combination::And));

        let r = resolve(&[
            (CandidateKind::Drug, "warfarin"),
            (CandidateKind::DrugOperator, "or"),
        ]);
        assert_eq!(r.drug_operator, None);
    }

    #[test]
    fn association_follows_significance() {
        let r = resolve(&[(CandidateKind::PValue, "= 0.41")]);
        assert_eq!(r.significance, Significance::No);
        assert_eq!(r.association, Association::NotAssociated);

        let r = resolve(&[
            (CandidateKind::PValue, "= 0.41"),
            (CandidateKind::Association, "associated with"),
        ]);
        assert_eq!(r.association, Association::Associated);

        let r = resolve(&[]);
        assert_eq!(r.significance, Significance::NotStated);
        assert_eq!(r.association, Association::Associated);
    }

    #[test]
    fn category_inferred_from_pd_pk_term() {
        let r = resolve(&[(CandidateKind::PdPkTerm, "concentrations of")]);
        assert_eq!(r.phenotype_category, Some(PhenotypeCategory::MetabolismPk));

        let r = resolve(&[
            (CandidateKind::PdPkTerm, "concentrations of"),
            (CandidateKind::PhenotypeCategory, "toxicity"),
        ]);
        assert_eq!(r.phenotype_category, Some(PhenotypeCategory::Toxicity));
    }

    #[test]
    fn unknown_terms_become_issues() {
        let r = resolve(&[
            (CandidateKind::Direction, "sideways"),
            (CandidateKind::RatioStat, "n/a"),
        ]);
        assert_eq!(r.direction, None);
        assert_eq!(r.study.ratio_stat, None);
        assert!(r.issues.contains(&ResolveError::UnrecognizedTerm {
            kind: CandidateKind::Direction,
            value: "sideways".into(),
        }));
        assert!(r.issues.contains(&ResolveError::UnrecognizedTerm {
            kind: CandidateKind::RatioStat,
            value: "n/a".into(),
        }));
    }

    #[test]
    fn direction_synonyms() {
        let r = resolve(&[(CandidateKind::Direction, "Higher")]);
        assert_eq!(r.direction, Some(Direction::Increased));
    }

    #[test]
    fn age_group_sets_specialty_population() {
        let r = resolve(&[(CandidateKind::AgeGroup, "children")]);
        assert_eq!(r.specialty_population.as_deref(), Some("Pediatric"));
        assert_eq!(r.population_noun, "children");

        let r = resolve(&[]);
        assert_eq!(r.specialty_population, None);
        assert_eq!(r.population_noun, "people");
    }

    #[test]
    fn study_counts_and_frequencies() {
        let r = resolve(&[
            (CandidateKind::StudyCases, "1,024"),
            (CandidateKind::StudyControls, "12.5"),
            (CandidateKind::FrequencyInCases, "0.31"),
        ]);
        assert_eq!(r.study.study_cases, Some(1024));
        assert_eq!(r.study.study_controls, None);
        assert_eq!(r.study.frequency_in_cases, Some(0.31));
        assert!(r.issues.contains(&ResolveError::UnrecognizedTerm {
            kind: CandidateKind::StudyControls,
            value: "12.5".into(),
        }));
    }

    #[test]
    fn embedded_gene_is_kept_and_mismatch_recorded() {
        let r = resolve(&[
            (CandidateKind::Gene, "CYP2C19"),
            (CandidateKind::MetabolizerPhenotype, "CYP2D6 poor metabolizer"),
        ]);
        assert_eq!(
            r.variant.as_ref().map(|v| v.value.as_str()),
            Some("CYP2D6 poor metabolizer")
        );
        assert_eq!(
            r.issues,
            vec![
                ResolveError::GeneMismatch {
                    kind: CandidateKind::MetabolizerPhenotype,
                    value: "CYP2D6 poor metabolizer".into(),
                    gene: "CYP2C19".into(),
                    found: "CYP2D6".into(),
                },
                ResolveError::MissingComparison,
            ]
        );

        let r = resolve(&[
            (CandidateKind::Gene, "CYP2D6"),
            (CandidateKind::MetabolizerPhenotype, "cyp2d6 PM"),
            (CandidateKind::ComparisonMetabolizer, "NM"),
        ]);
        assert!(r.issues.is_empty(), "{:?}", r.issues);
        assert_eq!(
            r.comparison.as_ref().map(|c| c.value.as_str()),
            Some("CYP2D6 normal metabolizer")
        );
    }

    #[test]
    fn blank_pmid_is_missing() {
        let mut g = group(&[]);
        g.pmid = Some("  ".into());
        let r = resolve_group(&g, &Vocabulary::builtin(), &EngineConfig::default());
        assert_eq!(r.pmid, None);
    }
}
