//! Variant/haplotype resolver.
//!
//! Priority: rsID > star allele > HGVS > metabolizer phenotype. Only the
//! winning kind is emitted, so an rsID and the HGVS form of the same variant
//! never appear together.

use pgxanno_core::{CandidateGroup, CandidateKind, ResolveError, ResolvedField};

use super::{Rule, RuleContext, apply_rules, metabolizer_group, verbatim};

pub const VARIANT_RULES: [Rule; 4] = [
    Rule {
        rank: 1,
        name: "rs_id",
        kind: CandidateKind::RsId,
        separator: ", ",
        transform: verbatim,
    },
    Rule {
        rank: 2,
        name: "star_allele",
        kind: CandidateKind::StarAllele,
        separator: ", ",
        transform: gene_prefixed,
    },
    Rule {
        rank: 3,
        name: "hgvs",
        kind: CandidateKind::Hgvs,
        separator: ", ",
        transform: verbatim,
    },
    Rule {
        rank: 4,
        name: "metabolizer_phenotype",
        kind: CandidateKind::MetabolizerPhenotype,
        separator: ", ",
        transform: metabolizer_group,
    },
];

pub fn resolve_variant(
    group: &CandidateGroup,
    ctx: &RuleContext<'_>,
    issues: &mut Vec<ResolveError>,
) -> Option<ResolvedField> {
    apply_rules("variant", &VARIANT_RULES, group, ctx, issues)
}

/// `*2` → `CYP2C19*2`. Already-prefixed alleles are kept verbatim.
fn gene_prefixed(value: &str, ctx: &RuleContext<'_>) -> Option<String> {
    Some(match ctx.gene {
        Some(gene) if value.starts_with('*') => format!("{gene}{value}"),
        _ => value.to_string(),
    })
}
