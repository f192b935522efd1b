//! Comparison (reference group) resolver.

use pgxanno_core::normalize::canonical_alleles;
use pgxanno_core::{Association, CandidateGroup, CandidateKind, ResolveError, ResolvedField};

use super::{Rule, RuleContext, apply_rules, metabolizer_group};

pub const COMPARISON_RULES: [Rule; 2] = [
    Rule {
        rank: 1,
        name: "comparison_genotype",
        kind: CandidateKind::ComparisonGenotype,
        separator: " + ",
        transform: canonical,
    },
    Rule {
        rank: 2,
        name: "comparison_metabolizer",
        kind: CandidateKind::ComparisonMetabolizer,
        separator: ", ",
        transform: metabolizer_group,
    },
];

/// Resolve the reference group.
///
/// An asserted association with no usable comparison candidate records
/// [`ResolveError::MissingComparison`]. No default is ever substituted.
pub fn resolve_comparison(
    group: &CandidateGroup,
    ctx: &RuleContext<'_>,
    association: Association,
    issues: &mut Vec<ResolveError>,
) -> Option<ResolvedField> {
    let field = apply_rules("comparison", &COMPARISON_RULES, group, ctx, issues);
    if field.is_none() && association.asserts_effect() {
        issues.push(ResolveError::MissingComparison);
    }
    field
}

fn canonical(value: &str, _: &RuleContext<'_>) -> Option<String> {
    let joined = canonical_alleles(value);
    (!joined.is_empty()).then_some(joined)
}
