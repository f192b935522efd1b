//! Characteristics-type resolver.
//!
//! The first predicate whose candidate kind is present wins. Predicates are
//! checked in table order, never in the order terms appear in the source.

use pgxanno_core::{CandidateGroup, CandidateKind, ResolvedField};
use tracing::debug;

pub struct TypePredicate {
    pub rank: usize,
    pub kind: CandidateKind,
    pub label: &'static str,
}

pub const CHARACTERISTICS_RULES: [TypePredicate; 4] = [
    TypePredicate {
        rank: 1,
        kind: CandidateKind::Drug,
        label: "drug",
    },
    TypePredicate {
        rank: 2,
        kind: CandidateKind::Disease,
        label: "disease",
    },
    TypePredicate {
        rank: 3,
        kind: CandidateKind::AgeGroup,
        label: "age group",
    },
    TypePredicate {
        rank: 4,
        kind: CandidateKind::Gender,
        label: "gender",
    },
];

pub const STUDY_COHORT: &str = "Study Cohort";

/// Returns the deciding term (if any) and the characteristics type.
pub fn resolve_characteristics(group: &CandidateGroup) -> (Option<String>, ResolvedField) {
    for p in &CHARACTERISTICS_RULES {
        if let Some(term) = group.first(p.kind) {
            debug!(
                field = "characteristics_type",
                rule = p.label,
                rank = p.rank,
                "resolution rule fired"
            );
            return (
                Some(term.to_string()),
                ResolvedField::new(p.label, Some(p.kind), p.rank, p.label),
            );
        }
    }
    (
        None,
        ResolvedField::new(
            STUDY_COHORT,
            None,
            CHARACTERISTICS_RULES.len() + 1,
            "study_cohort",
        ),
    )
}
