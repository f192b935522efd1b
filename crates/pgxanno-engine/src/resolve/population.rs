//! Biogeographic group resolver.

use std::collections::BTreeSet;

use pgxanno_core::{Biogeography, CandidateGroup, CandidateKind, Vocabulary};

/// Group label used when mapped terms span more than one group.
pub const MULTIPLE_GROUPS: &str = "Multiple groups";

/// Map every `population_term` candidate through the vocabulary.
///
/// - Any unmapped term: [`Biogeography::Unmapped`] with the raw terms
///   unchanged, plus the groups the remaining terms mapped to.
/// - One distinct group: that group. Several: `Multiple groups`.
/// - No terms, or only "not stated" equivalents: [`Biogeography::NotStated`].
pub fn resolve_biogeography(group: &CandidateGroup, vocab: &Vocabulary) -> Biogeography {
    let mut groups = BTreeSet::new();
    let mut unmapped = Vec::new();

    for candidate in group.of_kind(CandidateKind::PopulationTerm) {
        let term = candidate.value.trim();
        if vocab.is_not_stated(term) {
            continue;
        }
        match vocab.biogeographic_group(term) {
            Some(g) => {
                groups.insert(g);
            }
            None => unmapped.push(term),
        }
    }

    if !unmapped.is_empty() {
        return Biogeography::Unmapped {
            groups: groups.into_iter().map(str::to_string).collect(),
            terms: unmapped.into_iter().map(str::to_string).collect(),
        };
    }
    let mut groups = groups.into_iter();
    match (groups.next(), groups.next()) {
        (None, _) => Biogeography::NotStated,
        (Some(only), None) => Biogeography::group(only),
        (Some(_), Some(_)) => Biogeography::group(MULTIPLE_GROUPS),
    }
}
