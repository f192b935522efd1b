//! Standardised annotation sentence.
//!
//! Template:
//!
//! ```text
//! [Genotype/Allele] is/are [associated with/not associated with] [increased/decreased]
//!     [PD/PK term] [drug] [population context] as compared to [comparison].
//! ```
//!
//! The sentence is a pure function of the resolved fields. Any slot with no
//! value renders [`NULL_MARKER`], the population context included. The
//! direction slot only exists for positive associations.

use crate::normalize::{AlleleForm, field_form, is_multiple};
use crate::record::ResolvedAnnotation;
use crate::terms::Combination;

/// Rendered in place of a missing required slot.
pub const NULL_MARKER: &str = "<null>";

/// Render the sentence for a resolved annotation.
pub fn render_sentence(a: &ResolvedAnnotation) -> String {
    let subject = a.subject();
    let mut words: Vec<String> = Vec::with_capacity(10);

    words.push(subject.map_or_else(|| NULL_MARKER.to_string(), |s| labelled(s, true)));
    words.push(copula(subject).to_string());
    words.push(a.association.as_str().to_string());

    if a.association.asserts_effect() {
        words.push(slot(a.direction.map(|d| d.as_str())));
    }
    words.push(slot(a.pd_pk_term.as_deref()));
    words.push(slot(join_terms(&a.drugs, a.drug_operator).as_deref()));

    words.push(population_context(a).unwrap_or_else(|| NULL_MARKER.to_string()));

    words.push("as compared to".to_string());
    words.push(
        a.comparison
            .as_ref()
            .map_or_else(|| NULL_MARKER.to_string(), |c| labelled(&c.value, false)),
    );

    format!("{}.", words.join(" "))
}

fn slot(value: Option<&str>) -> String {
    value.unwrap_or(NULL_MARKER).to_string()
}

/// `is` for a single allele/genotype, `are` for a combined field.
fn copula(subject: Option<&str>) -> &'static str {
    match subject {
        Some(s) if is_multiple(s) => "are",
        _ => "is",
    }
}

/// Prefix genotype/allele fields with their label: `"Genotypes CC + CT"`,
/// `"allele T"`. Star alleles, rsIDs and metabolizer groups render bare.
fn labelled(value: &str, capitalised: bool) -> String {
    let noun = match field_form(value) {
        AlleleForm::Genotype => "genotype",
        AlleleForm::Allele => "allele",
        AlleleForm::StarAllele | AlleleForm::Other => return value.to_string(),
    };
    let plural = if is_multiple(value) { "s" } else { "" };
    let label = if capitalised {
        let mut chars = noun.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    } else {
        noun.to_string()
    };
    format!("{label}{plural} {value}")
}

/// Join drug or disease names: `a`, `a and b`, `a, b or c`.
///
/// Several items without an explicit operator join with `and`.
pub fn join_terms(items: &[String], op: Option<Combination>) -> Option<String> {
    let op = op.unwrap_or(Combination::And).as_str();
    match items {
        [] => None,
        [one] => Some(one.clone()),
        [init @ .., last] => Some(format!("{} {op} {last}", init.join(", "))),
    }
}

fn population_context(a: &ResolvedAnnotation) -> Option<String> {
    let noun = &a.population_noun;
    match join_terms(&a.diseases, a.disease_operator) {
        Some(diseases) => Some(format!("in {noun} with {diseases}")),
        None if a.specialty_population.is_some() => Some(format!("in {noun}")),
        None => None,
    }
}
