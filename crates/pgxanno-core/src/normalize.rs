//! Token normalisation for allele, genotype and vocabulary text.
//!
//! Extracted text is noisy: `"CC+CT"`, `"CC + CT"` and `"CC, CT"` all name
//! the same pair of genotypes, and `"Afro-Caribbean"` must match a table key
//! written `"afro caribbean"`. Everything that compares or renders such
//! tokens goes through this module.
//!
//! # Allele notation
//!
//! - Genotype: two bases (`CC`, `CT`) or a slash pair (`A/G`, `del/del`)
//! - Allele: a single base or indel marker (`T`, `del`, `ins`)
//! - Star allele: anything containing `*` (`*2`, `CYP2C19*17`, `*1/*3`)

/// Shape of a single allele/genotype token, used to pick the sentence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlleleForm {
    Genotype,
    Allele,
    StarAllele,
    Other,
}

/// Normalise a vocabulary key: lowercase, `-`/`_` to space, collapse runs of
/// whitespace, strip a trailing full stop.
///
/// `"  Afro-Caribbean. "` → `"afro caribbean"`
pub fn normalize_key(s: &str) -> String {
    let lowered = s.trim().trim_end_matches('.').to_lowercase();
    lowered
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a combined allele field into its tokens.
///
/// Separators are `+`, `,` and `;`. Whitespace around tokens is dropped.
///
/// `"CC+CT"` → `["CC", "CT"]`
pub fn split_alleles(s: &str) -> Vec<String> {
    s.split(['+', ',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join allele tokens in the canonical `" + "` form.
pub fn join_alleles<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<&str>>()
        .join(" + ")
}

/// Re-render a raw allele field canonically: `"CC+CT"` → `"CC + CT"`.
pub fn canonical_alleles(s: &str) -> String {
    join_alleles(&split_alleles(s))
}

/// Whether a canonical allele or variant field names more than one item.
///
/// Detected by the spaced `" + "` operator or a comma-joined list. A bare
/// `+` is not a separator here: intronic HGVS positions contain one
/// (`c.681+1G>A`).
pub fn is_multiple(s: &str) -> bool {
    s.contains(" + ") || s.contains(',')
}

fn is_base(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T')
}

fn is_indel(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "del" | "ins" | "-" | "dup")
}

/// Classify one allele token.
pub fn allele_form(token: &str) -> AlleleForm {
    let t = token.trim();
    if t.contains('*') {
        return AlleleForm::StarAllele;
    }
    if let Some((a, b)) = t.split_once('/') {
        let part_ok = |p: &str| {
            let p = p.trim();
            (p.len() == 1 && p.chars().all(is_base)) || is_indel(p) || p.chars().all(is_base)
        };
        if part_ok(a) && part_ok(b) && !a.trim().is_empty() && !b.trim().is_empty() {
            return AlleleForm::Genotype;
        }
        return AlleleForm::Other;
    }
    if t.len() == 2 && t.chars().all(is_base) {
        return AlleleForm::Genotype;
    }
    if (t.len() == 1 && t.chars().all(is_base)) || is_indel(t) {
        return AlleleForm::Allele;
    }
    AlleleForm::Other
}

/// Form shared by every token of a combined field, or `Other` when mixed.
pub fn field_form(s: &str) -> AlleleForm {
    let mut forms = split_alleles(s).into_iter().map(|t| allele_form(&t));
    let Some(first) = forms.next() else {
        return AlleleForm::Other;
    };
    if forms.all(|f| f == first) {
        first
    } else {
        AlleleForm::Other
    }
}

/// Parse a numeric statistic such as `"1.25"`, `"3.4e-5"` or `"2,500"`.
pub fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a cohort size such as `"120"` or `"1,024"`. Fractions and negative
/// numbers are rejected.
pub fn parse_count(s: &str) -> Option<u64> {
    let v = parse_numeric(s)?;
    (v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then_some(v as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_normalisation() {
        assert_eq!(normalize_key("  Afro-Caribbean. "), "afro caribbean");
        assert_eq!(normalize_key("Han   Chinese"), "han chinese");
        assert_eq!(normalize_key("poor_metabolizer"), "poor metabolizer");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn split_and_join() {
        assert_eq!(split_alleles("CC+CT"), vec!["CC", "CT"]);
        assert_eq!(split_alleles(" *1/*2 , *2/*2 "), vec!["*1/*2", "*2/*2"]);
        assert_eq!(split_alleles("A; G;"), vec!["A", "G"]);
        assert_eq!(canonical_alleles("CC+CT"), "CC + CT");
        assert_eq!(canonical_alleles("TT"), "TT");
    }

    #[test]
    fn multiplicity() {
        assert!(is_multiple("CC + CT"));
        assert!(is_multiple("CYP2C19*2, CYP2C19*3"));
        assert!(!is_multiple("TT"));
        assert!(!is_multiple("*1/*2"));
        assert!(!is_multiple("c.681+1G>A"));
        assert!(is_multiple("c.681+1G>A, c.-806C>T"));
    }

    #[test]
    fn token_forms() {
        assert_eq!(allele_form("CC"), AlleleForm::Genotype);
        assert_eq!(allele_form("ct"), AlleleForm::Genotype);
        assert_eq!(allele_form("A/G"), AlleleForm::Genotype);
        assert_eq!(allele_form("del/del"), AlleleForm::Genotype);
        assert_eq!(allele_form("T"), AlleleForm::Allele);
        assert_eq!(allele_form("del"), AlleleForm::Allele);
        assert_eq!(allele_form("*2"), AlleleForm::StarAllele);
        assert_eq!(allele_form("*1/*3"), AlleleForm::StarAllele);
        assert_eq!(allele_form("CYP2D6 poor metabolizer"), AlleleForm::Other);
    }

    #[test]
    fn mixed_field_is_other() {
        assert_eq!(field_form("CC + CT"), AlleleForm::Genotype);
        assert_eq!(field_form("A + G"), AlleleForm::Allele);
        assert_eq!(field_form("CC + T"), AlleleForm::Other);
        assert_eq!(field_form(""), AlleleForm::Other);
    }

    #[test]
    fn numeric_parsing() {
        assert_eq!(parse_numeric("1.25"), Some(1.25));
        assert_eq!(parse_numeric("3.4e-5"), Some(3.4e-5));
        assert_eq!(parse_numeric("2,500"), Some(2500.0));
        assert_eq!(parse_numeric("n/a"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn count_parsing() {
        assert_eq!(parse_count("120"), Some(120));
        assert_eq!(parse_count("1,024"), Some(1024));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count("-3"), None);
    }
}
