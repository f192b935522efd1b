//! Vocabulary tables: static mappings from free extracted terms to the
//! standardised values used in finished annotations.
//!
//! Tables are plain data. The engine receives an `Arc<Vocabulary>` and never
//! mutates it, so resolvers running on several threads share one copy without
//! locking. A JSON file can extend or replace the built-in tables; see
//! [`Vocabulary::from_json`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::VocabError;
use crate::normalize::normalize_key;
use crate::terms::{Association, Direction, MetabolizerType, PhenotypeCategory, Significance};

/// Standardised biogeographic groups.
pub const BIOGEOGRAPHIC_GROUPS: &[&str] = &[
    "African American/Afro-Caribbean",
    "American",
    "Central/South Asian",
    "East Asian",
    "European",
    "Latino",
    "Near Eastern",
    "Oceanian",
    "Sub-Saharan African",
    "Multiple groups",
];

// ── Built-in population terms per group ──

const EAST_ASIAN: &[&str] = &[
    "east asian",
    "chinese",
    "han chinese",
    "japanese",
    "korean",
    "taiwanese",
    "vietnamese",
    "mongolian",
    "thai",
    "hong kong chinese",
];

const EUROPEAN: &[&str] = &[
    "european",
    "caucasian",
    "white",
    "white european",
    "northern european",
    "british",
    "german",
    "french",
    "italian",
    "spanish",
    "dutch",
    "finnish",
    "swedish",
    "norwegian",
    "danish",
    "polish",
    "russian",
];

const AFRICAN_AMERICAN: &[&str] = &[
    "african american",
    "afro caribbean",
    "black american",
    "african american/afro caribbean",
];

const SUB_SAHARAN_AFRICAN: &[&str] = &[
    "sub saharan african",
    "african",
    "black african",
    "nigerian",
    "kenyan",
    "ghanaian",
    "ethiopian",
    "south african",
    "yoruba",
];

const LATINO: &[&str] = &[
    "latino",
    "latina",
    "hispanic",
    "mexican",
    "mexican american",
    "puerto rican",
    "colombian",
];

const CENTRAL_SOUTH_ASIAN: &[&str] = &[
    "central/south asian",
    "south asian",
    "central asian",
    "indian",
    "pakistani",
    "bangladeshi",
    "sri lankan",
    "nepali",
];

const NEAR_EASTERN: &[&str] = &[
    "near eastern",
    "middle eastern",
    "arab",
    "egyptian",
    "iranian",
    "persian",
    "turkish",
    "lebanese",
    "saudi",
];

const OCEANIAN: &[&str] = &[
    "oceanian",
    "maori",
    "polynesian",
    "pacific islander",
    "aboriginal australian",
    "papua new guinean",
];

const AMERICAN: &[&str] = &[
    "native american",
    "american indian",
    "alaska native",
    "indigenous american",
    "inuit",
];

const MULTIPLE_GROUPS: &[&str] = &[
    "multiple groups",
    "multiethnic",
    "multi ethnic",
    "mixed ethnicity",
    "mixed",
];

/// Lookup tables, all keyed by [`normalize_key`] output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// population term → standardised biogeographic group
    #[serde(default)]
    pub biogeographic: BTreeMap<String, String>,
    /// population terms that explicitly mean "not stated"
    #[serde(default)]
    pub not_stated: BTreeSet<String>,
    #[serde(default)]
    pub metabolizer: BTreeMap<String, MetabolizerType>,
    #[serde(default)]
    pub phenotype_category: BTreeMap<String, PhenotypeCategory>,
    /// Ordered keyword → category pairs used to infer a category from a
    /// PD/PK term. First keyword contained in the term wins.
    #[serde(default)]
    pub pd_pk_keywords: Vec<(String, PhenotypeCategory)>,
    #[serde(default)]
    pub significance: BTreeMap<String, Significance>,
    #[serde(default)]
    pub direction: BTreeMap<String, Direction>,
    #[serde(default)]
    pub association: BTreeMap<String, Association>,
    /// age-group term → specialty population (`Pediatric`, `Geriatric`)
    #[serde(default)]
    pub specialty_population: BTreeMap<String, String>,
    /// specialty population → noun used in the sentence ("in children with ...")
    #[serde(default)]
    pub population_noun: BTreeMap<String, String>,
}

/// On-disk shape of a vocabulary override file.
#[derive(Deserialize)]
struct VocabFile {
    #[serde(default)]
    replace: bool,
    #[serde(flatten)]
    tables: Vocabulary,
}

/// Table sizes, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VocabSummary {
    pub biogeographic_terms: usize,
    pub distinct_groups: usize,
    pub not_stated_terms: usize,
    pub metabolizer_terms: usize,
    pub phenotype_category_terms: usize,
    pub pd_pk_keywords: usize,
    pub significance_terms: usize,
    pub direction_terms: usize,
    pub association_terms: usize,
    pub specialty_terms: usize,
}

fn entries<V: Clone>(pairs: &[(&str, V)]) -> BTreeMap<String, V> {
    pairs
        .iter()
        .map(|(k, v)| (normalize_key(k), v.clone()))
        .collect()
}

fn group_entries(groups: &[(&str, &[&str])]) -> BTreeMap<String, String> {
    groups
        .iter()
        .flat_map(|(group, terms)| {
            terms
                .iter()
                .map(move |t| (normalize_key(t), (*group).to_string()))
        })
        .collect()
}

impl Vocabulary {
    /// Built-in tables.
    pub fn builtin() -> Self {
        use Direction::*;
        use MetabolizerType::*;
        use PhenotypeCategory::*;

        let biogeographic = group_entries(&[
            ("East Asian", EAST_ASIAN),
            ("European", EUROPEAN),
            ("African American/Afro-Caribbean", AFRICAN_AMERICAN),
            ("Sub-Saharan African", SUB_SAHARAN_AFRICAN),
            ("Latino", LATINO),
            ("Central/South Asian", CENTRAL_SOUTH_ASIAN),
            ("Near Eastern", NEAR_EASTERN),
            ("Oceanian", OCEANIAN),
            ("American", AMERICAN),
            ("Multiple groups", MULTIPLE_GROUPS),
        ]);

        let not_stated = ["not stated", "unknown", "not reported", "unspecified", "n/a"]
            .iter()
            .map(|t| normalize_key(t))
            .collect();

        let metabolizer = entries(&[
            ("poor metabolizer", Poor),
            ("poor metaboliser", Poor),
            ("pm", Poor),
            ("intermediate metabolizer", Intermediate),
            ("intermediate metaboliser", Intermediate),
            ("im", Intermediate),
            ("normal metabolizer", Normal),
            ("normal metaboliser", Normal),
            ("extensive metabolizer", Normal),
            ("extensive metaboliser", Normal),
            ("nm", Normal),
            ("em", Normal),
            ("rapid metabolizer", Rapid),
            ("rapid metaboliser", Rapid),
            ("rm", Rapid),
            ("ultrarapid metabolizer", Ultrarapid),
            ("ultra rapid metabolizer", Ultrarapid),
            ("ultrarapid metaboliser", Ultrarapid),
            ("um", Ultrarapid),
        ]);

        let phenotype_category = entries(&[
            ("efficacy", Efficacy),
            ("toxicity", Toxicity),
            ("adverse drug reaction", Toxicity),
            ("dosage", Dosage),
            ("dose", Dosage),
            ("metabolism/pk", MetabolismPk),
            ("pk", MetabolismPk),
            ("pharmacokinetics", MetabolismPk),
            ("metabolism", MetabolismPk),
            ("pd", Pd),
            ("pharmacodynamics", Pd),
            ("other", Other),
        ]);

        let pd_pk_keywords = [
            ("concentration", MetabolismPk),
            ("clearance", MetabolismPk),
            ("exposure", MetabolismPk),
            ("auc", MetabolismPk),
            ("half life", MetabolismPk),
            ("metabolism", MetabolismPk),
            ("metabolic ratio", MetabolismPk),
            ("bioavailability", MetabolismPk),
            ("plasma level", MetabolismPk),
            ("dose", Dosage),
            ("toxicity", Toxicity),
            ("adverse", Toxicity),
            ("side effect", Toxicity),
            ("risk of", Toxicity),
            ("response", Efficacy),
            ("efficacy", Efficacy),
            ("remission", Efficacy),
        ]
        .iter()
        .map(|(k, v)| (normalize_key(k), *v))
        .collect();

        let significance = entries(&[
            ("yes", Significance::Yes),
            ("significant", Significance::Yes),
            ("statistically significant", Significance::Yes),
            ("no", Significance::No),
            ("not significant", Significance::No),
            ("non significant", Significance::No),
            ("ns", Significance::No),
            ("not stated", Significance::NotStated),
            ("unknown", Significance::NotStated),
        ]);

        let direction = entries(&[
            ("increased", Increased),
            ("increase", Increased),
            ("higher", Increased),
            ("elevated", Increased),
            ("greater", Increased),
            ("enhanced", Increased),
            ("more", Increased),
            ("decreased", Decreased),
            ("decrease", Decreased),
            ("lower", Decreased),
            ("reduced", Decreased),
            ("less", Decreased),
            ("diminished", Decreased),
        ]);

        let association = entries(&[
            ("associated with", Association::Associated),
            ("associated", Association::Associated),
            ("is associated with", Association::Associated),
            ("not associated with", Association::NotAssociated),
            ("not associated", Association::NotAssociated),
            ("is not associated with", Association::NotAssociated),
            ("no association", Association::NotAssociated),
        ]);

        let specialty_population = entries(&[
            ("pediatric", "Pediatric".to_string()),
            ("paediatric", "Pediatric".to_string()),
            ("children", "Pediatric".to_string()),
            ("child", "Pediatric".to_string()),
            ("infants", "Pediatric".to_string()),
            ("neonates", "Pediatric".to_string()),
            ("adolescents", "Pediatric".to_string()),
            ("geriatric", "Geriatric".to_string()),
            ("elderly", "Geriatric".to_string()),
            ("older adults", "Geriatric".to_string()),
        ]);

        let population_noun = [
            ("Pediatric".to_string(), "children".to_string()),
            ("Geriatric".to_string(), "elderly patients".to_string()),
        ]
        .into_iter()
        .collect();

        Self {
            biogeographic,
            not_stated,
            metabolizer,
            phenotype_category,
            pd_pk_keywords,
            significance,
            direction,
            association,
            specialty_population,
            population_noun,
        }
    }

    /// Load tables from JSON.
    ///
    /// By default the file's entries extend the built-in tables (file entries
    /// win on key clashes). With `"replace": true` the file is used alone.
    pub fn from_json(json: &str) -> Result<Self, VocabError> {
        let file: VocabFile = serde_json::from_str(json)?;
        let tables = file.tables.normalized()?;
        debug!(replace = file.replace, "vocabulary file parsed");
        if file.replace {
            return Ok(tables);
        }
        let mut merged = Self::builtin();
        merged.extend(tables);
        Ok(merged)
    }

    /// Re-key every table through [`normalize_key`] and reject blank entries.
    fn normalized(self) -> Result<Self, VocabError> {
        fn rekey<V>(
            table: &'static str,
            map: BTreeMap<String, V>,
        ) -> Result<BTreeMap<String, V>, VocabError> {
            map.into_iter()
                .map(|(k, v)| {
                    let key = normalize_key(&k);
                    if key.is_empty() {
                        Err(VocabError::EmptyEntry { table })
                    } else {
                        Ok((key, v))
                    }
                })
                .collect()
        }

        if self.biogeographic.values().any(|g| g.trim().is_empty()) {
            return Err(VocabError::EmptyEntry { table: "biogeographic" });
        }
        if self.specialty_population.values().any(|g| g.trim().is_empty()) {
            return Err(VocabError::EmptyEntry { table: "specialty_population" });
        }

        let mut pd_pk_keywords = Vec::with_capacity(self.pd_pk_keywords.len());
        for (k, v) in self.pd_pk_keywords {
            let key = normalize_key(&k);
            if key.is_empty() {
                return Err(VocabError::EmptyEntry { table: "pd_pk_keywords" });
            }
            pd_pk_keywords.push((key, v));
        }

        Ok(Self {
            biogeographic: rekey("biogeographic", self.biogeographic)?,
            not_stated: self
                .not_stated
                .iter()
                .map(|t| normalize_key(t))
                .filter(|t| !t.is_empty())
                .collect(),
            metabolizer: rekey("metabolizer", self.metabolizer)?,
            phenotype_category: rekey("phenotype_category", self.phenotype_category)?,
            pd_pk_keywords,
            significance: rekey("significance", self.significance)?,
            direction: rekey("direction", self.direction)?,
            association: rekey("association", self.association)?,
            specialty_population: rekey("specialty_population", self.specialty_population)?,
            population_noun: self.population_noun,
        })
    }

    fn extend(&mut self, other: Self) {
        self.biogeographic.extend(other.biogeographic);
        self.not_stated.extend(other.not_stated);
        self.metabolizer.extend(other.metabolizer);
        self.phenotype_category.extend(other.phenotype_category);
        // Override keywords take precedence over built-in ones.
        let mut keywords = other.pd_pk_keywords;
        keywords.append(&mut self.pd_pk_keywords);
        self.pd_pk_keywords = keywords;
        self.significance.extend(other.significance);
        self.direction.extend(other.direction);
        self.association.extend(other.association);
        self.specialty_population.extend(other.specialty_population);
        self.population_noun.extend(other.population_noun);
    }

    // ── Lookups ──

    pub fn biogeographic_group(&self, term: &str) -> Option<&str> {
        self.biogeographic.get(&normalize_key(term)).map(String::as_str)
    }

    pub fn is_not_stated(&self, term: &str) -> bool {
        self.not_stated.contains(&normalize_key(term))
    }

    /// Metabolizer type for a phenotype term. Accepts plurals ("poor metabolizers").
    pub fn metabolizer(&self, term: &str) -> Option<MetabolizerType> {
        let key = normalize_key(term);
        self.metabolizer
            .get(&key)
            .or_else(|| key.strip_suffix('s').and_then(|k| self.metabolizer.get(k)))
            .copied()
    }

    pub fn phenotype_category(&self, term: &str) -> Option<PhenotypeCategory> {
        self.phenotype_category.get(&normalize_key(term)).copied()
    }

    /// Infer a phenotype category from a PD/PK term such as "concentrations of".
    pub fn infer_category(&self, pd_pk_term: &str) -> Option<PhenotypeCategory> {
        let term = normalize_key(pd_pk_term);
        self.pd_pk_keywords
            .iter()
            .find(|(kw, _)| term.contains(kw.as_str()))
            .map(|(_, cat)| *cat)
    }

    pub fn significance(&self, term: &str) -> Option<Significance> {
        self.significance.get(&normalize_key(term)).copied()
    }

    pub fn direction(&self, term: &str) -> Option<Direction> {
        self.direction.get(&normalize_key(term)).copied()
    }

    pub fn association(&self, term: &str) -> Option<Association> {
        self.association.get(&normalize_key(term)).copied()
    }

    pub fn specialty_population(&self, term: &str) -> Option<&str> {
        self.specialty_population
            .get(&normalize_key(term))
            .map(String::as_str)
    }

    /// Noun for the population context; `"people"` when no specialty applies.
    pub fn population_noun(&self, specialty: Option<&str>) -> &str {
        specialty
            .and_then(|s| self.population_noun.get(s))
            .map(String::as_str)
            .unwrap_or("people")
    }

    pub fn summary(&self) -> VocabSummary {
        let distinct_groups: BTreeSet<&str> =
            self.biogeographic.values().map(String::as_str).collect();
        VocabSummary {
            biogeographic_terms: self.biogeographic.len(),
            distinct_groups: distinct_groups.len(),
            not_stated_terms: self.not_stated.len(),
            metabolizer_terms: self.metabolizer.len(),
            phenotype_category_terms: self.phenotype_category.len(),
            pd_pk_keywords: self.pd_pk_keywords.len(),
            significance_terms: self.significance.len(),
            direction_terms: self.direction.len(),
            association_terms: self.association.len(),
            specialty_terms: self.specialty_population.len(),
        }
    }
}
