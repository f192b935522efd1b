//! Closed enumerations used in annotation fields.
//!
//! Serialised forms are the literal strings that appear in finished
//! annotations, so vocabulary files can name them directly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetabolizerType {
    #[serde(rename = "poor metabolizer")]
    Poor,
    #[serde(rename = "intermediate metabolizer")]
    Intermediate,
    #[serde(rename = "normal metabolizer")]
    Normal,
    #[serde(rename = "rapid metabolizer")]
    Rapid,
    #[serde(rename = "ultrarapid metabolizer")]
    Ultrarapid,
}

impl MetabolizerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "poor metabolizer",
            Self::Intermediate => "intermediate metabolizer",
            Self::Normal => "normal metabolizer",
            Self::Rapid => "rapid metabolizer",
            Self::Ultrarapid => "ultrarapid metabolizer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhenotypeCategory {
    Efficacy,
    Toxicity,
    Dosage,
    #[serde(rename = "Metabolism/PK")]
    MetabolismPk,
    #[serde(rename = "PD")]
    Pd,
    Other,
}

impl PhenotypeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Efficacy => "Efficacy",
            Self::Toxicity => "Toxicity",
            Self::Dosage => "Dosage",
            Self::MetabolismPk => "Metabolism/PK",
            Self::Pd => "PD",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Yes,
    No,
    #[serde(rename = "not stated")]
    NotStated,
}

impl Significance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::NotStated => "not stated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Association {
    #[serde(rename = "associated with")]
    Associated,
    #[serde(rename = "not associated with")]
    NotAssociated,
}

impl Association {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Associated => "associated with",
            Self::NotAssociated => "not associated with",
        }
    }

    pub fn asserts_effect(&self) -> bool {
        matches!(self, Self::Associated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
        }
    }
}

/// How multiple drugs (or diseases) in one annotation combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combination {
    And,
    Or,
}

impl Combination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "&" | "+" => Some(Self::And),
            "or" | "/" => Some(Self::Or),
            _ => None,
        }
    }
}
