//! Search criteria

use std::fmt;

/// One independent matching rule contributing candidates to a search.
///
/// The declaration order is the merge order: results of earlier criteria
/// come first in the final list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchCriterion {
    ExactName(String),
    PartialName(String),
    Attribute(String),
    ItemName(String),
    ItemAttribute(String),
}

impl SearchCriterion {
    /// Every criterion for one free-text query, in merge order
    pub fn all_for(query: &str) -> Vec<Self> {
        let query = query.trim().to_string();

        vec![
            Self::ExactName(query.clone()),
            Self::PartialName(query.clone()),
            Self::Attribute(query.clone()),
            Self::ItemName(query.clone()),
            Self::ItemAttribute(query),
        ]
    }

    /// Position in the merge order
    pub fn rank(&self) -> u8 {
        match self {
            Self::ExactName(_) => 0,
            Self::PartialName(_) => 1,
            Self::Attribute(_) => 2,
            Self::ItemName(_) => 3,
            Self::ItemAttribute(_) => 4,
        }
    }

    pub fn query(&self) -> &str {
        match self {
            Self::ExactName(q)
            | Self::PartialName(q)
            | Self::Attribute(q)
            | Self::ItemName(q)
            | Self::ItemAttribute(q) => q,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ExactName(_) => "exact_name",
            Self::PartialName(_) => "partial_name",
            Self::Attribute(_) => "attribute",
            Self::ItemName(_) => "item_name",
            Self::ItemAttribute(_) => "item_attribute",
        }
    }

    /// Sorts by rank (stable for equal ranks) and drops exact duplicates
    pub fn normalize(criteria: &[SearchCriterion]) -> Vec<SearchCriterion> {
        let mut ordered: Vec<SearchCriterion> = Vec::with_capacity(criteria.len());

        for criterion in criteria {
            if !ordered.contains(criterion) {
                ordered.push(criterion.clone());
            }
        }

        ordered.sort_by_key(|c| c.rank());
        ordered
    }
}

impl fmt::Display for SearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label(), self.query())
    }
}
