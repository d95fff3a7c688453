//! Catalogue search
//!
//! Two consumers share one matcher:
//! - the catalogue list filter, which keeps document order
//! - the search box suggestions, which need [`MIN_SUGGESTION_CHARS`]
//!   characters and rank name matches first
//!
//! Matching is case-insensitive: every whitespace-separated query term must
//! appear somewhere in the item's searchable text.

use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::region;
use crate::types::CatalogueItem;

/// Characters required before the search box offers suggestions
pub const MIN_SUGGESTION_CHARS: usize = 3;

/// Upper bound on suggestions returned for one query
pub const MAX_SUGGESTIONS: usize = 8;

/// A parsed, normalised query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    terms: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let terms = text.split_whitespace().map(str::to_string).collect();
        Self { text, terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Normalised query text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn matches(&self, item: &CatalogueItem) -> bool {
        let haystack = searchable_text(item);
        self.terms.iter().all(|term| haystack.contains(term.as_str()))
    }
}

/// Lower-cased text a query is matched against
fn searchable_text(item: &CatalogueItem) -> String {
    let mut parts: Vec<String> = vec![
        item.id.clone(),
        item.title(),
        item.description.clone(),
        item.organization.name.clone(),
        item.year_period.clone(),
    ];
    if let Some(kind) = &item.kind {
        parts.push(kind.to_string());
    }
    if let Some(region) = &item.country_region {
        parts.extend(region::spellings(region));
    }
    parts.join("\n").to_lowercase()
}

/// Items matching `raw`, in catalogue order. An empty query matches everything.
pub fn filter<'a>(catalogue: &'a Catalogue, raw: &str) -> Vec<&'a CatalogueItem> {
    let query = Query::parse(raw);
    catalogue
        .items()
        .iter()
        .filter(|item| query.is_empty() || query.matches(item))
        .collect()
}

/// An option offered by the search box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    /// Text shown in the option list
    pub label: String,
    /// Text the search input is populated with once selected
    pub value: String,
}

impl From<&CatalogueItem> for Suggestion {
    fn from(item: &CatalogueItem) -> Self {
        Self {
            id: item.id.clone(),
            label: item.title(),
            value: item.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    NamePrefix,
    NameContains,
    Other,
}

fn rank(query: &Query, item: &CatalogueItem) -> Rank {
    let name = item.name.to_lowercase();
    if name.starts_with(query.text()) {
        Rank::NamePrefix
    } else if name.contains(query.text()) {
        Rank::NameContains
    } else {
        Rank::Other
    }
}

/// Search box suggestions for `raw`
pub fn suggest(catalogue: &Catalogue, raw: &str) -> Vec<Suggestion> {
    let query = Query::parse(raw);
    if query.char_len() < MIN_SUGGESTION_CHARS {
        return Vec::new();
    }

    let mut ranked: Vec<(Rank, &CatalogueItem)> = catalogue
        .items()
        .iter()
        .filter(|item| query.matches(item))
        .map(|item| (rank(&query, item), item))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);

    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, item)| Suggestion::from(item))
        .collect()
}

/// Human text for a result count
pub fn result_summary(count: usize) -> String {
    if count == 1 {
        "1 result available".to_string()
    } else {
        format!("{} results available", count)
    }
}
