///! Query matching over in-memory datasets

use cafisearch_common::Place;

/// Which fields of a place a query is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFields {
    /// Name or address
    NameAddress,
    /// Name, address, or category when present
    NameAddressCategory,
}

/// Lowercased query, compared by plain substring containment.
///
/// No normalization beyond lowercase: diacritics, Persian/Arabic letter
/// variants and whitespace are compared as-is.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    needle: String,
    fields: MatchFields,
}

impl QueryMatcher {
    pub fn new(query: &str, fields: MatchFields) -> Self {
        Self {
            needle: query.to_lowercase(),
            fields,
        }
    }

    pub fn matches(&self, place: &Place) -> bool {
        self.contains(&place.name)
            || self.contains(&place.address)
            || (self.fields == MatchFields::NameAddressCategory
                && place.category.as_deref().is_some_and(|c| self.contains(c)))
    }

    fn contains(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    /// First `limit` matches, in dataset order
    pub fn filter(&self, places: &[Place], limit: usize) -> Vec<Place> {
        places
            .iter()
            .filter(|place| self.matches(place))
            .take(limit)
            .cloned()
            .collect()
    }
}
