//! Term matching for keyword rankings.

use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "did", "do", "does", "for", "from", "how",
    "in", "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "what", "when",
    "where", "which", "who", "why", "with",
];

/// Lower-cased alphanumeric terms of `text`, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Query terms, deduplicated in first-seen order.
#[derive(Debug, Clone)]
pub struct KeywordQuery {
    terms: Vec<String>,
}

impl KeywordQuery {
    pub fn parse(query: &str) -> Self {
        let mut seen = HashSet::new();
        let terms = tokenize(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of term occurrences in `fields`, or `None` when no term
    /// matches at all.
    pub fn score<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> Option<usize> {
        let mut hits = 0;
        let mut matched = false;

        for field in fields {
            for token in tokenize(field) {
                if self.terms.iter().any(|t| *t == token) {
                    hits += 1;
                    matched = true;
                }
            }
        }

        matched.then_some(hits)
    }
}

/// Rank `items` by keyword score, best first. Ties keep input order and
/// items without any match are dropped.
pub fn rank_by_keyword<T, F>(query: &KeywordQuery, items: Vec<T>, fields: F, limit: usize) -> Vec<T>
where
    F: Fn(&T) -> Vec<&str>,
{
    if query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, T)> = items
        .into_iter()
        .filter_map(|item| query.score(fields(&item)).map(|score| (score, item)))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, item)| item).collect()
}
