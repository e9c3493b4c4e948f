//! Category counting.

use hashbrown::HashMap;
use serde::Serialize;

/// Label standing in for a missing masculine category (e.g. provider, establishment type).
pub const NOT_SPECIFIED_M: &str = "NO ESPECIFICADO";
/// Label standing in for a missing feminine category (e.g. zone, schedule, ownership).
pub const NOT_SPECIFIED_F: &str = "NO ESPECIFICADA";

/// A category label and the number of times it was counted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

/// Counts occurrences of category labels, remembering the order in which labels were first seen.
#[derive(Debug, Default)]
pub struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<CategoryCount>,
}

impl Tally {
    /// Return an empty Tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `label`.
    pub fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push(CategoryCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    /// Returns the count for `label`, zero if never seen.
    pub fn get(&self, label: &str) -> u64 {
        self.index
            .get(label)
            .map_or(0, |&i| self.entries[i].count)
    }

    /// Returns the number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over labels in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Entries by descending count. Ties keep first-seen order.
    pub fn into_sorted_by_count(self) -> Vec<CategoryCount> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

/// Normalise a single valued category: trim and uppercase, falling back to `default` when
/// missing or blank.
pub fn single_value(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_uppercase(),
        _ => default.to_string(),
    }
}

/// Split a comma-joined value into trimmed, uppercased, non-empty tokens.
pub fn split_multi_value(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(|token| token.trim().to_uppercase())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(entries: &[CategoryCount]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn tally_counts() {
        let mut tally = Tally::new();
        assert!(tally.is_empty());
        for label in ["B", "A", "B", "C", "A", "B"] {
            tally.add(label);
        }
        assert_eq!(3, tally.len());
        assert_eq!(3, tally.get("B"));
        assert_eq!(2, tally.get("A"));
        assert_eq!(0, tally.get("Z"));
        assert_eq!(vec!["B", "A", "C"], tally.labels().collect::<Vec<_>>());
    }

    #[test]
    fn tally_sorted_by_count_is_stable() {
        let mut tally = Tally::new();
        for label in ["X", "Y", "Z", "Z"] {
            tally.add(label);
        }
        let entries = tally.into_sorted_by_count();
        assert_eq!(vec!["Z", "X", "Y"], labels(&entries));
        assert_eq!(vec![2, 1, 1], entries.iter().map(|e| e.count).collect::<Vec<_>>());
    }

    #[test]
    fn tally_labels_first_seen() {
        let mut tally = Tally::new();
        for label in ["PRIVADO", "OFICIAL", "PRIVADO", "COMUNITARIO"] {
            tally.add(label);
        }
        assert_eq!(
            vec!["PRIVADO", "OFICIAL", "COMUNITARIO"],
            tally.labels().collect::<Vec<_>>()
        );
    }

    #[test]
    fn single_value_normalisation() {
        assert_eq!("COLEGIO", single_value(Some("  colegio "), NOT_SPECIFIED_M));
        assert_eq!(NOT_SPECIFIED_M, single_value(Some("   "), NOT_SPECIFIED_M));
        assert_eq!(NOT_SPECIFIED_F, single_value(None, NOT_SPECIFIED_F));
    }

    #[test]
    fn split_multi_value_tokens() {
        let tokens: Vec<String> = split_multi_value("rural, URBANA ,, ").collect();
        assert_eq!(vec!["RURAL", "URBANA"], tokens);
        assert_eq!(0, split_multi_value(" , ").count());
    }
}
