//! SoQL query construction.
//!
//! Translates a [FilterMap] into the query string parameters understood by a Socrata
//! open data endpoint. Single valued fields become `field=value` equality parameters, while
//! multi-valued fields (stored as comma-joined strings) become `LIKE` clauses combined into a
//! single `$where` parameter.

use crate::models::{fields, FilterMap};

use url::Url;

/// Default ceiling on the number of records requested from the API.
pub const DEFAULT_RECORD_LIMIT: usize = 100_000;

/// A query against a Socrata endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoqlQuery {
    /// Exact match `field=value` parameters
    pub equals: Vec<(String, String)>,
    /// Substring match clauses, as `(field, value)` pairs
    pub contains: Vec<(String, String)>,
    /// Optional single column projection
    pub select: Option<String>,
    /// Maximum number of records to return
    pub limit: usize,
}

impl SoqlQuery {
    /// Return an unfiltered query.
    pub fn all(limit: usize) -> Self {
        SoqlQuery {
            limit,
            ..Default::default()
        }
    }

    /// Return an unfiltered query projecting a single column.
    pub fn select(field: &str, limit: usize) -> Self {
        SoqlQuery {
            select: Some(field.to_string()),
            limit,
            ..Default::default()
        }
    }

    /// Build a query from user filters.
    ///
    /// The "all" sentinel and unset values are skipped. A comma-separated value for a
    /// multi-valued field yields one substring clause per non-empty token.
    ///
    /// # Arguments
    ///
    /// * `filters`: Filters selected by the user
    /// * `limit`: Maximum number of records to return
    pub fn from_filters(filters: &FilterMap, limit: usize) -> Self {
        let mut query = Self::all(limit);
        for (field, value) in filters.iter_active() {
            if fields::is_multi_valued(field) {
                query.contains.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|token| !token.is_empty())
                        .map(|token| (field.to_string(), token.to_string())),
                );
            } else {
                query.equals.push((field.to_string(), value.to_string()));
            }
        }
        query
    }

    /// Returns the `$where` expression, if any substring clauses are present.
    pub fn where_clause(&self) -> Option<String> {
        if self.contains.is_empty() {
            return None;
        }
        let clauses: Vec<String> = self
            .contains
            .iter()
            .map(|(field, value)| format!("{} LIKE '%{}%'", field, escape_literal(value)))
            .collect();
        Some(clauses.join(" AND "))
    }

    /// Returns the URL for this query against the endpoint at `base`.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (field, value) in &self.equals {
                pairs.append_pair(field, value);
            }
            if let Some(select) = &self.select {
                pairs.append_pair("$select", select);
            }
            if let Some(where_clause) = self.where_clause() {
                pairs.append_pair("$where", &where_clause);
            }
            pairs.append_pair("$limit", &self.limit.to_string());
        }
        url
    }
}

/// Escape a SoQL string literal by doubling single quotes.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
