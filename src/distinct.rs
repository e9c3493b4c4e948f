//! Distinct filter values.
//!
//! The filter selectors offer the distinct values of a few dataset fields. Values are derived
//! from a single column projection, falling back to an unfiltered fetch if that fails. If both
//! fail the field simply has no options.

use crate::chart::title_case;
use crate::error::DashboardError;
use crate::metrics::DISTINCT_FALLBACKS;
use crate::models::{fields, Record, ALL};
use crate::query::SoqlQuery;
use crate::source::RecordSource;
use crate::tally::split_multi_value;

use serde::Serialize;
use std::future::Future;

/// Run `primary`, and only if it fails, run `fallback`.
///
/// # Arguments
///
/// * `primary`: Preferred strategy
/// * `fallback`: Strategy to use if `primary` fails. Receives the primary error.
pub async fn with_fallback<T, P, F, Fut>(primary: P, fallback: F) -> Result<T, DashboardError>
where
    P: Future<Output = Result<T, DashboardError>>,
    F: FnOnce(DashboardError) -> Fut,
    Fut: Future<Output = Result<T, DashboardError>>,
{
    match primary.await {
        Ok(value) => Ok(value),
        Err(err) => fallback(err).await,
    }
}

/// How raw field values are turned into filter options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalisation {
    /// Trimmed, case preserved. For fields filtered by exact match.
    Exact,
    /// Split on commas, trimmed and uppercased. For comma-joined fields.
    MultiValue,
}

impl Normalisation {
    /// Returns the normalisation used for filter options of `field`.
    pub fn for_field(field: &str) -> Self {
        if fields::is_multi_valued(field) {
            Normalisation::MultiValue
        } else {
            Normalisation::Exact
        }
    }
}

/// Derive the sorted distinct values of `field` from records.
///
/// Missing, null and blank values are ignored.
pub fn derive_distinct(
    records: &[Record],
    field: &str,
    normalisation: Normalisation,
) -> Vec<String> {
    let mut values: Vec<String> = match normalisation {
        Normalisation::Exact => records
            .iter()
            .filter_map(|record| record.get(field))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect(),
        Normalisation::MultiValue => records
            .iter()
            .filter_map(|record| record.get(field))
            .flat_map(split_multi_value)
            .collect(),
    };
    values.sort();
    values.dedup();
    values
}

/// Returns the sorted distinct values of a field across the whole dataset.
///
/// Never fails: if both the projection and the fallback fetch fail, the result is empty.
///
/// # Arguments
///
/// * `source`: Source of records
/// * `field`: Field whose values to list
/// * `normalisation`: How raw values are normalised
#[tracing::instrument(level = "DEBUG", skip(source))]
pub async fn distinct_values(
    source: &dyn RecordSource,
    field: &str,
    normalisation: Normalisation,
) -> Vec<String> {
    let limit = source.record_limit();
    let primary = async {
        let query = SoqlQuery::select(field, limit);
        source.fetch(&query).await
    };
    let fallback = |err: DashboardError| async move {
        tracing::warn!(
            "Distinct {} values projection failed ({}), falling back to a full fetch",
            field,
            err
        );
        DISTINCT_FALLBACKS.with_label_values(&[field]).inc();
        source.fetch(&SoqlQuery::all(limit)).await
    };
    match with_fallback(primary, fallback).await {
        Ok(records) => {
            let values = derive_distinct(&records, field, normalisation);
            tracing::debug!("Found {} distinct {} values", values.len(), field);
            values
        }
        Err(err) => {
            tracing::error!("Failed to list distinct {} values: {}", field, err);
            vec![]
        }
    }
}

/// Distinct service providers.
pub async fn prestadores(source: &dyn RecordSource) -> Vec<String> {
    let field = fields::PRESTADOR_DE_SERVICIO;
    distinct_values(source, field, Normalisation::for_field(field)).await
}

/// Distinct school schedules.
pub async fn jornadas(source: &dyn RecordSource) -> Vec<String> {
    let field = fields::JORNADA;
    distinct_values(source, field, Normalisation::for_field(field)).await
}

/// Distinct education levels.
pub async fn niveles(source: &dyn RecordSource) -> Vec<String> {
    let field = fields::NIVELES;
    distinct_values(source, field, Normalisation::for_field(field)).await
}

/// Returns the display text for a filter value.
pub fn display_label(value: &str) -> String {
    match value {
        "BASICA PRIMARIA" => "Básica Primaria".to_string(),
        "BASICA SECUNDARIA" => "Básica Secundaria".to_string(),
        "FIN DE SEMANA" => "Fin de Semana".to_string(),
        "NO APLICA" => "No Aplica".to_string(),
        "NO ESPECIFICADO" => "No Especificado".to_string(),
        _ => title_case(value),
    }
}

/// A selectable filter value
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    /// Value sent back in the FilterMap
    pub value: String,
    /// Text to display
    pub label: String,
}

/// The options of one filter selector
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterSelector {
    /// Field filtered by this selector
    pub field: &'static str,
    /// Text of the "all" entry, whose value is the "all" sentinel
    pub all_label: &'static str,
    /// Value of the "all" entry
    pub all_value: &'static str,
    pub options: Vec<FilterOption>,
}

impl FilterSelector {
    fn new(field: &'static str, all_label: &'static str, values: Vec<String>) -> Self {
        let options = values
            .into_iter()
            .map(|value| FilterOption {
                label: display_label(&value),
                value,
            })
            .collect();
        FilterSelector {
            field,
            all_label,
            all_value: ALL,
            options,
        }
    }
}

/// Options for all filter selectors
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub prestador_de_servicio: FilterSelector,
    pub jornada: FilterSelector,
    pub niveles: FilterSelector,
}

impl FilterOptions {
    /// Load the options of all selectors concurrently.
    ///
    /// A field whose values cannot be listed gets no options; the others are unaffected.
    ///
    /// # Arguments
    ///
    /// * `source`: Source of records
    pub async fn load(source: &dyn RecordSource) -> Self {
        let (prestador_values, jornada_values, nivel_values) =
            tokio::join!(prestadores(source), jornadas(source), niveles(source));
        FilterOptions {
            prestador_de_servicio: FilterSelector::new(
                fields::PRESTADOR_DE_SERVICIO,
                "Todos los Prestadores",
                prestador_values,
            ),
            jornada: FilterSelector::new(fields::JORNADA, "Todas las Jornadas", jornada_values),
            niveles: FilterSelector::new(fields::NIVELES, "Todos los Niveles", nivel_values),
        }
    }
}
