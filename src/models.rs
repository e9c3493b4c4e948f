//! Data types and associated functions and methods

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

/// Field names of the establishments dataset referenced by the views and filters.
pub mod fields {
    /// Legal nature of the service provider.
    pub const PRESTADOR_DE_SERVICIO: &str = "prestador_de_servicio";
    /// Ownership of the physical premises.
    pub const PROPIEDAD_PLANTA_FISICA: &str = "propiedad_planta_fisica";
    /// Comma-joined school schedules.
    pub const JORNADA: &str = "jornada";
    /// Comma-joined education levels.
    pub const NIVELES: &str = "niveles";
    /// Urban/rural classification.
    pub const ZONA: &str = "zona";
    /// Establishment type.
    pub const TIPO_ESTABLECIMIENTO: &str = "tipo_establecimiento";
    /// Year.
    pub const A_O: &str = "a_o";
    /// Education secretariat.
    pub const SECRETARIA: &str = "secretaria";

    /// Fields holding comma-joined values. These are filtered with a substring match rather
    /// than an exact match.
    pub const MULTI_VALUED: [&str; 2] = [JORNADA, NIVELES];

    /// Returns whether `field` holds comma-joined values.
    pub fn is_multi_valued(field: &str) -> bool {
        MULTI_VALUED.contains(&field)
    }
}

/// Sentinel filter value meaning "no constraint".
pub const ALL: &str = "all";

/// A single filter value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    /// The "all" sentinel
    All,
    /// Empty string, null, false or zero
    Unset,
    /// Any other scalar, stringified
    Value(String),
}

impl FilterValue {
    /// Returns the value to forward to the query, if any.
    pub fn as_active(&self) -> Option<&str> {
        match self {
            FilterValue::Value(value) => Some(value),
            FilterValue::All | FilterValue::Unset => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        match value {
            ALL => FilterValue::All,
            "" => FilterValue::Unset,
            value => FilterValue::Value(value.to_string()),
        }
    }
}

impl TryFrom<Value> for FilterValue {
    type Error = &'static str;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null | Value::Bool(false) => Ok(FilterValue::Unset),
            Value::Bool(true) => Ok(FilterValue::Value("true".to_string())),
            Value::Number(number) => match number.as_f64() {
                Some(float) if float == 0.0 => Ok(FilterValue::Unset),
                // Whole floats such as `2023.0` must match the dataset's `2023`.
                Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
                    Ok(FilterValue::Value((float as i64).to_string()))
                }
                _ => Ok(FilterValue::Value(number.to_string())),
            },
            Value::String(string) => Ok(FilterValue::from(string.as_str())),
            Value::Array(_) | Value::Object(_) => Err("must be a scalar value"),
        }
    }
}

/// Filters selected by the user, keyed by dataset field name.
///
/// Deserialises from a flat JSON object whose values are scalars.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(try_from = "BTreeMap<String, Value>")]
pub struct FilterMap(BTreeMap<String, FilterValue>);

impl FilterMap {
    /// Return an empty FilterMap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter, replacing any previous value for the field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style variant of [FilterMap::insert].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Returns the forwardable value for `field`, if any.
    pub fn active(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(FilterValue::as_active)
    }

    /// Iterate over forwardable filters in field name order.
    pub fn iter_active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(field, value)| value.as_active().map(|value| (field.as_str(), value)))
    }

    /// Iterate over all field names, including inactive ones.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl TryFrom<BTreeMap<String, Value>> for FilterMap {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(field, value)| match FilterValue::try_from(value) {
                Ok(value) => Ok((field, value)),
                Err(reason) => Err(format!("filter `{field}` {reason}")),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(FilterMap)
    }
}

impl<K, V> FromIterator<(K, V)> for FilterMap
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FilterMap(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

/// Validate a filter field name.
///
/// Field names end up in SoQL expressions, so only plain identifiers are accepted.
fn validate_field_name(field: &str) -> Result<(), ValidationError> {
    let mut chars = field.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        let mut error = ValidationError::new("Filter field names must be plain identifiers");
        error.add_param("field".into(), &field);
        return Err(error);
    }
    Ok(())
}

impl Validate for FilterMap {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in self.fields() {
            if let Err(error) = validate_field_name(field) {
                errors.add("filters", error);
            }
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A raw record as returned by the API.
///
/// No schema is enforced. Accessors only expose string values; null and non-string values are
/// treated as absent.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(serde_json::Map<String, Value>);

impl Record {
    /// Returns the string value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns the string value of `field` if present and not empty.
    pub fn get_non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|value| !value.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}
