//! Views: the contract between the fetch layer and the charting surface.
//!
//! Each view aggregates the records matching the user's filters into a [ChartSpec]. Views never
//! fail: fetch errors and empty results are reported through the [RenderOutcome] description.

use crate::chart::{format_count, title_case, ChartSpec};
use crate::error::DashboardError;
use crate::models::{fields, FilterMap, Record};
use crate::source::RecordSource;
use crate::views;

use serde::Serialize;
use std::str::FromStr;
use strum_macros::Display;

/// The available views
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize)]
pub enum ViewKind {
    #[strum(serialize = "zonas")]
    #[serde(rename = "zonas")]
    Zonas,
    #[strum(serialize = "jornadas")]
    #[serde(rename = "jornadas")]
    Jornadas,
    #[strum(serialize = "tipos-establecimiento")]
    #[serde(rename = "tipos-establecimiento")]
    TiposEstablecimiento,
    #[strum(serialize = "servicio-y-propiedad")]
    #[serde(rename = "servicio-y-propiedad")]
    ServicioYPropiedad,
}

impl ViewKind {
    /// All views, in menu order.
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Zonas,
        ViewKind::Jornadas,
        ViewKind::TiposEstablecimiento,
        ViewKind::ServicioYPropiedad,
    ];

    /// Returns the chart title of the view.
    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Zonas => views::Zonas::TITLE,
            ViewKind::Jornadas => views::Jornadas::TITLE,
            ViewKind::TiposEstablecimiento => views::TiposEstablecimiento::TITLE,
            ViewKind::ServicioYPropiedad => views::ServicioYPropiedad::TITLE,
        }
    }
}

impl FromStr for ViewKind {
    type Err = DashboardError;

    /// Parse a view from its slug or from its module name, e.g. `tipos-establecimiento` or
    /// `TiposEstablecimiento`. Matching is case insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "zonas" => Ok(ViewKind::Zonas),
            "jornadas" => Ok(ViewKind::Jornadas),
            "tipos-establecimiento" | "tiposestablecimiento" => {
                Ok(ViewKind::TiposEstablecimiento)
            }
            "servicio-y-propiedad" | "servicioypropiedad" => Ok(ViewKind::ServicioYPropiedad),
            _ => Err(DashboardError::UnknownView {
                view: s.to_string(),
            }),
        }
    }
}

/// Result of rendering a view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    /// A chart was produced
    Ok,
    /// The fetch succeeded but returned no records
    NoData,
    /// The fetch failed
    Error,
}

/// Outcome of rendering a view
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderOutcome {
    pub view: ViewKind,
    pub status: RenderStatus,
    /// Text to display next to or instead of the chart
    pub description: String,
    pub chart: Option<ChartSpec>,
}

/// Trait for views.
///
/// A view groups records into counts and presents them as a chart.
pub trait View {
    /// Which view this is.
    const KIND: ViewKind;

    /// Chart title.
    const TITLE: &'static str;

    /// Name used in fetch error messages.
    const SUBJECT: &'static str;

    /// Description shown when no records match the filters.
    const NO_DATA: &'static str;

    /// Intermediate counts.
    type Aggregate;

    /// Group records into counts.
    ///
    /// # Arguments
    ///
    /// * `records`: Records to aggregate
    fn aggregate(records: &[Record]) -> Self::Aggregate;

    /// Build a chart from counts.
    ///
    /// # Arguments
    ///
    /// * `aggregate`: Counts produced by [View::aggregate]
    /// * `filters`: Filters used to fetch the records, reflected in the description
    fn chart(aggregate: Self::Aggregate, filters: &FilterMap) -> ChartSpec;

    /// Aggregate records and build a chart.
    ///
    /// Returns `None` when there are no records, never a chart with empty series.
    fn build(records: &[Record], filters: &FilterMap) -> Option<ChartSpec> {
        if records.is_empty() {
            return None;
        }
        Some(Self::chart(Self::aggregate(records), filters))
    }
}

/// Fetch the records matching `filters` and render view `V`.
///
/// # Arguments
///
/// * `source`: Source of records
/// * `filters`: Filters selected by the user
pub async fn render<V: View>(source: &dyn RecordSource, filters: &FilterMap) -> RenderOutcome {
    let (status, description, chart) = match source.fetch_filtered(filters).await {
        Err(err) => {
            tracing::warn!("Failed to fetch records for view {}: {}", V::KIND, err);
            (
                RenderStatus::Error,
                format!(
                    "Error al cargar datos para el gráfico de {}: {}",
                    V::SUBJECT,
                    err
                ),
                None,
            )
        }
        Ok(records) => match V::build(&records, filters) {
            None => (RenderStatus::NoData, V::NO_DATA.to_string(), None),
            Some(chart) => (RenderStatus::Ok, chart.description.clone(), Some(chart)),
        },
    };
    RenderOutcome {
        view: V::KIND,
        status,
        description,
        chart,
    }
}

/// Render a view selected at runtime.
///
/// # Arguments
///
/// * `kind`: View to render
/// * `source`: Source of records
/// * `filters`: Filters selected by the user
#[tracing::instrument(level = "DEBUG", skip(source, filters))]
pub async fn render_view(
    kind: ViewKind,
    source: &dyn RecordSource,
    filters: &FilterMap,
) -> RenderOutcome {
    match kind {
        ViewKind::Zonas => render::<views::Zonas>(source, filters).await,
        ViewKind::Jornadas => render::<views::Jornadas>(source, filters).await,
        ViewKind::TiposEstablecimiento => {
            render::<views::TiposEstablecimiento>(source, filters).await
        }
        ViewKind::ServicioYPropiedad => render::<views::ServicioYPropiedad>(source, filters).await,
    }
}

/// Build a chart description: the lead sentence with the record count, followed by the active
/// filters.
///
/// # Arguments
///
/// * `prefix`: Text before the count, e.g. `Distribución de`
/// * `total`: Number of records
/// * `suffix`: Text after the count, e.g. `establecimientos educativos por tipo.`
/// * `filters`: Filters used to fetch the records
pub fn describe(prefix: &str, total: usize, suffix: &str, filters: &FilterMap) -> String {
    let mut description = format!("{} {} {}", prefix, format_count(total as u64), suffix);
    if let Some(year) = filters.active(fields::A_O) {
        description.push_str(&format!(" Año: {}.", year));
    }
    if let Some(secretaria) = filters.active(fields::SECRETARIA) {
        description.push_str(&format!(" Secretaría: {}.", title_case(secretaria)));
    }
    if let Some(prestador) = filters.active(fields::PRESTADOR_DE_SERVICIO) {
        description.push_str(&format!(" Prestador: {}.", prestador));
    }
    if let Some(jornada) = filters.active(fields::JORNADA) {
        description.push_str(&format!(" Jornada: {}.", jornada));
    }
    if let Some(nivel) = filters.active(fields::NIVELES) {
        description.push_str(&format!(" Nivel: {}.", nivel));
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::chart::{ChartKind, Dataset, TooltipFormat, BLUE};
    use crate::test_utils::{record, StubSource};

    struct Counter {}

    impl View for Counter {
        const KIND: ViewKind = ViewKind::Jornadas;
        const TITLE: &'static str = "Contador";
        const SUBJECT: &'static str = "Contador";
        const NO_DATA: &'static str = "Nada.";
        type Aggregate = usize;

        fn aggregate(records: &[Record]) -> usize {
            records.len()
        }

        fn chart(aggregate: usize, filters: &FilterMap) -> ChartSpec {
            ChartSpec {
                kind: ChartKind::Bar,
                index_axis: None,
                title: Self::TITLE.to_string(),
                labels: vec!["n".to_string()],
                datasets: vec![Dataset::single("n", vec![aggregate as u64], BLUE)],
                x_axis_title: None,
                y_axis_title: None,
                tooltip: TooltipFormat::Count,
                description: describe("Hay", aggregate, "registros.", filters),
                total_count: aggregate,
            }
        }
    }

    #[test]
    fn view_kind_display() {
        assert_eq!("zonas", ViewKind::Zonas.to_string());
        assert_eq!("jornadas", ViewKind::Jornadas.to_string());
        assert_eq!(
            "tipos-establecimiento",
            ViewKind::TiposEstablecimiento.to_string()
        );
        assert_eq!(
            "servicio-y-propiedad",
            ViewKind::ServicioYPropiedad.to_string()
        );
    }

    #[test]
    fn view_kind_from_str() {
        for kind in ViewKind::ALL {
            assert_eq!(kind, kind.to_string().parse::<ViewKind>().unwrap());
        }
        assert_eq!(ViewKind::Zonas, "Zonas".parse::<ViewKind>().unwrap());
        assert_eq!(
            ViewKind::TiposEstablecimiento,
            "TiposEstablecimiento".parse::<ViewKind>().unwrap()
        );
        assert_eq!(
            ViewKind::ServicioYPropiedad,
            "ServicioYPropiedad".parse::<ViewKind>().unwrap()
        );
    }

    #[test]
    fn view_kind_unknown() {
        let err = "Matriculas".parse::<ViewKind>().unwrap_err();
        assert_eq!("unknown view Matriculas", err.to_string());
    }

    #[test]
    fn view_kind_serialise() {
        assert_eq!(
            "\"servicio-y-propiedad\"",
            serde_json::to_string(&ViewKind::ServicioYPropiedad).unwrap()
        );
    }

    #[test]
    fn describe_without_filters() {
        let description = describe("Hay", 12345, "registros.", &FilterMap::new());
        assert_eq!("Hay 12.345 registros.", description);
    }

    #[test]
    fn describe_with_filters() {
        let filters = FilterMap::new()
            .with("niveles", "MEDIA")
            .with("jornada", "all")
            .with("secretaria", "bogotá_d.c.")
            .with("a_o", "2023")
            .with("prestador_de_servicio", "OFICIAL");
        let description = describe("Hay", 3, "registros.", &filters);
        assert_eq!(
            "Hay 3 registros. Año: 2023. Secretaría: Bogotá D.C.. Prestador: OFICIAL. Nivel: MEDIA.",
            description
        );
    }

    #[test]
    fn build_empty_is_none() {
        assert_eq!(None, Counter::build(&[], &FilterMap::new()));
    }

    #[tokio::test]
    async fn render_ok() {
        let source = StubSource::new(|_| Ok(vec![record(&[("zona", "RURAL")])]));
        let outcome = render::<Counter>(&source, &FilterMap::new()).await;
        assert_eq!(RenderStatus::Ok, outcome.status);
        assert_eq!("Hay 1 registros.", outcome.description);
        assert_eq!(Some(1), outcome.chart.map(|chart| chart.total_count));
    }

    #[tokio::test]
    async fn render_no_data() {
        let source = StubSource::new(|_| Ok(vec![]));
        let outcome = render::<Counter>(&source, &FilterMap::new()).await;
        assert_eq!(RenderStatus::NoData, outcome.status);
        assert_eq!("Nada.", outcome.description);
        assert_eq!(None, outcome.chart);
    }

    #[tokio::test]
    async fn render_error() {
        let source = StubSource::new(|_| {
            Err(DashboardError::UpstreamStatus {
                status: 500,
                body: "boom".to_string(),
            })
        });
        let outcome = render::<Counter>(&source, &FilterMap::new()).await;
        assert_eq!(RenderStatus::Error, outcome.status);
        assert_eq!(
            "Error al cargar datos para el gráfico de Contador: HTTP error! Status: 500. Body: boom",
            outcome.description
        );
        assert_eq!(None, outcome.chart);
    }

    #[tokio::test]
    async fn render_view_dispatch() {
        let source = StubSource::new(|_| Ok(vec![]));
        for kind in ViewKind::ALL {
            let outcome = render_view(kind, &source, &FilterMap::new()).await;
            assert_eq!(kind, outcome.view);
            assert_eq!(RenderStatus::NoData, outcome.status);
        }
    }
}
