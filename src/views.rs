//! Implementations of the dashboard views.
//!
//! Each view is implemented as a struct that implements the [View] trait.

use crate::chart::{
    ChartKind, ChartSpec, Dataset, IndexAxis, Rgba, TooltipFormat, BLUE, ORANGE, RED, TEAL,
};
use crate::models::{fields, FilterMap, Record};
use crate::tally::{
    single_value, split_multi_value, CategoryCount, Tally, NOT_SPECIFIED_F, NOT_SPECIFIED_M,
};
use crate::view::{describe, View, ViewKind};

/// Axis title for bar lengths.
const COUNT_AXIS: &str = "Cantidad de Establecimientos";

/// Counts for a single category series
#[derive(Debug, PartialEq)]
pub struct Counts {
    /// Categories in display order
    pub entries: Vec<CategoryCount>,
    /// Number of records counted
    pub total: usize,
}

impl Counts {
    fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    fn data(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.count).collect()
    }
}

/// Build a single-series bar chart from counts.
fn bar_chart(
    counts: Counts,
    title: &str,
    index_axis: Option<IndexAxis>,
    category_axis: &str,
    color: Rgba,
    description: String,
) -> ChartSpec {
    let (x_axis_title, y_axis_title) = match index_axis {
        Some(IndexAxis::Y) => (COUNT_AXIS, category_axis),
        _ => (category_axis, COUNT_AXIS),
    };
    ChartSpec {
        kind: ChartKind::Bar,
        index_axis,
        title: title.to_string(),
        labels: counts.labels(),
        datasets: vec![Dataset::single(COUNT_AXIS, counts.data(), color)],
        x_axis_title: Some(x_axis_title.to_string()),
        y_axis_title: Some(y_axis_title.to_string()),
        tooltip: TooltipFormat::Count,
        description,
        total_count: counts.total,
    }
}

/// Establishments by zone.
///
/// Zones are comma-joined; a record is counted once under each of its zones. A record with no
/// zone is counted as [NOT_SPECIFIED_F]. Shown as a doughnut with each slice's share of the
/// record count.
pub struct Zonas {}

impl View for Zonas {
    const KIND: ViewKind = ViewKind::Zonas;
    const TITLE: &'static str = "Establecimientos por Zona";
    const SUBJECT: &'static str = "Zonas";
    const NO_DATA: &'static str =
        "No se encontraron datos de establecimientos por zona con los filtros seleccionados.";
    type Aggregate = Counts;

    fn aggregate(records: &[Record]) -> Counts {
        let mut tally = Tally::new();
        // Records with several zones count once here, but the reported total is the input length.
        let mut counted = 0_usize;
        for record in records {
            let mut zones = record
                .get_non_empty(fields::ZONA)
                .map(split_multi_value)
                .into_iter()
                .flatten()
                .peekable();
            if zones.peek().is_none() {
                tally.add(NOT_SPECIFIED_F);
            }
            for zone in zones {
                tally.add(&zone);
            }
            counted += 1;
        }
        tracing::trace!("Counted {} records by zone", counted);
        Counts {
            entries: tally.into_sorted_by_count(),
            total: records.len(),
        }
    }

    fn chart(counts: Counts, filters: &FilterMap) -> ChartSpec {
        let description = describe(
            "Distribución de",
            counts.total,
            "establecimientos educativos por tipo de zona.",
            filters,
        );
        ChartSpec {
            kind: ChartKind::Doughnut,
            index_axis: None,
            title: Self::TITLE.to_string(),
            labels: counts.labels(),
            datasets: vec![Dataset::paletted("Establecimientos", counts.data())],
            x_axis_title: None,
            y_axis_title: None,
            tooltip: TooltipFormat::CountWithShare {
                total: counts.total,
            },
            description,
            total_count: counts.total,
        }
    }
}

/// Establishments by school schedule.
///
/// Schedules are comma-joined; a record is counted once under each of its schedules. A record
/// with no schedule is counted as [NOT_SPECIFIED_F]; one whose schedule holds only separators
/// is not counted.
pub struct Jornadas {}

impl View for Jornadas {
    const KIND: ViewKind = ViewKind::Jornadas;
    const TITLE: &'static str = "Establecimientos por Jornada";
    const SUBJECT: &'static str = "Jornadas";
    const NO_DATA: &'static str =
        "No se encontraron datos de establecimientos por jornada con los filtros seleccionados.";
    type Aggregate = Counts;

    fn aggregate(records: &[Record]) -> Counts {
        let mut tally = Tally::new();
        for record in records {
            match record.get_non_empty(fields::JORNADA) {
                Some(jornada) => split_multi_value(jornada).for_each(|j| tally.add(&j)),
                None => tally.add(NOT_SPECIFIED_F),
            }
        }
        Counts {
            entries: tally.into_sorted_by_count(),
            total: records.len(),
        }
    }

    fn chart(counts: Counts, filters: &FilterMap) -> ChartSpec {
        let description = describe(
            "Distribución de",
            counts.total,
            "establecimientos educativos por tipo de jornada.",
            filters,
        );
        bar_chart(counts, Self::TITLE, None, "Tipo de Jornada", BLUE, description)
    }
}

/// Establishments by type.
pub struct TiposEstablecimiento {}

impl View for TiposEstablecimiento {
    const KIND: ViewKind = ViewKind::TiposEstablecimiento;
    const TITLE: &'static str = "Establecimientos por Tipo";
    const SUBJECT: &'static str = "Tipos de Establecimiento";
    const NO_DATA: &'static str =
        "No se encontraron datos de establecimientos por tipo con los filtros seleccionados.";
    type Aggregate = Counts;

    fn aggregate(records: &[Record]) -> Counts {
        let mut tally = Tally::new();
        for record in records {
            tally.add(&single_value(
                record.get(fields::TIPO_ESTABLECIMIENTO),
                NOT_SPECIFIED_M,
            ));
        }
        Counts {
            entries: tally.into_sorted_by_count(),
            total: records.len(),
        }
    }

    fn chart(counts: Counts, filters: &FilterMap) -> ChartSpec {
        let description = describe(
            "Distribución de",
            counts.total,
            "establecimientos educativos por tipo.",
            filters,
        );
        bar_chart(
            counts,
            Self::TITLE,
            Some(IndexAxis::Y),
            "Tipo de Establecimiento",
            RED,
            description,
        )
    }
}

/// Two count series aligned on a shared set of labels.
#[derive(Debug, PartialEq)]
pub struct PairedCounts {
    /// Sorted union of the labels of both series
    pub labels: Vec<String>,
    /// Counts by service provider, zero where the label is not a provider
    pub prestador: Vec<u64>,
    /// Counts by premises ownership, zero where the label is not an ownership
    pub propiedad: Vec<u64>,
    /// Number of records counted
    pub total: usize,
}

/// Establishments by service provider and by ownership of the premises.
///
/// The two fields are counted independently and shown as two series over the union of their
/// labels.
pub struct ServicioYPropiedad {}

impl View for ServicioYPropiedad {
    const KIND: ViewKind = ViewKind::ServicioYPropiedad;
    const TITLE: &'static str =
        "Establecimientos por Prestador de Servicio y Propiedad de Planta Física";
    const SUBJECT: &'static str = "Servicio y Propiedad";
    const NO_DATA: &'static str = "No se encontraron datos de establecimientos por prestador de servicio o propiedad de planta física con los filtros seleccionados.";
    type Aggregate = PairedCounts;

    fn aggregate(records: &[Record]) -> PairedCounts {
        let mut prestadores = Tally::new();
        let mut propiedades = Tally::new();
        for record in records {
            prestadores.add(&single_value(
                record.get(fields::PRESTADOR_DE_SERVICIO),
                NOT_SPECIFIED_M,
            ));
            propiedades.add(&single_value(
                record.get(fields::PROPIEDAD_PLANTA_FISICA),
                NOT_SPECIFIED_F,
            ));
        }
        let mut labels: Vec<String> = prestadores
            .labels()
            .chain(propiedades.labels())
            .map(str::to_string)
            .collect();
        labels.sort();
        labels.dedup();
        let prestador = labels.iter().map(|l| prestadores.get(l)).collect();
        let propiedad = labels.iter().map(|l| propiedades.get(l)).collect();
        PairedCounts {
            labels,
            prestador,
            propiedad,
            total: records.len(),
        }
    }

    fn chart(counts: PairedCounts, filters: &FilterMap) -> ChartSpec {
        let description = describe(
            "Análisis de",
            counts.total,
            "establecimientos educativos por prestador de servicio y propiedad de planta física.",
            filters,
        );
        ChartSpec {
            kind: ChartKind::Bar,
            index_axis: Some(IndexAxis::Y),
            title: Self::TITLE.to_string(),
            labels: counts.labels,
            datasets: vec![
                Dataset::single("Cantidad por Prestador de Servicio", counts.prestador, TEAL),
                Dataset::single(
                    "Cantidad por Propiedad de Planta Física",
                    counts.propiedad,
                    ORANGE,
                ),
            ],
            x_axis_title: Some(COUNT_AXIS.to_string()),
            y_axis_title: Some("Categoría".to_string()),
            tooltip: TooltipFormat::Count,
            description,
            total_count: counts.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::record;

    fn counts(counts: &Counts) -> Vec<(&str, u64)> {
        counts
            .entries
            .iter()
            .map(|e| (e.label.as_str(), e.count))
            .collect()
    }

    #[test]
    fn empty_records_build_nothing() {
        let filters = FilterMap::new();
        assert_eq!(None, Zonas::build(&[], &filters));
        assert_eq!(None, Jornadas::build(&[], &filters));
        assert_eq!(None, TiposEstablecimiento::build(&[], &filters));
        assert_eq!(None, ServicioYPropiedad::build(&[], &filters));
    }

    #[test]
    fn zonas_multi_value() {
        let records = vec![
            record(&[("zona", "RURAL, URBANA")]),
            record(&[("zona", " rural")]),
        ];
        let aggregate = Zonas::aggregate(&records);
        assert_eq!(vec![("RURAL", 2), ("URBANA", 1)], counts(&aggregate));
        assert_eq!(2, aggregate.total);
    }

    #[test]
    fn zonas_not_specified() {
        let records = vec![
            record(&[("zona", "")]),
            record(&[("zona", " , ")]),
            record(&[("codigo", "1")]),
            record(&[("zona", "URBANA")]),
        ];
        let aggregate = Zonas::aggregate(&records);
        assert_eq!(
            vec![("NO ESPECIFICADA", 3), ("URBANA", 1)],
            counts(&aggregate)
        );
    }

    #[test]
    fn zonas_total_is_record_count() {
        let records = vec![
            record(&[("zona", "RURAL,URBANA")]),
            record(&[("zona", "RURAL,URBANA")]),
            record(&[("zona", "URBANA")]),
            record(&[("zona", "RURAL")]),
        ];
        let chart = Zonas::build(&records, &FilterMap::new()).unwrap();
        assert_eq!(4, chart.total_count);
        assert_eq!(ChartKind::Doughnut, chart.kind);
        assert_eq!(TooltipFormat::CountWithShare { total: 4 }, chart.tooltip);
        // Shares are of the record count, so they add up to more than 100%.
        assert_eq!(Some("RURAL: 3 (75.00%)".to_string()), chart.tooltip_label(0, 0));
        assert_eq!(Some("URBANA: 3 (75.00%)".to_string()), chart.tooltip_label(0, 1));
        assert_eq!(
            "Distribución de 4 establecimientos educativos por tipo de zona.",
            chart.description
        );
    }

    #[test]
    fn jornadas_multi_value() {
        let records = vec![
            record(&[("jornada", "mañana, TARDE")]),
            record(&[("jornada", "TARDE")]),
            record(&[("jornada", "NOCHE")]),
            record(&[("jornada", "TARDE,")]),
        ];
        let aggregate = Jornadas::aggregate(&records);
        assert_eq!(
            vec![("TARDE", 3), ("MAÑANA", 1), ("NOCHE", 1)],
            counts(&aggregate)
        );
        assert_eq!(4, aggregate.total);
    }

    #[test]
    fn jornadas_missing_and_separator_only() {
        let records = vec![
            record(&[("jornada", "")]),
            record(&[("codigo", "1")]),
            record(&[("jornada", " , ")]),
        ];
        let aggregate = Jornadas::aggregate(&records);
        assert_eq!(vec![("NO ESPECIFICADA", 2)], counts(&aggregate));
        assert_eq!(3, aggregate.total);
    }

    #[test]
    fn jornadas_chart() {
        let records = vec![record(&[("jornada", "COMPLETA")]); 1500];
        let filters = FilterMap::new().with("a_o", "2023");
        let chart = Jornadas::build(&records, &filters).unwrap();
        assert_eq!(ChartKind::Bar, chart.kind);
        assert_eq!(None, chart.index_axis);
        assert_eq!("Establecimientos por Jornada", chart.title);
        assert_eq!(Some("Tipo de Jornada".to_string()), chart.x_axis_title);
        assert_eq!(
            Some("Cantidad de Establecimientos".to_string()),
            chart.y_axis_title
        );
        assert_eq!(
            Some("Cantidad de Establecimientos: 1.500".to_string()),
            chart.tooltip_label(0, 0)
        );
        assert_eq!(
            "Distribución de 1.500 establecimientos educativos por tipo de jornada. Año: 2023.",
            chart.description
        );
    }

    #[test]
    fn tipos_single_value() {
        let records = vec![
            record(&[("tipo_establecimiento", " colegio ")]),
            record(&[("tipo_establecimiento", "CENTRO EDUCATIVO")]),
            record(&[("tipo_establecimiento", "COLEGIO")]),
            record(&[("tipo_establecimiento", "  ")]),
            record(&[("codigo", "1")]),
        ];
        let aggregate = TiposEstablecimiento::aggregate(&records);
        assert_eq!(
            vec![
                ("COLEGIO", 2),
                ("NO ESPECIFICADO", 2),
                ("CENTRO EDUCATIVO", 1)
            ],
            counts(&aggregate)
        );
    }

    #[test]
    fn tipos_chart_is_horizontal() {
        let records = vec![record(&[("tipo_establecimiento", "COLEGIO")])];
        let chart = TiposEstablecimiento::build(&records, &FilterMap::new()).unwrap();
        assert_eq!(Some(IndexAxis::Y), chart.index_axis);
        assert_eq!(
            Some("Cantidad de Establecimientos".to_string()),
            chart.x_axis_title
        );
        assert_eq!(Some("Tipo de Establecimiento".to_string()), chart.y_axis_title);
        assert_eq!(
            "Distribución de 1 establecimientos educativos por tipo.",
            chart.description
        );
    }

    #[test]
    fn servicio_y_propiedad_zero_filled() {
        let records = vec![
            record(&[("prestador_de_servicio", "P2"), ("propiedad_planta_fisica", "O1")]),
            record(&[("prestador_de_servicio", "P1"), ("propiedad_planta_fisica", "O1")]),
            record(&[("prestador_de_servicio", "P1"), ("propiedad_planta_fisica", "O1")]),
        ];
        let aggregate = ServicioYPropiedad::aggregate(&records);
        assert_eq!(vec!["O1", "P1", "P2"], aggregate.labels);
        assert_eq!(vec![0, 2, 1], aggregate.prestador);
        assert_eq!(vec![3, 0, 0], aggregate.propiedad);
        assert_eq!(3, aggregate.total);
    }

    #[test]
    fn servicio_y_propiedad_shared_label() {
        let records = vec![
            record(&[("prestador_de_servicio", "oficial")]),
            record(&[("propiedad_planta_fisica", "OFICIAL")]),
        ];
        let aggregate = ServicioYPropiedad::aggregate(&records);
        assert_eq!(
            vec!["NO ESPECIFICADA", "NO ESPECIFICADO", "OFICIAL"],
            aggregate.labels
        );
        assert_eq!(vec![0, 1, 1], aggregate.prestador);
        assert_eq!(vec![1, 0, 1], aggregate.propiedad);
    }

    #[test]
    fn servicio_y_propiedad_chart() {
        let records = vec![record(&[
            ("prestador_de_servicio", "OFICIAL"),
            ("propiedad_planta_fisica", "OFICIAL"),
        ])];
        let filters = FilterMap::new().with("prestador_de_servicio", "OFICIAL");
        let chart = ServicioYPropiedad::build(&records, &filters).unwrap();
        assert_eq!(2, chart.datasets.len());
        assert_eq!("Cantidad por Prestador de Servicio", chart.datasets[0].label);
        assert_eq!(
            "Cantidad por Propiedad de Planta Física",
            chart.datasets[1].label
        );
        assert_eq!(Some("Categoría".to_string()), chart.y_axis_title);
        assert_eq!(
            "Análisis de 1 establecimientos educativos por prestador de servicio y propiedad de planta física. Prestador: OFICIAL.",
            chart.description
        );
    }
}
