//! Chart specifications.
//!
//! A [ChartSpec] is plain data consumed by a charting surface: the chart kind, ordered labels,
//! one or more count series with display styling, titles and tooltip formatting. It also carries
//! the human readable description of what is plotted.

use std::fmt;

use serde::{Serialize, Serializer};

/// Kind of chart to draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Doughnut,
}

/// Axis along which bars are laid out when it is not the default `x`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexAxis {
    /// Horizontal bars
    Y,
}

/// An RGBA colour, serialised as a CSS `rgba()` string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Rgba { r, g, b, a }
    }

    /// Returns the same colour with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Rgba { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fill alpha for bars and slices.
pub const FILL_ALPHA: f32 = 0.7;

pub const BLUE: Rgba = Rgba::new(54, 162, 235, 1.0);
pub const RED: Rgba = Rgba::new(255, 99, 132, 1.0);
pub const TEAL: Rgba = Rgba::new(75, 192, 192, 1.0);
pub const ORANGE: Rgba = Rgba::new(255, 159, 64, 1.0);

/// Palette for per-slice colours, cycled when there are more slices than colours.
pub const PALETTE: [Rgba; 8] = [
    BLUE,
    RED,
    TEAL,
    ORANGE,
    Rgba::new(153, 102, 255, 1.0),
    Rgba::new(255, 205, 86, 1.0),
    Rgba::new(201, 203, 207, 1.0),
    Rgba::new(46, 139, 87, 1.0),
];

/// Colours for a dataset: one for every point, or one per point.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    Single(Rgba),
    PerPoint(Vec<Rgba>),
}

/// A series of counts with display styling
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: Colors,
    pub border_color: Colors,
    pub border_width: u32,
}

impl Dataset {
    /// Return a dataset drawn in a single colour.
    pub fn single(label: &str, data: Vec<u64>, color: Rgba) -> Self {
        Dataset {
            label: label.to_string(),
            data,
            background_color: Colors::Single(color.with_alpha(FILL_ALPHA)),
            border_color: Colors::Single(color),
            border_width: 1,
        }
    }

    /// Return a dataset with one palette colour per point.
    pub fn paletted(label: &str, data: Vec<u64>) -> Self {
        let colors: Vec<Rgba> = PALETTE.iter().copied().cycle().take(data.len()).collect();
        Dataset {
            label: label.to_string(),
            data,
            background_color: Colors::PerPoint(
                colors.iter().map(|c| c.with_alpha(FILL_ALPHA)).collect(),
            ),
            border_color: Colors::PerPoint(colors),
            border_width: 1,
        }
    }
}

/// How tooltip text is rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "format")]
pub enum TooltipFormat {
    /// `{dataset label}: {count}`
    Count,
    /// `{point label}: {count} ({share}%)`, share of `total`
    CountWithShare { total: usize },
}

/// Chart specification
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<IndexAxis>,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_title: Option<String>,
    pub tooltip: TooltipFormat,
    pub description: String,
    pub total_count: usize,
}

impl ChartSpec {
    /// Render the tooltip text for a point.
    ///
    /// Returns `None` if either index is out of range.
    ///
    /// # Arguments
    ///
    /// * `dataset`: Index of the dataset
    /// * `index`: Index of the point within the dataset
    pub fn tooltip_label(&self, dataset: usize, index: usize) -> Option<String> {
        let series = self.datasets.get(dataset)?;
        let value = *series.data.get(index)?;
        match self.tooltip {
            TooltipFormat::Count => Some(format!("{}: {}", series.label, format_count(value))),
            TooltipFormat::CountWithShare { total } => {
                let label = self.labels.get(index)?;
                let share = if total == 0 {
                    0.0
                } else {
                    value as f64 / total as f64 * 100.0
                };
                Some(format!("{}: {} ({:.2}%)", label, format_count(value), share))
            }
        }
    }
}

/// Format a count with `.` as the thousands separator, as is customary in Colombia.
pub fn format_count(n: impl Into<u64>) -> String {
    let digits = n.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Turn a raw field value into display text: underscores become spaces and every letter that
/// follows a non-alphanumeric character is capitalised, so `bogotá_d.c.` reads `Bogotá D.C.`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if in_word {
            out.push(c);
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphanumeric();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            index_axis: None,
            title: "t".to_string(),
            labels: vec!["A".to_string(), "B".to_string()],
            datasets: vec![Dataset::single("Cantidad", vec![1234, 5], BLUE)],
            x_axis_title: None,
            y_axis_title: None,
            tooltip: TooltipFormat::Count,
            description: String::new(),
            total_count: 1239,
        }
    }

    #[test]
    fn test_format_count() {
        assert_eq!("0", format_count(0_u64));
        assert_eq!("999", format_count(999_u64));
        assert_eq!("1.000", format_count(1000_u64));
        assert_eq!("12.345", format_count(12345_u64));
        assert_eq!("1.234.567", format_count(1234567_u64));
    }

    #[test]
    fn test_title_case() {
        assert_eq!("Bogotá D.C.", title_case("bogotá_d.c."));
        assert_eq!("Medellín", title_case("medellín"));
        assert_eq!("San Andrés (Isla)", title_case("san_andrés (isla)"));
        assert_eq!("Norte-Centro", title_case("norte-centro"));
        assert_eq!("OFICIAL", title_case("OFICIAL"));
        assert_eq!("Fin  De", title_case("fin__de"));
        assert_eq!("", title_case(""));
    }

    #[test]
    fn test_rgba() {
        assert_eq!("rgba(54, 162, 235, 0.7)", BLUE.with_alpha(FILL_ALPHA).to_string());
        assert_eq!("rgba(54, 162, 235, 1)", BLUE.to_string());
        assert_eq!("\"rgba(255, 99, 132, 1)\"", serde_json::to_string(&RED).unwrap());
    }

    #[test]
    fn test_paletted_cycles() {
        let dataset = Dataset::paletted("Establecimientos", vec![1; 10]);
        match dataset.border_color {
            Colors::PerPoint(colors) => {
                assert_eq!(10, colors.len());
                assert_eq!(colors[0], colors[8]);
            }
            Colors::Single(_) => panic!("expected per point colours"),
        }
    }

    #[test]
    fn test_tooltip_count() {
        let chart = bar();
        assert_eq!(Some("Cantidad: 1.234".to_string()), chart.tooltip_label(0, 0));
        assert_eq!(None, chart.tooltip_label(1, 0));
        assert_eq!(None, chart.tooltip_label(0, 2));
    }

    #[test]
    fn test_tooltip_share() {
        let mut chart = bar();
        chart.kind = ChartKind::Doughnut;
        chart.tooltip = TooltipFormat::CountWithShare { total: 8 };
        chart.datasets = vec![Dataset::paletted("Establecimientos", vec![6, 3])];
        assert_eq!(Some("A: 6 (75.00%)".to_string()), chart.tooltip_label(0, 0));
        assert_eq!(Some("B: 3 (37.50%)".to_string()), chart.tooltip_label(0, 1));
    }

    #[test]
    fn test_serialise() {
        let mut chart = bar();
        chart.index_axis = Some(IndexAxis::Y);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!("bar", json["kind"]);
        assert_eq!("y", json["indexAxis"]);
        assert_eq!("count", json["tooltip"]["format"]);
        assert_eq!("rgba(54, 162, 235, 0.7)", json["datasets"][0]["backgroundColor"]);
        assert_eq!(1239, json["totalCount"]);
        assert!(json.get("xAxisTitle").is_none());
    }
}
