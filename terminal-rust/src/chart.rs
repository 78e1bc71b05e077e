use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_CHART_TITLE: &str = "Market Analytics";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    #[default]
    Bar,
    Line,
}

impl ChartKind {
    /// Unrecognized names render as bars.
    pub fn from_name(name: &str) -> Self {
        match name {
            "pie" => Self::Pie,
            "line" => Self::Line,
            _ => Self::Bar,
        }
    }
}

// A missing, null or non-string "type" is not worth dropping the chart over.
fn deserialize_kind<'de, D>(deserializer: D) -> Result<ChartKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(name)) => ChartKind::from_name(&name),
        _ => ChartKind::default(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A visualization embedded in a reply as `[CHART_DATA: {...}]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: ChartKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub data: Vec<ChartEntry>,
}

impl ChartSpec {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_CHART_TITLE)
    }

    /// Fraction of the whole for each entry, in data order.
    ///
    /// Returns `None` when the values do not sum to a positive finite total,
    /// so the caller can skip the chart and keep rendering the rest of the
    /// message.
    pub fn pie_slices(&self) -> Option<Vec<f64>> {
        let total: f64 = self.data.iter().map(|entry| entry.value).sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        Some(self.data.iter().map(|entry| entry.value / total).collect())
    }

    /// Bar length relative to the largest value, in data order.
    ///
    /// Returns `None` when there is no positive finite maximum.
    pub fn bar_lengths(&self) -> Option<Vec<f64>> {
        let max = self
            .data
            .iter()
            .map(|entry| entry.value)
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() || max <= 0.0 {
            return None;
        }
        Some(self.data.iter().map(|entry| entry.value / max).collect())
    }

    /// `(x, y)` pairs in the unit square. `x` spaces points evenly by index,
    /// `y` is the value min-max normalized with 0 at the minimum. When all
    /// values are equal, or the spread overflows `f64`, every point sits at
    /// `y = 0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn line_points(&self) -> Vec<(f64, f64)> {
        let values: Vec<f64> = self.data.iter().map(|entry| entry.value).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        let scaled = range.is_finite() && range > 0.0;
        let span = values.len().saturating_sub(1).max(1) as f64;

        values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let y = if scaled { (value - min) / range } else { 0.0 };
                (index as f64 / span, y)
            })
            .collect()
    }
}
