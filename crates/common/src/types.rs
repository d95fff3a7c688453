//! Catalogue item types
//!
//! Mirrors the kebab-case JSON records of `catalog.json`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of catalogue entry. Values other than `dataset`/`model` are kept as
/// written so one odd record does not reject the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Dataset,
    Model,
    Other(String),
}

impl From<String> for ItemKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dataset" => ItemKind::Dataset,
            "model" => ItemKind::Model,
            _ => ItemKind::Other(value),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        kind.to_string()
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Dataset => write!(f, "dataset"),
            ItemKind::Model => write!(f, "model"),
            ItemKind::Other(other) => f.write_str(other),
        }
    }
}

/// Organization that published a dataset or model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// External link attached to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub description: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A measured metric, e.g. `R^2 (0.63)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "metric-type")]
    pub metric_type: String,
    /// Number or string, rendered as written in the document
    pub value: serde_json::Value,
}

impl Metric {
    pub fn value_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.metric_type, self.value_text())
    }
}

/// One evaluation entry; either half may be missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

/// How an evaluation entry is rendered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricDisplay<'a> {
    MetricAndLink(&'a Metric, &'a Link),
    MetricOnly(&'a Metric),
    LinkOnly(&'a Link),
    Empty,
}

impl std::fmt::Display for MetricDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricDisplay::MetricAndLink(metric, link) => {
                write!(f, "{} - {} <{}>", metric, link.description, link.url)
            }
            MetricDisplay::MetricOnly(metric) => write!(f, "{}", metric),
            MetricDisplay::LinkOnly(link) => write!(f, "{} <{}>", link.description, link.url),
            MetricDisplay::Empty => f.write_str("-"),
        }
    }
}

impl EvaluationMetric {
    pub fn display(&self) -> MetricDisplay<'_> {
        match (&self.metric, &self.link) {
            (Some(metric), Some(link)) => MetricDisplay::MetricAndLink(metric, link),
            (Some(metric), None) => MetricDisplay::MetricOnly(metric),
            (None, Some(link)) => MetricDisplay::LinkOnly(link),
            (None, None) => MetricDisplay::Empty,
        }
    }
}

/// A dataset or model record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogueItem {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub organization: Organization,
    #[serde(default)]
    pub date_added: String,
    #[serde(default)]
    pub year_period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_metrics: Option<Vec<EvaluationMetric>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl CatalogueItem {
    /// Display label: `name (year-period)`
    pub fn title(&self) -> String {
        if self.year_period.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.year_period)
        }
    }

    /// `date-added` parsed as `YYYY-MM-DD`
    pub fn date_added(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_added.trim(), "%Y-%m-%d").ok()
    }

    /// First link pointing at GeoJSON data
    pub fn geojson_link(&self) -> Option<&Link> {
        self.links.iter().find(|link| {
            link.kind
                .as_deref()
                .map(|kind| kind.to_ascii_lowercase().contains("geojson"))
                .unwrap_or(false)
        })
    }
}
