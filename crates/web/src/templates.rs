//! Askama templates
//!
//! Template structs and the view models that map catalogue JSON fields to
//! markup. The templates themselves live in `crates/web/templates/`.

use askama::Template;
use axum::http::StatusCode;
use axum::response::Html;

use researchbank_common::types::{CatalogueItem, EvaluationMetric, Link, MetricDisplay};

use crate::error::WebError;

/// Site name shown in the header
pub const SITE_NAME: &str = "AI4D Research Bank";

/// Placeholder of the search input on every page
pub const SEARCH_PLACEHOLDER: &str = "Search for a dataset or a model";

/// Fields the shared layout (`base.html`) reads
pub struct Layout {
    pub title: String,
    pub prefix: String,
    /// Current value of the search input
    pub search: String,
}

impl Layout {
    pub fn new(title: impl Into<String>, prefix: &str, search: &str) -> Self {
        Self {
            title: title.into(),
            prefix: prefix.to_string(),
            search: search.to_string(),
        }
    }

    pub fn site_name(&self) -> &'static str {
        SITE_NAME
    }

    pub fn placeholder(&self) -> &'static str {
        SEARCH_PLACEHOLDER
    }
}

/// One row of a catalogue listing
pub struct ItemSummary {
    pub href: String,
    pub title: String,
    pub organization: String,
    pub kind: String,
    pub date_added: String,
}

impl ItemSummary {
    pub fn new(prefix: &str, item: &CatalogueItem) -> Self {
        Self {
            href: item_href(prefix, &item.id),
            title: item.title(),
            organization: item.organization.name.clone(),
            kind: item.kind.as_ref().map(|k| k.to_string()).unwrap_or_default(),
            date_added: item.date_added.clone(),
        }
    }
}

pub fn item_href(prefix: &str, id: &str) -> String {
    format!("{}/catalogue/{}", prefix, urlencoding::encode(id))
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub total: usize,
    pub datasets: usize,
    pub models: usize,
    pub recent: Vec<ItemSummary>,
}

#[derive(Template)]
#[template(path = "catalogue.html")]
pub struct CatalogueTemplate {
    pub layout: Layout,
    pub summary: String,
    pub items: Vec<ItemSummary>,
}

/// An evaluation entry: metric and link, either one, or `-`
pub struct MetricRow {
    pub has_metric: bool,
    pub has_link: bool,
    pub metric: String,
    pub link_url: String,
    pub link_text: String,
}

impl From<&EvaluationMetric> for MetricRow {
    fn from(entry: &EvaluationMetric) -> Self {
        let (metric, link) = match entry.display() {
            MetricDisplay::MetricAndLink(m, l) => (Some(m), Some(l)),
            MetricDisplay::MetricOnly(m) => (Some(m), None),
            MetricDisplay::LinkOnly(l) => (None, Some(l)),
            MetricDisplay::Empty => (None, None),
        };
        Self {
            has_metric: metric.is_some(),
            has_link: link.is_some(),
            metric: metric.map(|m| m.to_string()).unwrap_or_default(),
            link_url: link.map(|l| l.url.clone()).unwrap_or_default(),
            link_text: link.map(|l| l.description.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "item.html")]
pub struct ItemTemplate {
    pub layout: Layout,
    pub id: String,
    /// Heading label, `name (year-period)` or just the name
    pub title: String,
    pub organization: String,
    pub year_period: String,
    pub date_added: String,
    pub description: String,
    pub country_region: String,
    /// Evaluation row is omitted entirely when the item has no metrics field
    pub has_metrics: bool,
    pub metrics: Vec<MetricRow>,
    /// First GeoJSON link, if any
    pub map_url: Option<String>,
    pub links: Vec<Link>,
}

impl ItemTemplate {
    pub fn new(layout: Layout, item: &CatalogueItem) -> Self {
        Self {
            layout,
            id: item.id.clone(),
            title: item.title(),
            organization: item.organization.name.clone(),
            year_period: item.year_period.clone(),
            date_added: item.date_added.clone(),
            description: item.description.clone(),
            country_region: item.country_region.clone().unwrap_or_else(|| "-".to_string()),
            has_metrics: item.evaluation_metrics.is_some(),
            metrics: item
                .evaluation_metrics
                .iter()
                .flatten()
                .map(MetricRow::from)
                .collect(),
            map_url: item.geojson_link().map(|l| l.url.clone()),
            links: item.links.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub layout: Layout,
    pub status: u16,
    pub message: String,
}

impl ErrorTemplate {
    pub fn new(layout: Layout, status: StatusCode, message: &str) -> Self {
        Self {
            layout,
            status: status.as_u16(),
            message: message.to_string(),
        }
    }
}

/// Render a template into an HTML response body
pub fn page<T: Template>(template: T) -> Result<Html<String>, WebError> {
    Ok(Html(template.render()?))
}
