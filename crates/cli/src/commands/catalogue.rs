//! Listing and showing catalogue items

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use researchbank_common::{Catalogue, CatalogueItem, ItemKind};

use crate::client::CatalogueClient;
use crate::output::{print_item, print_list, OutputFormat, TableDisplay};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindFilter {
    Dataset,
    Model,
}

impl From<KindFilter> for ItemKind {
    fn from(kind: KindFilter) -> Self {
        match kind {
            KindFilter::Dataset => ItemKind::Dataset,
            KindFilter::Model => ItemKind::Model,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Only list datasets or models
    #[arg(long)]
    pub kind: Option<KindFilter>,

    /// Show the N most recently added items
    #[arg(long)]
    pub recent: Option<usize>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Item id
    pub id: String,
}

/// One catalogue row
#[derive(Serialize)]
pub struct ItemRow {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub organization: String,
    pub date_added: String,
}

impl From<&CatalogueItem> for ItemRow {
    fn from(item: &CatalogueItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title(),
            kind: item.kind.as_ref().map(|k| k.to_string()).unwrap_or_default(),
            organization: item.organization.name.clone(),
            date_added: item.date_added.clone(),
        }
    }
}

impl TableDisplay for ItemRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Title", "Type", "Organization", "Added"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.kind.clone(),
            self.organization.clone(),
            self.date_added.clone(),
        ]
    }
}

/// Everything an item page shows
#[derive(Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub name: String,
    pub organization: String,
    pub year_period: String,
    pub date_added: String,
    pub country_region: String,
    pub description: String,
    pub evaluation: Vec<String>,
    pub links: Vec<String>,
}

impl From<&CatalogueItem> for ItemDetail {
    fn from(item: &CatalogueItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            organization: item.organization.name.clone(),
            year_period: item.year_period.clone(),
            date_added: item.date_added.clone(),
            country_region: item.country_region.clone().unwrap_or_else(|| "-".to_string()),
            description: item.description.clone(),
            evaluation: item
                .evaluation_metrics
                .iter()
                .flatten()
                .map(|m| m.display().to_string())
                .collect(),
            links: item
                .links
                .iter()
                .map(|l| format!("{} <{}>", l.description, l.url))
                .collect(),
        }
    }
}

impl TableDisplay for ItemDetail {
    fn headers() -> Vec<&'static str> {
        vec![
            "ID",
            "Name",
            "Organization",
            "Year/Period",
            "Added",
            "Country/Region",
            "Description",
            "Evaluation",
            "Links",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.organization.clone(),
            self.year_period.clone(),
            self.date_added.clone(),
            self.country_region.clone(),
            self.description.clone(),
            self.evaluation.join("; "),
            self.links.join("; "),
        ]
    }
}

/// Rows for `list`
pub fn list_rows(catalogue: &Catalogue, args: &ListArgs) -> Vec<ItemRow> {
    let items: Vec<&CatalogueItem> = match args.recent {
        Some(n) => catalogue.recently_added(n),
        None => catalogue.items().iter().collect(),
    };
    let kind = args.kind.map(ItemKind::from);

    items
        .into_iter()
        .filter(|item| kind.as_ref().map_or(true, |k| item.kind.as_ref() == Some(k)))
        .map(ItemRow::from)
        .collect()
}

pub async fn list(args: ListArgs, client: &CatalogueClient, format: OutputFormat) -> Result<()> {
    let catalogue = client.catalogue().await?;
    print_list(&list_rows(&catalogue, &args), format);
    Ok(())
}

pub async fn show(args: ShowArgs, client: &CatalogueClient, format: OutputFormat) -> Result<()> {
    let item = client.item(&args.id).await?;
    print_item(&ItemDetail::from(&item), format);
    Ok(())
}
