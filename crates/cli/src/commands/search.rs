//! Search and suggestions

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use researchbank_common::search::{self, Suggestion};

use crate::client::CatalogueClient;
use crate::commands::catalogue::ItemRow;
use crate::output::{print_info, print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct QueryArgs {
    /// Search text; words may appear in any field
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl QueryArgs {
    pub fn text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Serialize)]
pub struct SuggestionRow {
    pub id: String,
    pub label: String,
}

impl From<Suggestion> for SuggestionRow {
    fn from(s: Suggestion) -> Self {
        Self {
            id: s.id,
            label: s.label,
        }
    }
}

impl TableDisplay for SuggestionRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Suggestion"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.clone(), self.label.clone()]
    }
}

pub async fn search(args: QueryArgs, client: &CatalogueClient, format: OutputFormat) -> Result<()> {
    let catalogue = client.catalogue().await?;
    let rows: Vec<ItemRow> = search::filter(&catalogue, &args.text())
        .into_iter()
        .map(ItemRow::from)
        .collect();

    if format != OutputFormat::Json {
        print_info(&search::result_summary(rows.len()));
    }
    print_list(&rows, format);
    Ok(())
}

pub async fn suggest(args: QueryArgs, client: &CatalogueClient, format: OutputFormat) -> Result<()> {
    let catalogue = client.catalogue().await?;
    let text = args.text();
    if text.trim().chars().count() < researchbank_common::MIN_SUGGESTION_CHARS && format != OutputFormat::Json {
        print_info(&format!(
            "Suggestions need at least {} characters",
            researchbank_common::MIN_SUGGESTION_CHARS
        ));
        return Ok(());
    }

    let rows: Vec<SuggestionRow> = search::suggest(&catalogue, &text)
        .into_iter()
        .map(SuggestionRow::from)
        .collect();
    print_list(&rows, format);
    Ok(())
}
