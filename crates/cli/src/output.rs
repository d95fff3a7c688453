//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn table<T: TableDisplay>(rows: &[&T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(T::headers());
    for item in rows {
        table.add_row(item.row());
    }
    table
}

fn plain<T: TableDisplay>(item: &T) -> String {
    T::headers()
        .iter()
        .zip(item.row())
        .map(|(header, value)| format!("{}: {}", header, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a single item
pub fn render_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table(&[item]).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(item).unwrap_or_default(),
        OutputFormat::Plain => plain(item),
    }
}

/// Render a list of items; `None` when there is nothing to show
pub fn render_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) -> Option<String> {
    if items.is_empty() && format != OutputFormat::Json {
        return None;
    }

    Some(match format {
        OutputFormat::Table => table(&items.iter().collect::<Vec<_>>()).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Plain => items.iter().map(plain).collect::<Vec<_>>().join("\n---\n"),
    })
}

pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    println!("{}", render_item(item, format));
}

pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match render_list(items, format) {
        Some(out) => println!("{}", out),
        None => print_info("No items found."),
    }
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✘".red(), message.red());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: String,
        name: String,
    }

    impl TableDisplay for Row {
        fn headers() -> Vec<&'static str> {
            vec!["ID", "Name"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.id.clone(), self.name.clone()]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: "a".into(), name: "Alpha".into() },
            Row { id: "b".into(), name: "Beta".into() },
        ]
    }

    #[test]
    fn test_plain_list() {
        let out = render_list(&rows(), OutputFormat::Plain).unwrap();
        assert_eq!(out, "ID: a\nName: Alpha\n---\nID: b\nName: Beta");
    }

    #[test]
    fn test_json_list() {
        let out = render_list(&rows(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json[1]["name"], "Beta");
    }

    #[test]
    fn test_empty_list() {
        let empty: Vec<Row> = Vec::new();
        assert!(render_list(&empty, OutputFormat::Table).is_none());
        assert_eq!(render_list(&empty, OutputFormat::Json).unwrap(), "[]");
    }

    #[test]
    fn test_table_item() {
        let out = render_item(&rows()[0], OutputFormat::Table);
        assert!(out.contains("Alpha"));
        assert!(out.contains("Name"));
    }
}
