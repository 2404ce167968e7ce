use std::collections::HashMap;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use crate::table::Table;

/// Display style options for output formatting
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DisplayStyle {
    /// Display data in a formatted table
    Table,
    /// Display data in JSON format
    Json,
    /// Display data in CSV format
    Csv,
}

/// Trait for types that can be displayed in terminal with different formats
pub trait TerminalDisplay {
    /// Returns the column titles for table and CSV display
    fn table_titles() -> Vec<&'static str>;
    /// Converts the instance into a row of strings for table display
    fn table_row(self) -> Vec<String>;
    /// Converts the instance into a map of column title to value for CSV display
    fn csv_row(self) -> HashMap<&'static str, String>;
}

pub fn pretty_json<T: Serialize>(o: T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&o)?);
    Ok(())
}

pub fn display_list<T>(items: Vec<T>, style: DisplayStyle) -> Result<()>
where
    T: Serialize + TerminalDisplay,
{
    match style {
        DisplayStyle::Table => {
            if items.is_empty() {
                println!("<empty list>");
                return Ok(());
            }
            let mut table = Table::with_capacity(items.len() + 1);
            let titles = T::table_titles();
            table.add(titles.iter().map(|s| s.to_string()).collect());

            for item in items {
                table.add(item.table_row());
            }
            table.show();
        }
        DisplayStyle::Csv => {
            let titles = T::table_titles();
            println!("{}", titles.join(","));
            for item in items {
                let mut row = item.csv_row();
                let values: Vec<String> = titles
                    .iter()
                    .map(|title| row.remove(title).unwrap_or_default())
                    .collect();
                println!("{}", values.join(","));
            }
        }
        DisplayStyle::Json => pretty_json(items)?,
    }
    Ok(())
}
