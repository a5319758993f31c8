//! Table formatting for CLI output

use clap::ValueEnum;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Padding, Style},
    Table, Tabled,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One stored key as shown by `cv list`
#[derive(Debug, Clone, Tabled)]
pub struct EntryRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Modified")]
    pub modified: String,
}

/// One effective setting as shown by `cv settings`
#[derive(Debug, Clone, Tabled)]
pub struct SettingRow {
    #[tabled(rename = "Setting")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Rounded table with a centered header row
pub fn format_table<T: Tabled>(rows: &[T], no_color: bool) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Padding::new(1, 1, 0, 0));

    if !no_color {
        table.with(Modify::new(Rows::first()).with(Color::FG_BLUE));
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_has_headers_and_rows() {
        let rows = vec![EntryRow {
            key: "port".to_string(),
            value: "8080".to_string(),
            kind: "str".to_string(),
            modified: "-".to_string(),
        }];
        let output = format_table(&rows, true);
        assert!(output.contains("Key"));
        assert!(output.contains("Modified"));
        assert!(output.contains("8080"));
        assert!(output.contains('╭'));
    }
}
