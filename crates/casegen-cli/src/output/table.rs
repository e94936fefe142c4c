//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};
use serde::Serialize;

/// The fragments of one checked template line.
#[derive(Debug, Serialize)]
pub struct LineFragments {
    /// 1-based line number in the template.
    pub line: usize,
    pub name: Option<String>,
    pub declared_type: String,
    pub constraint: Option<String>,
    pub assertion: Option<String>,
    /// Suffix with escapes shown, e.g. `\n`.
    pub suffix: String,
}

/// Format checked lines as an ASCII table.
pub fn format_fragment_table(lines: &[LineFragments]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Line",
        "Name",
        "Type",
        "Constraint",
        "Assertion",
        "Suffix",
    ]);

    for line in lines {
        table.add_row(vec![
            line.line.to_string(),
            line.name.clone().unwrap_or_default(),
            line.declared_type.clone(),
            line.constraint.clone().unwrap_or_default(),
            line.assertion.clone().unwrap_or_default(),
            line.suffix.clone(),
        ]);
    }

    table
}
