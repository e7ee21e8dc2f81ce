//! The available / wanted summary table.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use condenv_core::Resolution;
use crossterm::style::Stylize;
use std::path::Path;

/// Build the two-column table; the shorter column is padded with blanks.
pub fn summary_table(resolution: &Resolution) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("available").fg(Color::Green),
            Cell::new("wanted").fg(Color::Yellow),
        ]);

    let rows = resolution.available.len().max(resolution.wanted.len());
    for i in 0..rows {
        let cell = |specs: &[condenv_schema::Specifier]| {
            specs.get(i).map(ToString::to_string).unwrap_or_default()
        };
        table.add_row(vec![cell(&resolution.available), cell(&resolution.wanted)]);
    }
    table
}

/// Print the summary table followed by a pointer to the log file.
pub fn print_summary(resolution: &Resolution, log_file: &Path) {
    println!();
    println!("{}", "Conda search result".bold());
    println!("{}", summary_table(resolution));
    println!("Details at {}", log_file.display().to_string().dim());
}
