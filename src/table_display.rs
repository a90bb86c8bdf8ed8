use anyhow::Result;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use fleet_table::config::config::DisplayConfig;
use fleet_table::{ColumnDescriptor, SortDirection, TableRow, TableSnapshot};
use std::path::Path;

fn cell_text<R: TableRow>(row: &R, key: &str, null_text: &str) -> String {
    match row.value(key) {
        Some(value) if !value.is_null() => value.to_string(),
        _ => null_text.to_string(),
    }
}

fn header_text(column: &ColumnDescriptor, snapshot_sort: Option<&str>, direction: SortDirection) -> String {
    if snapshot_sort == Some(column.key.as_str()) {
        let arrow = match direction {
            SortDirection::Ascending => " ^",
            SortDirection::Descending => " v",
        };
        format!("{}{}", column.label, arrow)
    } else {
        column.label.clone()
    }
}

/// Render the current page as a terminal table
pub fn render_page<R: TableRow>(
    snapshot: &TableSnapshot<'_, R>,
    columns: &[ColumnDescriptor],
    display: &DisplayConfig,
) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|c| {
                Cell::new(header_text(c, snapshot.sort_column, snapshot.sort_direction))
                    .add_attribute(Attribute::Bold)
            })
            .collect::<Vec<_>>(),
    );

    for row in &snapshot.rows {
        table.add_row(
            columns
                .iter()
                .map(|c| cell_text(*row, &c.key, &display.null_text))
                .collect::<Vec<_>>(),
        );
    }

    table
}

pub fn display_page<R: TableRow>(
    snapshot: &TableSnapshot<'_, R>,
    columns: &[ColumnDescriptor],
    display: &DisplayConfig,
) {
    if snapshot.rows.is_empty() {
        println!("{}", "No records found.".yellow());
    } else {
        println!("{}", render_page(snapshot, columns, display));
    }

    if display.show_page_footer {
        println!(
            "{}",
            format!(
                "Page {} of {} | {} records | {:?} mode",
                snapshot.current_page,
                snapshot.total_pages,
                snapshot.total_filtered_records,
                snapshot.mode
            )
            .green()
        );
    }
}

/// Write the rows of the current page to a CSV file
pub fn export_to_csv<R: TableRow>(
    rows: &[&R],
    columns: &[ColumnDescriptor],
    path: &Path,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(columns.iter().map(|c| c.key.as_str()))?;
    for row in rows {
        wtr.write_record(columns.iter().map(|c| cell_text(*row, &c.key, "")))?;
    }
    wtr.flush()?;
    Ok(())
}
