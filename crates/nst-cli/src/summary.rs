use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use nst_cli::types::{DeriveResult, FlattenResult, TableSummary};

pub fn print_flatten_summary(result: &FlattenResult) {
    println!("Batch: {}", result.batch.display());
    println!("Output: {}", result.output_dir.display());
    println!(
        "Events: {} decoded, {} kept, {} superseded, {} without key",
        result.events_decoded,
        result.dedupe.output,
        result.dedupe.duplicates_dropped,
        result.dedupe.missing_keys
    );
    if result.snapshots.is_empty() {
        println!("No snapshots written.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Snapshot"),
        header_cell("Records"),
        header_cell("File"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for summary in &result.snapshots {
        table.add_row(vec![
            Cell::new(&summary.prefix)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(summary.records),
            file_cell(summary.path.as_deref()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.total_records()).add_attribute(Attribute::Bold),
        if result.dry_run {
            dim_cell("dry run")
        } else {
            Cell::new(result.run_timestamp.format("%Y-%m-%d %H:%M:%S UTC"))
        },
    ]);
    println!("{table}");
}

pub fn print_derive_summary(result: &DeriveResult) {
    println!("Classification: {}", result.classification.display());
    println!("Output: {}", result.output_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Variables"),
        header_cell("Entities"),
        header_cell("Used"),
        header_cell("Filtered"),
        header_cell("Unrecognized"),
        header_cell("File"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_entities = 0usize;
    for summary in &result.tables {
        total_entities += summary.entities;
        table.add_row(table_row(summary));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_entities).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
}

fn table_row(summary: &TableSummary) -> Vec<Cell> {
    let name = Cell::new(summary.name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold);
    if summary.is_skipped() {
        return vec![
            name,
            Cell::new(summary.variables),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new(format!("skipped: no {}", summary.missing_sources.join(", ")))
                .fg(Color::Yellow),
        ];
    }
    vec![
        name,
        Cell::new(summary.variables),
        count_cell(summary.entities),
        count_cell(summary.stats.used),
        count_cell(summary.stats.filtered_out),
        count_cell(summary.stats.unrecognized),
        file_cell(summary.path.as_deref()),
    ]
}

fn file_cell(path: Option<&Path>) -> Cell {
    match path.and_then(Path::file_name) {
        Some(name) => Cell::new(name.to_string_lossy()).fg(Color::Green),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
