//! Terminal tables for field previews, batch decisions and mapping rows.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use ecs_map::{MappingsTable, ResultRow, format_confidence};
use ecs_model::{BatchInputItem, DbStatus, MappingRow};

/// Preview of the fields a batch would submit.
pub fn fields_table(items: &[BatchInputItem]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Sample")]);
    apply_table_style(&mut table);
    for item in items {
        table.add_row(vec![Cell::new(&item.field), Cell::new(&item.description)]);
    }
    table
}

/// One row per classifier decision, in response order.
pub fn results_table(rows: &[ResultRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("ECS Field"),
        header_cell("Type"),
        header_cell("Confidence"),
        header_cell("Status"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.field).fg(Color::Blue),
            optional_cell(row.mapped_field_name.as_deref()),
            optional_cell(row.mapping_type.as_deref()),
            confidence_cell(&row.confidence),
            status_cell(row.db_status),
        ]);
    }
    table
}

/// Persisted mappings of the visible page.
pub fn mappings_table(rows: &[&MappingRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Sourcetype"),
        header_cell("Source Field"),
        header_cell("ECS Field"),
        header_cell("Type"),
        header_cell("Confidence"),
        header_cell("Verified"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);
    for row in rows {
        table.add_row(vec![
            dim_cell(&row.id),
            Cell::new(&row.sourcetype),
            Cell::new(&row.source_field).fg(Color::Blue),
            Cell::new(&row.mapped_field_name),
            optional_cell(row.mapping_type.as_deref()),
            row.confidence
                .map_or_else(|| dim_cell("-"), |c| confidence_cell(&format_confidence(c))),
            verified_cell(row.human_verified),
        ]);
    }
    table
}

/// `Page X of Y` line under the mappings table.
pub fn page_footer(table: &MappingsTable) -> String {
    format!(
        "Page {} of {} ({} mappings)",
        table.page(),
        table.total_pages(),
        table.total()
    )
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() == 2 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::UpperBoundary(Width::Percentage(55)),
        ]);
    }
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
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

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) if !value.is_empty() => Cell::new(value),
        _ => dim_cell("-"),
    }
}

fn confidence_cell(confidence: &str) -> Cell {
    let color = match confidence.parse::<f64>() {
        Ok(value) if value >= 0.8 => Color::Green,
        Ok(value) if value >= 0.5 => Color::Yellow,
        _ => Color::Red,
    };
    Cell::new(confidence).fg(color)
}

fn status_cell(status: Option<DbStatus>) -> Cell {
    match status {
        Some(DbStatus::Inserted) => Cell::new("inserted")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(status) => dim_cell(status.label()),
        None => dim_cell("-"),
    }
}

fn verified_cell(verified: bool) -> Cell {
    if verified {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
