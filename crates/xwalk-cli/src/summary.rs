use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use xwalk_cli::types::BuildResult;
use xwalk_model::{AuditCheck, CheckStatus};

pub fn print_summary(result: &BuildResult) {
    println!("Output: {}", result.output_dir.display());
    if result.dry_run {
        println!("Dry run: no files written");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Records"),
        header_cell("Usage"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    table.add_row(vec![
        Cell::new("Usage records"),
        Cell::new(result.records),
        Cell::new(format_usage(result.usage)),
    ]);
    table.add_row(vec![
        Cell::new("Placeholders dropped"),
        count_cell(result.placeholder_rows, Color::Yellow),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        Cell::new("Exact matches"),
        Cell::new(result.exact_matches),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        Cell::new("Fuzzy matches"),
        Cell::new(result.fuzzy_matches),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        Cell::new("Unmatched"),
        count_cell(result.unmatched_records, Color::Yellow),
        Cell::new(format_usage(result.unmatched_usage)),
    ]);
    table.add_row(vec![
        Cell::new("Ambiguous"),
        count_cell(result.ambiguity.ambiguous_records, Color::Yellow),
        Cell::new(format!(
            "{} ({:.1}%)",
            format_usage(result.ambiguity.ambiguous_usage),
            result.ambiguity.usage_share * 100.0
        )),
    ]);
    table.add_row(vec![
        Cell::new("Rows without wages"),
        count_cell(result.rows_without_wages, Color::Yellow),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        Cell::new("Crosswalk rows")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.crosswalk_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_audit_table(&result.report.checks);

    for file in &result.written {
        match file.rows {
            Some(rows) => println!("wrote {} ({rows} rows)", file.path.display()),
            None => println!("wrote {}", file.path.display()),
        }
    }
    if result.blocked() {
        eprintln!("Audit failed; crosswalk not written. Failing checks:");
        for check in result.report.failures() {
            eprintln!("- {}: {}", check.name, check.detail);
        }
    }
}

fn print_audit_table(checks: &[AuditCheck]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Status"),
        header_cell("Value"),
        header_cell("Expected"),
        header_cell("Discrepancy"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for check in checks {
        table.add_row(vec![
            Cell::new(&check.name),
            status_cell(check.status),
            Cell::new(format_usage(check.value)),
            optional_cell(check.expected),
            optional_cell(check.discrepancy),
        ]);
    }
    println!();
    println!("Audit:");
    println!("{table}");
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
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn format_usage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

fn status_cell(status: CheckStatus) -> Cell {
    match status {
        CheckStatus::Pass => Cell::new(status.as_str()).fg(Color::Green),
        CheckStatus::Fail => Cell::new(status.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        CheckStatus::Info => dim_cell(status.as_str()),
    }
}

fn optional_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format_usage(value)),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
