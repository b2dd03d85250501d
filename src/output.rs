//! Output formatting for the command-line tool.
//!
//! Renders tables, result sets, scalar values and batch outcomes as an ASCII
//! table (like the MySQL CLI), a markdown table, or JSON.

use crate::config::OutputFormat;
use crate::models::{BatchOutcome, ScalarValue, TabularResult, TabularResultSet, TypeCategory};
use serde::Serialize;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

fn format_value(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Json(json) => serde_json::to_string(json).unwrap_or_default(),
        other => other.to_string(),
    }
}

fn is_numeric(value: &ScalarValue) -> bool {
    matches!(
        value,
        ScalarValue::Int(_) | ScalarValue::UInt(_) | ScalarValue::Float(_) | ScalarValue::Decimal(_)
    )
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    if right_align {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

fn center(text: &str, width: usize) -> String {
    let total = width.saturating_sub(text.width());
    let left = total / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(total - left))
}

pub fn format_as_table(table: &TabularResult, elapsed: Duration) -> String {
    if table.columns.is_empty() {
        return "Empty set".to_string();
    }

    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(format_value).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.name.width()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let mut output = String::new();
    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    output.push_str(&separator);
    let header: String = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("| {} ", center(&col.name, *w)))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for (row, row_cells) in table.rows.iter().zip(&cells) {
        let row_str: String = row
            .iter()
            .zip(row_cells)
            .zip(&widths)
            .map(|((value, cell), w)| format!("| {} ", pad(cell, *w, is_numeric(value))))
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&separator);

    let row_count = table.row_count();
    let row_text = if row_count == 1 { "row" } else { "rows" };
    output.push_str(&format!(
        "{} {} in set ({:.2} sec)\n",
        row_count,
        row_text,
        elapsed.as_secs_f64()
    ));

    output
}

pub fn format_as_markdown(table: &TabularResult) -> String {
    if table.columns.is_empty() {
        return "*Empty set*".to_string();
    }

    let mut output = String::new();

    let header: String = table
        .columns
        .iter()
        .map(|c| format!("| {} ", c.name))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);

    let sep: String = table
        .columns
        .iter()
        .map(|c| match c.category {
            TypeCategory::Integer | TypeCategory::Float | TypeCategory::Decimal => "|---:",
            _ => "|---",
        })
        .collect::<String>()
        + "|\n";
    output.push_str(&sep);

    for row in &table.rows {
        let row_str: String = row
            .iter()
            .map(|value| format!("| {} ", format_value(value).replace('|', "\\|")))
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&format!("\n*{} rows*", table.row_count()));

    output
}

/// JSON shape of a table: column names plus rows keyed by column.
#[derive(Serialize)]
struct JsonTable<'a> {
    name: &'a str,
    columns: &'a [crate::models::ColumnMetadata],
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
    row_count: usize,
}

impl<'a> From<&'a TabularResult> for JsonTable<'a> {
    fn from(table: &'a TabularResult) -> Self {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                table
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, value)| {
                        (
                            col.name.clone(),
                            serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                        )
                    })
                    .collect()
            })
            .collect();
        Self {
            name: &table.name,
            columns: &table.columns,
            rows,
            row_count: table.row_count(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Render one table in the requested format.
pub fn render_table(table: &TabularResult, format: OutputFormat, elapsed: Duration) -> String {
    match format {
        OutputFormat::Table => format_as_table(table, elapsed),
        OutputFormat::Markdown => format_as_markdown(table),
        OutputFormat::Json => to_json(&JsonTable::from(table)),
    }
}

/// Render every table of a set, each preceded by its name.
pub fn render_result_set(set: &TabularResultSet, format: OutputFormat, elapsed: Duration) -> String {
    match format {
        OutputFormat::Json => {
            let tables: Vec<JsonTable<'_>> = set.iter().map(JsonTable::from).collect();
            to_json(&tables)
        }
        _ if set.is_empty() => match format {
            OutputFormat::Markdown => "*Empty set*".to_string(),
            _ => "Empty set".to_string(),
        },
        OutputFormat::Markdown => set
            .iter()
            .map(|table| format!("### {}\n\n{}", table.name, format_as_markdown(table)))
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Table => set
            .iter()
            .map(|table| format!("{}:\n{}", table.name, format_as_table(table, elapsed)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render the result of a scalar lookup; `None` means the query returned no rows.
pub fn render_scalar(value: Option<&ScalarValue>, format: OutputFormat) -> String {
    match (format, value) {
        (OutputFormat::Json, value) => to_json(&value),
        (_, Some(value)) => format_value(value),
        (_, None) => "(no rows)".to_string(),
    }
}

pub fn render_rows_affected(rows_affected: u64, format: OutputFormat, elapsed: Duration) -> String {
    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ "rows_affected": rows_affected })),
        _ => {
            let row_text = if rows_affected == 1 { "row" } else { "rows" };
            format!(
                "Query OK, {} {} affected ({:.2} sec)",
                rows_affected,
                row_text,
                elapsed.as_secs_f64()
            )
        }
    }
}

pub fn render_batch(outcome: &BatchOutcome, format: OutputFormat, elapsed: Duration) -> String {
    match (format, &outcome.error) {
        (OutputFormat::Json, _) => to_json(outcome),
        (_, None) => render_rows_affected(outcome.rows_affected, format, elapsed),
        (_, Some(error)) => format!(
            "Batch stopped after {} affected rows: {}",
            outcome.rows_affected, error
        ),
    }
}
