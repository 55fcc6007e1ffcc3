//! The result pretty-printer (§6 "Result formatter"): pure functions from an
//! [`EvalResult`] to the string the CLI prints, kept separate from the
//! evaluator so they can be tested without a catalog in scope.

use crate::query::EvalResult;

/// Formats one evaluator result per §6: null renders a success message, a
/// row count renders "N rows affected", and a row list renders an ASCII
/// table (or "No rows returned." when empty).
pub fn format_result(result: &EvalResult) -> String {
    match result {
        EvalResult::Unit => "Query executed successfully".to_string(),
        EvalResult::RowCount(n) => format!("Query executed successfully. {n} rows affected"),
        EvalResult::Rows(rows) => format_rows(rows),
    }
}

fn format_rows(rows: &[crate::query::ResultRow]) -> String {
    let Some(first) = rows.first() else {
        return "No rows returned.".to_string();
    };
    let columns = &first.columns;

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.values.iter().map(|v| v.stringify()).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .max()
                .unwrap_or(0)
                .max(col.len())
        })
        .collect();

    let rule = build_rule(&widths);
    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&build_row(columns, &widths));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for row in &cells {
        out.push_str(&build_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&rule);
    out
}

fn build_rule(widths: &[usize]) -> String {
    let mut rule = String::from("+");
    for w in widths {
        rule.push_str(&"-".repeat(w + 2));
        rule.push('+');
    }
    rule
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut row = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        row.push(' ');
        row.push_str(cell);
        row.push_str(&" ".repeat(width - cell.len()));
        row.push_str(" |");
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ResultRow;
    use crate::value::Value;

    #[test]
    fn null_result_is_success_message() {
        assert_eq!(format_result(&EvalResult::Unit), "Query executed successfully");
    }

    #[test]
    fn row_count_result_reports_affected_rows() {
        assert_eq!(
            format_result(&EvalResult::RowCount(3)),
            "Query executed successfully. 3 rows affected"
        );
    }

    #[test]
    fn empty_row_list_reports_no_rows() {
        assert_eq!(format_result(&EvalResult::Rows(vec![])), "No rows returned.");
    }

    #[test]
    fn row_list_renders_as_padded_ascii_table() {
        let rows = vec![
            ResultRow::new(
                vec!["id".to_string(), "name".to_string()],
                vec![Value::Integer(1), Value::Text("Alice".to_string())],
            ),
            ResultRow::new(
                vec!["id".to_string(), "name".to_string()],
                vec![Value::Integer(2), Value::Null],
            ),
        ];
        let out = format_result(&EvalResult::Rows(rows));
        let expected = "+----+-------+\n\
                         | id | name  |\n\
                         +----+-------+\n\
                         | 1  | Alice |\n\
                         | 2  | null  |\n\
                         +----+-------+";
        assert_eq!(out, expected);
    }
}
