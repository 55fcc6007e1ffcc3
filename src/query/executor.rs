//! The tree-walking evaluator (§4.6): dispatches on the AST's root
//! statement, binds identifiers against the current row, groups and
//! aggregates, and commits mutations back through the catalog's B+ trees.

use std::collections::BTreeMap;

use crate::catalog::table::{Column, Row, Table};
use crate::catalog::{Catalog, TableEntry};
use crate::error::{SqlError, SqlResult};
use crate::parser::ast::*;
use crate::value::Value;

use super::aggregate;
use super::expr::{eval_binary, eval_in_group, eval_scalar, truthy};
use super::result::{EvalResult, ResultRow};

/// Dispatches on the AST's root node and returns one of §4.6's four result
/// shapes.
pub fn evaluate(statement: &Statement, catalog: &mut Catalog) -> SqlResult<EvalResult> {
    match statement {
        Statement::Select(select) => eval_select(select, catalog),
        Statement::Insert(insert) => eval_insert(insert, catalog),
        Statement::Update(update) => eval_update(update, catalog),
        Statement::Delete(delete) => eval_delete(delete, catalog),
        Statement::CreateTable(create) => eval_create_table(create, catalog),
        Statement::DropTable(drop) => eval_drop_table(drop, catalog),
    }
}

// ---- SELECT ----------------------------------------------------------------

fn eval_select(select: &SelectStmt, catalog: &Catalog) -> SqlResult<EvalResult> {
    // Resolving the table honors an optional alias, but this dialect has no
    // qualified `table.column` identifiers to disambiguate, so the alias
    // carries no further weight beyond this lookup (§4.6 step 1).
    let entry = catalog.get_entry(&select.table.name)?;
    let table = &entry.table;

    let all_rows: Vec<Row> = entry.store.full_scan().into_iter().map(|(_, r)| r).collect();

    let filtered = match &select.where_clause {
        Some(expr) => filter_rows(expr, table, all_rows)?,
        None => all_rows,
    };

    let is_aggregated = !select.group_by.is_empty() || select.columns.iter().any(|c| c.is_aggregate());
    if is_aggregated {
        eval_aggregated(select, table, filtered)
    } else {
        eval_projection(select, table, filtered)
    }
}

fn filter_rows(expr: &Expr, table: &Table, rows: Vec<Row>) -> SqlResult<Vec<Row>> {
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if truthy(&eval_scalar(expr, table, &row)?) {
            kept.push(row);
        }
    }
    Ok(kept)
}

fn eval_projection(select: &SelectStmt, table: &Table, rows: Vec<Row>) -> SqlResult<EvalResult> {
    let mut results = Vec::with_capacity(rows.len());
    for row in &rows {
        results.push(project_row(&select.columns, table, row)?);
    }
    Ok(EvalResult::Rows(results))
}

fn project_row(columns: &[SelectItem], table: &Table, row: &Row) -> SqlResult<ResultRow> {
    let mut names = Vec::new();
    let mut values = Vec::new();
    for item in columns {
        match item {
            SelectItem::Wildcard => {
                for column in &table.columns {
                    names.push(column.name.clone());
                    values.push(table.get(row, &column.name).cloned().unwrap_or(Value::Null));
                }
            }
            SelectItem::Expr(Alias { expr, alias }) => {
                let value = eval_scalar(expr, table, row)?;
                names.push(alias.clone().unwrap_or_else(|| expr_label(expr, table)));
                values.push(value);
            }
        }
    }
    Ok(ResultRow::new(names, values))
}

/// GROUP BY groups the filtered set by the tuple of group-key values
/// formatted as `v1:v2:…` (§4.6 step 4); no GROUP BY means a single implicit
/// group holding every filtered row, even when that set is empty.
fn eval_aggregated(select: &SelectStmt, table: &Table, rows: Vec<Row>) -> SqlResult<EvalResult> {
    let mut groups: BTreeMap<String, Vec<Row>> = BTreeMap::new();
    if select.group_by.is_empty() {
        groups.entry(String::new()).or_default().extend(rows);
    } else {
        for row in rows {
            let key = group_key(&select.group_by, table, &row)?;
            groups.entry(key).or_default().push(row);
        }
    }
    // An empty result set with no GROUP BY still produces one output row
    // over the empty group (§4.6 step 4 "no GROUP BY ⇒ one output row").
    if groups.is_empty() && select.group_by.is_empty() {
        groups.insert(String::new(), Vec::new());
    }

    let mut results = Vec::with_capacity(groups.len());
    for group_rows in groups.into_values() {
        let result_row = project_group(&select.columns, table, &group_rows)?;
        if let Some(having) = &select.having {
            if !truthy(&eval_in_group(having, table, &group_rows, &result_row)?) {
                continue;
            }
        }
        results.push(result_row);
    }
    Ok(EvalResult::Rows(results))
}

fn group_key(group_by: &[String], table: &Table, row: &Row) -> SqlResult<String> {
    let mut parts = Vec::with_capacity(group_by.len());
    for name in group_by {
        let value = table
            .get(row, name)
            .ok_or_else(|| SqlError::column_not_found(name.clone()))?;
        parts.push(value.stringify());
    }
    Ok(parts.join(":"))
}

fn project_group(columns: &[SelectItem], table: &Table, group_rows: &[Row]) -> SqlResult<ResultRow> {
    let mut names = Vec::new();
    let mut values = Vec::new();
    let representative = group_rows.first();
    for item in columns {
        match item {
            SelectItem::Wildcard => {
                for column in &table.columns {
                    names.push(column.name.clone());
                    values.push(
                        representative
                            .and_then(|row| table.get(row, &column.name))
                            .cloned()
                            .unwrap_or(Value::Null),
                    );
                }
            }
            SelectItem::Expr(Alias { expr, alias }) => {
                let value = match expr {
                    Expr::Aggregate { kind, arg } => {
                        aggregate::compute(*kind, arg.as_deref(), table, group_rows)?
                    }
                    other => match representative {
                        Some(row) => eval_scalar(other, table, row)?,
                        None => Value::Null,
                    },
                };
                names.push(alias.clone().unwrap_or_else(|| expr_label(expr, table)));
                values.push(value);
            }
        }
    }
    Ok(ResultRow::new(names, values))
}

fn expr_label(expr: &Expr, table: &Table) -> String {
    match expr {
        Expr::Identifier(name) => table
            .column(name)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| name.clone()),
        Expr::Literal(v) => v.stringify(),
        Expr::Aggregate { kind, arg } => {
            let inner = match arg {
                None => "*".to_string(),
                Some(e) => expr_label(e, table),
            };
            format!("{}({})", aggregate_name(*kind), inner)
        }
        Expr::BinaryOp { .. } => "expr".to_string(),
    }
}

fn aggregate_name(kind: AggregateKind) -> &'static str {
    match kind {
        AggregateKind::Count => "COUNT",
        AggregateKind::Sum => "SUM",
        AggregateKind::Avg => "AVG",
        AggregateKind::Min => "MIN",
        AggregateKind::Max => "MAX",
    }
}

// ---- INSERT -----------------------------------------------------------------

fn eval_insert(insert: &InsertStmt, catalog: &mut Catalog) -> SqlResult<EvalResult> {
    let column_names = insert.columns.clone().unwrap_or_default();
    let entry = catalog.get_entry_mut(&insert.table)?;
    let TableEntry { table, store } = entry;

    let mut inserted = Vec::with_capacity(insert.values.len());
    for tuple in &insert.values {
        if tuple.len() != column_names.len() {
            return Err(SqlError::arity_error(column_names.len(), tuple.len()));
        }
        let mut values = Vec::with_capacity(tuple.len());
        for value_expr in tuple {
            values.push(eval_value_expr(value_expr)?);
        }
        // An existing primary key overwrites: insert is upsert (§4.6, §9).
        let row = table.build_row(&column_names, values)?;
        let key = table.primary_key_of(&row);
        store.insert(&key, row.clone())?;
        inserted.push(row_to_result(table, &row));
    }
    Ok(EvalResult::Rows(inserted))
}

/// Evaluates a value expression with no row context — valid for INSERT's
/// VALUES tuples, where the concrete grammar only produces literals but any
/// Expr is accepted (§4.6 "INSERT").
fn eval_value_expr(expr: &Expr) -> SqlResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::BinaryOp { left, op, right } => {
            let l = eval_value_expr(left)?;
            eval_binary(*op, l, || eval_value_expr(right))
        }
        Expr::Identifier(name) => Err(SqlError::column_not_found(name.clone())),
        Expr::Aggregate { .. } => Err(SqlError::syntax_error(
            "aggregate functions are not valid in VALUES",
            0,
            0,
        )),
    }
}

fn row_to_result(table: &Table, row: &Row) -> ResultRow {
    ResultRow::new(
        table.columns.iter().map(|c| c.name.clone()).collect(),
        row.values.clone(),
    )
}

// ---- UPDATE -----------------------------------------------------------------

fn eval_update(update: &UpdateStmt, catalog: &mut Catalog) -> SqlResult<EvalResult> {
    let entry = catalog.get_entry_mut(&update.table)?;
    let TableEntry { table, store } = entry;

    // Snapshot discipline: the tree is not safe to mutate while the scan
    // that drives the mutation is still iterating it (§4.6, §9).
    let snapshot: Vec<Row> = store.full_scan().into_iter().map(|(_, r)| r).collect();

    let mut count = 0usize;
    for row in snapshot {
        let matched = match &update.where_clause {
            Some(expr) => truthy(&eval_scalar(expr, table, &row)?),
            None => true,
        };
        if !matched {
            continue;
        }

        let old_key = table.primary_key_of(&row);
        let mut new_values = row.values.clone();
        for assignment in &update.assignments {
            let index = table
                .column_index(&assignment.column)
                .ok_or_else(|| SqlError::column_not_found(assignment.column.clone()))?;
            let raw = eval_scalar(&assignment.value, table, &row)?;
            new_values[index] = table.coerce(index, raw)?;
        }
        let new_row = Row::new(new_values);
        let new_key = table.primary_key_of(&new_row);
        if new_key != old_key {
            store.remove(&old_key)?;
        }
        store.insert(&new_key, new_row)?;
        count += 1;
    }
    Ok(EvalResult::RowCount(count))
}

// ---- DELETE -----------------------------------------------------------------

fn eval_delete(delete: &DeleteStmt, catalog: &mut Catalog) -> SqlResult<EvalResult> {
    let entry = catalog.get_entry_mut(&delete.table)?;
    let TableEntry { table, store } = entry;

    let snapshot: Vec<Row> = store.full_scan().into_iter().map(|(_, r)| r).collect();
    let mut count = 0usize;
    for row in snapshot {
        let matched = match &delete.where_clause {
            Some(expr) => truthy(&eval_scalar(expr, table, &row)?),
            None => true,
        };
        if matched {
            let key = table.primary_key_of(&row);
            store.remove(&key)?;
            count += 1;
        }
    }
    Ok(EvalResult::RowCount(count))
}

// ---- DDL --------------------------------------------------------------------

fn eval_create_table(create: &CreateTableStmt, catalog: &mut Catalog) -> SqlResult<EvalResult> {
    let columns = create
        .columns
        .iter()
        .map(|c| Column::new(c.name.clone(), c.data_type, c.is_primary_key, c.is_nullable, None))
        .collect();
    let table = Table::new(create.table.clone(), columns)?;
    catalog.create_table(table)?;
    Ok(EvalResult::Unit)
}

fn eval_drop_table(drop: &DropTableStmt, catalog: &mut Catalog) -> SqlResult<EvalResult> {
    catalog.drop_table(&drop.table)?;
    Ok(EvalResult::Unit)
}
