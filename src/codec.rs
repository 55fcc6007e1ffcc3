//! The whole-file binary page codec (§4.2, §6): a hand-written reader/writer
//! pair over the catalog's tables and rows. Built on `to_le_bytes`/
//! `from_le_bytes` and a length-prefixed UTF-8 string encoding rather than a
//! general-purpose serialization crate, since the wire format (forced-false
//! nullable bit on primary keys, 16-byte fixed-point DECIMAL, bespoke
//! DATETIME/DATE tick encodings) is bespoke enough that a derive-based
//! serializer would fight it rather than produce it.

use std::io::{self, Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::btree::BPlusTree;
use crate::catalog::table::{Column, Row, Table};
use crate::catalog::Catalog;
use crate::decimal::Decimal;
use crate::error::{SqlError, SqlResult};
use crate::value::{DataType, Value};

fn io_err(e: io::Error) -> SqlError {
    SqlError::corrupt_database(format!("I/O error: {e}"))
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> SqlResult<()> {
    w.write_all(&v.to_le_bytes()).map_err(io_err)
}

fn read_u32<R: Read>(r: &mut R) -> SqlResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(io_err)?;
    Ok(u32::from_le_bytes(buf))
}

fn write_bool<W: Write>(w: &mut W, v: bool) -> SqlResult<()> {
    w.write_all(&[v as u8]).map_err(io_err)
}

fn read_bool<R: Read>(r: &mut R) -> SqlResult<bool> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf).map_err(io_err)?;
    Ok(buf[0] != 0)
}

fn write_string<W: Write>(w: &mut W, s: &str) -> SqlResult<()> {
    let bytes = s.as_bytes();
    write_u32(w, bytes.len() as u32)?;
    w.write_all(bytes).map_err(io_err)
}

fn read_string<R: Read>(r: &mut R) -> SqlResult<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(io_err)?;
    String::from_utf8(buf).map_err(|e| SqlError::corrupt_database(format!("invalid UTF-8: {e}")))
}

/// DATETIME's on-disk epoch: microseconds since 1970-01-01T00:00:00 UTC,
/// treating the stored `NaiveDateTime` as if it were UTC (this dialect has no
/// time zones).
fn datetime_to_ticks(dt: &NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_micros()
}

fn ticks_to_datetime(ticks: i64) -> SqlResult<NaiveDateTime> {
    DateTime::from_timestamp_micros(ticks)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| SqlError::corrupt_database("invalid DATETIME ticks"))
}

fn date_to_day_number(d: &NaiveDate) -> i32 {
    d.num_days_from_ce()
}

fn day_number_to_date(days: i32) -> SqlResult<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days)
        .ok_or_else(|| SqlError::corrupt_database("invalid DATE day number"))
}

fn write_value<W: Write>(w: &mut W, value: &Value) -> SqlResult<()> {
    write_bool(w, value.is_null())?;
    if value.is_null() {
        return Ok(());
    }
    match value {
        Value::Integer(i) => w.write_all(&i.to_le_bytes()).map_err(io_err)?,
        Value::Decimal(d) => w.write_all(&d.raw_units().to_le_bytes()).map_err(io_err)?,
        Value::Boolean(b) => write_bool(w, *b)?,
        Value::DateTime(dt) => {
            let ticks = datetime_to_ticks(dt);
            w.write_all(&ticks.to_le_bytes()).map_err(io_err)?
        }
        Value::Date(d) => {
            let days = date_to_day_number(d);
            w.write_all(&days.to_le_bytes()).map_err(io_err)?
        }
        Value::Text(s) => write_string(w, s)?,
        Value::Null => unreachable!("handled above"),
    }
    Ok(())
}

fn read_value<R: Read>(r: &mut R, data_type: DataType) -> SqlResult<Value> {
    if read_bool(r)? {
        return Ok(Value::Null);
    }
    match data_type {
        DataType::Int => {
            let mut buf = [0u8; 4];
            r.read_exact(&mut buf).map_err(io_err)?;
            Ok(Value::Integer(i32::from_le_bytes(buf)))
        }
        DataType::Decimal => {
            let mut buf = [0u8; 16];
            r.read_exact(&mut buf).map_err(io_err)?;
            Ok(Value::Decimal(Decimal::from_raw_units(i128::from_le_bytes(buf))))
        }
        DataType::Boolean => Ok(Value::Boolean(read_bool(r)?)),
        DataType::DateTime => {
            let mut buf = [0u8; 8];
            r.read_exact(&mut buf).map_err(io_err)?;
            Ok(Value::DateTime(ticks_to_datetime(i64::from_le_bytes(buf))?))
        }
        DataType::Date => {
            let mut buf = [0u8; 4];
            r.read_exact(&mut buf).map_err(io_err)?;
            Ok(Value::Date(day_number_to_date(i32::from_le_bytes(buf))?))
        }
        DataType::Varchar | DataType::Text => Ok(Value::Text(read_string(r)?)),
    }
}

fn write_column<W: Write>(w: &mut W, column: &Column) -> SqlResult<()> {
    write_string(w, &column.name)?;
    write_string(w, column.data_type.tag())?;
    write_bool(w, column.is_primary_key)?;
    write_bool(w, column.is_nullable)?;
    Ok(())
}

fn read_column<R: Read>(r: &mut R) -> SqlResult<Column> {
    let name = read_string(r)?;
    let tag = read_string(r)?;
    let data_type = DataType::from_tag(&tag)
        .ok_or_else(|| SqlError::corrupt_database(format!("unknown data type tag: {tag}")))?;
    let is_primary_key = read_bool(r)?;
    let is_nullable = read_bool(r)?;
    Ok(Column::new(name, data_type, is_primary_key, is_nullable, None))
}

fn write_table<W: Write>(w: &mut W, table: &Table, rows: &[Row]) -> SqlResult<()> {
    write_string(w, &table.name)?;
    write_u32(w, table.columns.len() as u32)?;
    for column in &table.columns {
        write_column(w, column)?;
    }
    write_u32(w, rows.len() as u32)?;
    for row in rows {
        for value in &row.values {
            write_value(w, value)?;
        }
    }
    Ok(())
}

fn read_table<R: Read>(r: &mut R) -> SqlResult<(Table, Vec<Row>)> {
    let name = read_string(r)?;
    let column_count = read_u32(r)? as usize;
    let mut columns = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        columns.push(read_column(r)?);
    }
    let table = Table::new(name, columns)?;

    let record_count = read_u32(r)? as usize;
    let mut rows = Vec::with_capacity(record_count);
    for _ in 0..record_count {
        let mut values = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            values.push(read_value(r, column.data_type)?);
        }
        rows.push(Row::new(values));
    }
    Ok((table, rows))
}

/// Rewrites the entire catalog to `writer` (§4.2's "no incremental updates").
pub fn save<W: Write>(catalog: &Catalog, writer: &mut W) -> SqlResult<()> {
    let mut names = catalog.table_names();
    names.sort();
    write_u32(writer, names.len() as u32)?;
    for name in names {
        let entry = catalog.get_entry(&name)?;
        let rows: Vec<Row> = entry.store.full_scan().into_iter().map(|(_, row)| row).collect();
        write_table(writer, &entry.table, &rows)?;
    }
    Ok(())
}

/// Rebuilds a catalog from `reader`, re-running every table insert through
/// the ordinary B+ tree `insert` path (so the leaf chain and structural
/// invariants are established exactly as they would be from live inserts)
/// and re-validating each tree before returning (§4.2).
pub fn load<R: Read>(reader: &mut R, btree_order: usize) -> SqlResult<Catalog> {
    let mut catalog = Catalog::new(btree_order);
    let table_count = read_u32(reader)?;
    for _ in 0..table_count {
        let (table, rows) = read_table(reader)?;
        let mut store = BPlusTree::new(btree_order)?;
        for row in rows {
            let key = table.primary_key_of(&row);
            store.insert(&key, row)?;
        }
        if !store.validate() {
            return Err(SqlError::corrupt_database(format!(
                "table '{}' failed structural validation after load",
                table.name
            )));
        }
        catalog.insert_table_entry(table, store);
    }
    Ok(catalog)
}

/// Convenience wrapper over [`save`] for a path on disk. Opens, writes, and
/// closes the file scoped to this call (§5 "resource acquisition").
pub fn save_to_path(catalog: &Catalog, path: &Path) -> SqlResult<()> {
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    save(catalog, &mut file)
}

/// Convenience wrapper over [`load`] for a path on disk.
pub fn load_from_path(path: &Path, btree_order: usize) -> SqlResult<Catalog> {
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    load(&mut file, btree_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DataType;
    use std::io::Cursor;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new(4);
        let table = Table::new(
            "users",
            vec![
                Column::new("id", DataType::Int, true, false, None),
                Column::new("name", DataType::Varchar, false, true, None),
                Column::new("balance", DataType::Decimal, false, true, None),
                Column::new("active", DataType::Boolean, false, true, Some(Value::Boolean(true))),
            ],
        )
        .unwrap();
        catalog.create_table(table).unwrap();
        let entry = catalog.get_entry_mut("users").unwrap();
        entry
            .store
            .insert(
                "1",
                Row::new(vec![
                    Value::Integer(1),
                    Value::Text("Alice".into()),
                    Value::Decimal("10.5".parse().unwrap()),
                    Value::Boolean(true),
                ]),
            )
            .unwrap();
        entry
            .store
            .insert(
                "2",
                Row::new(vec![Value::Integer(2), Value::Null, Value::Null, Value::Boolean(false)]),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn save_then_load_round_trips_rows_and_schema() {
        let catalog = sample_catalog();
        let mut buf = Vec::new();
        save(&catalog, &mut buf).unwrap();

        let loaded = load(&mut Cursor::new(buf), 4).unwrap();
        let table = loaded.get_table("users").unwrap();
        assert_eq!(table.columns.len(), 4);

        let entry = loaded.get_entry("users").unwrap();
        let row = entry.store.get("1").unwrap();
        assert_eq!(row.values[1], Value::Text("Alice".into()));
        assert_eq!(row.values[2], Value::Decimal("10.5".parse().unwrap()));

        let row2 = entry.store.get("2").unwrap();
        assert_eq!(row2.values[1], Value::Null);
    }

    #[test]
    fn save_then_load_preserves_table_count_and_names() {
        let catalog = sample_catalog();
        let mut buf = Vec::new();
        save(&catalog, &mut buf).unwrap();
        let loaded = load(&mut Cursor::new(buf), 4).unwrap();
        assert_eq!(loaded.table_names(), vec!["users".to_string()]);
    }

    #[test]
    fn unknown_data_type_tag_is_corrupt_database() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 1).unwrap();
        write_string(&mut buf, "t").unwrap();
        write_u32(&mut buf, 1).unwrap();
        write_string(&mut buf, "id").unwrap();
        write_string(&mut buf, "NOT_A_TYPE").unwrap();
        write_bool(&mut buf, true).unwrap();
        write_bool(&mut buf, false).unwrap();
        write_u32(&mut buf, 0).unwrap();

        let result = load(&mut Cursor::new(buf), 4);
        assert!(matches!(result, Err(SqlError::CorruptDatabase { .. })));
    }

    #[test]
    fn round_trip_through_a_real_file() {
        let catalog = sample_catalog();
        let file = tempfile::NamedTempFile::new().unwrap();
        save_to_path(&catalog, file.path()).unwrap();
        let loaded = load_from_path(file.path(), 4).unwrap();
        assert_eq!(loaded.table_names(), vec!["users".to_string()]);
    }
}
