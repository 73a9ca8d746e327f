use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::StringRecord;

use super::error::LoadError;
use super::model::{declared_type, ColumnDef, ColumnType, Dataset, Row, Table, ORDER_SCHEMA};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the orders dataset from a comma-delimited file with a header row.
///
/// The header must name every column of the declared order schema; other
/// columns (order/customer identifiers and the like) are kept as text.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    if !path.is_file() {
        log::error!("Data file not found: {}", path.display());
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match load_csv(path) {
        Ok(table) => {
            log::info!(
                "Loaded {} orders with {} columns from {}",
                table.len(),
                table.width(),
                path.display()
            );
            let dataset = Dataset::from_table(table);
            if dataset.is_empty() {
                log::warn!("{} has a header but no orders", path.display());
            }
            Ok(dataset)
        }
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", path.display());
            Err(LoadError::Parse {
                message: format!("{e:#}"),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every row must have as many fields as the header, and every declared
/// column must parse as its type.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let columns = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        // +2: one for the header line, one for 1-based numbering.
        let line = row_no + 2;
        let record = result.with_context(|| format!("CSV line {line}"))?;
        rows.push(parse_row(&record, &columns, line)?);
    }

    Ok(Table::new(columns, rows))
}

/// Match the header against the declared schema.
fn resolve_columns(headers: &StringRecord) -> Result<Vec<ColumnDef>> {
    let missing: Vec<&str> = ORDER_SCHEMA
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !headers.iter().any(|h| h.trim() == *name))
        .collect();
    if !missing.is_empty() {
        bail!("CSV missing required column(s): {}", missing.join(", "));
    }

    Ok(headers
        .iter()
        .map(|h| {
            let name = h.trim();
            ColumnDef::new(name, declared_type(name).unwrap_or(ColumnType::Text))
        })
        .collect())
}

fn parse_row(record: &StringRecord, columns: &[ColumnDef], line: usize) -> Result<Row> {
    if record.len() != columns.len() {
        bail!(
            "CSV line {line}: expected {} fields but found {}",
            columns.len(),
            record.len()
        );
    }
    columns
        .iter()
        .zip(record.iter())
        .map(|(col, raw)| {
            col.kind
                .parse_cell(raw)
                .with_context(|| format!("CSV line {line}, column '{}'", col.name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::data::model::{Value, ORDER_YEAR, PAYMENT_METHOD};

    const HEADER: &str = "order_id,order_year,order_month,order_day,order_hour,\
delivery_year,delivery_month,delivery_day,delivery_hour,order_value,delivery_fee,\
commission_fee,discount_value,payment_method,discount_source,discounts_and_offers";

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{contents}").unwrap();
        tmp
    }

    #[test]
    fn loads_declared_and_extra_columns() {
        let tmp = write_csv(&format!(
            "{HEADER}\n\
             A1,2015,1,3,12,2015,1,3,13,250.0,30,25.5,0,Credit Card,Restaurant,10% off\n\
             A2,2020,6,9,19,2020,6,9,20,100.5,0,10,5,Cash,,\n"
        ));

        let ds = load_file(tmp.path()).unwrap();
        let table = ds.table();
        assert_eq!(ds.len(), 2);
        assert_eq!(table.width(), 16);
        assert_eq!(table.column_type("order_id"), Some(ColumnType::Text));
        assert_eq!(table.column_type(ORDER_YEAR), Some(ColumnType::Integer));
        assert_eq!(
            ds.unique_values(ORDER_YEAR),
            &[Value::Integer(2015), Value::Integer(2020)]
        );
        assert_eq!(
            table.values(PAYMENT_METHOD).cloned().collect::<Vec<_>>(),
            vec![Value::Text("Credit Card".into()), Value::Text("Cash".into())]
        );
        // Empty cells are missing, not errors.
        assert_eq!(table.rows()[1][14], Value::Missing);
    }

    #[test]
    fn nonexistent_path_is_file_not_found() {
        let err = load_file(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn directory_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn missing_required_column_is_parse_error() {
        let header = HEADER.replace(",payment_method", "");
        let tmp = write_csv(&format!(
            "{header}\nA1,2015,1,3,12,2015,1,3,13,250.0,30,25.5,0,Restaurant,10% off\n"
        ));

        let err = load_file(tmp.path()).unwrap_err();
        match err {
            LoadError::Parse { message } => assert!(message.contains("payment_method")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn type_mismatch_is_parse_error() {
        let tmp = write_csv(&format!(
            "{HEADER}\nA1,twenty,1,3,12,2015,1,3,13,250.0,30,25.5,0,Cash,Restaurant,None\n"
        ));

        let err = load_file(tmp.path()).unwrap_err();
        match err {
            LoadError::Parse { message } => {
                assert!(message.contains("line 2"), "{message}");
                assert!(message.contains("order_year"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn ragged_row_is_parse_error() {
        let tmp = write_csv(&format!("{HEADER}\nA1,2015,1,3\n"));
        assert!(matches!(
            load_file(tmp.path()).unwrap_err(),
            LoadError::Parse { .. }
        ));
    }

    #[test]
    fn invalid_utf8_is_parse_error() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "{HEADER}").unwrap();
        tmp.write_all(b"A1,2015,1,3,12,2015,1,3,13,250.0,30,25.5,0,\xff\xfe,Restaurant,None\n")
            .unwrap();
        assert!(matches!(
            load_file(tmp.path()).unwrap_err(),
            LoadError::Parse { .. }
        ));
    }

    #[test]
    fn out_of_range_integer_is_parse_error() {
        let tmp = write_csv(&format!(
            "{HEADER}\nA1,1e19,1,3,12,2015,1,3,13,250.0,30,25.5,0,Cash,Restaurant,None\n"
        ));

        match load_file(tmp.path()).unwrap_err() {
            LoadError::Parse { message } => assert!(message.contains("out of range"), "{message}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn header_only_file_is_empty_dataset() {
        let tmp = write_csv(&format!("{HEADER}\n"));
        let ds = load_file(tmp.path()).unwrap();
        assert!(ds.is_empty());
        assert!(ds.unique_values(ORDER_YEAR).is_empty());
    }
}
