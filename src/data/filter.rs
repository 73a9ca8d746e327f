use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{
    ColumnDef, ColumnType, Dataset, Table, Value, COMMISSION_FEE, COMMISSION_PERCENTAGE,
    ORDER_DAY, ORDER_MONTH, ORDER_VALUE, ORDER_YEAR,
};

// ---------------------------------------------------------------------------
// Filter criteria: one selected value per date column
// ---------------------------------------------------------------------------

/// The (year, month, day) selection applied to the order date columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub year: Value,
    pub month: Value,
    pub day: Value,
}

impl FilterCriteria {
    pub fn new(year: Value, month: Value, day: Value) -> Self {
        Self { year, month, day }
    }

    /// The first distinct value of each date column, i.e. what a freshly
    /// opened selector shows. Columns with no values select [`Value::Missing`],
    /// which matches nothing.
    pub fn first_of(dataset: &Dataset) -> Self {
        let first = |col: &str| {
            dataset
                .unique_values(col)
                .first()
                .cloned()
                .unwrap_or(Value::Missing)
        };
        Self::new(first(ORDER_YEAR), first(ORDER_MONTH), first(ORDER_DAY))
    }

    /// Build criteria from user-supplied text, parsing each part with the
    /// column's type. Parts left out fall back to [`FilterCriteria::first_of`].
    pub fn parse(
        dataset: &Dataset,
        year: Option<&str>,
        month: Option<&str>,
        day: Option<&str>,
    ) -> Result<Self> {
        let defaults = Self::first_of(dataset);
        let parse = |col: &str, raw: Option<&str>, default: Value| -> Result<Value> {
            match raw {
                Some(raw) => dataset
                    .table()
                    .column_type(col)
                    .unwrap_or(ColumnType::Integer)
                    .parse_cell(raw)
                    .with_context(|| format!("invalid {col} filter")),
                None => Ok(default),
            }
        };
        Ok(Self::new(
            parse(ORDER_YEAR, year, defaults.year)?,
            parse(ORDER_MONTH, month, defaults.month)?,
            parse(ORDER_DAY, day, defaults.day)?,
        ))
    }

    /// Exact equality on all three columns. Missing cells never match,
    /// the same way NaN never compares equal.
    fn matches(&self, year: Option<&Value>, month: Option<&Value>, day: Option<&Value>) -> bool {
        let hit = |cell: Option<&Value>, wanted: &Value| {
            cell.is_some_and(|c| !c.is_missing() && c == wanted)
        };
        hit(year, &self.year) && hit(month, &self.month) && hit(day, &self.day)
    }
}

/// Return indices of rows matching `criteria`, in table order.
pub fn filtered_indices(table: &Table, criteria: &FilterCriteria) -> Vec<usize> {
    let year = table.column_index(ORDER_YEAR);
    let month = table.column_index(ORDER_MONTH);
    let day = table.column_index(ORDER_DAY);

    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            criteria.matches(
                year.and_then(|i| row.get(i)),
                month.and_then(|i| row.get(i)),
                day.and_then(|i| row.get(i)),
            )
        })
        .map(|(i, _)| i)
        .collect()
}

/// Select the orders placed on the given year/month/day.
///
/// The result keeps the original row order and columns and gains a
/// `commission_percentage` column computed for the selected rows only.
/// An unmatched combination is an empty table, never an error.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Table {
    let table = dataset.table();
    let selected = table.take(&filtered_indices(table, criteria));
    with_commission_percentage(selected)
}

// ---------------------------------------------------------------------------
// Derived columns
// ---------------------------------------------------------------------------

/// `commission_fee / order_value * 100`.
///
/// A zero order value gives ±inf (or NaN for 0/0); a missing operand gives
/// [`Value::Missing`].
pub fn commission_percentage(commission_fee: &Value, order_value: &Value) -> Value {
    match (commission_fee.as_f64(), order_value.as_f64()) {
        (Some(fee), Some(value)) if !fee.is_nan() && !value.is_nan() => {
            Value::Float(fee / value * 100.0)
        }
        _ => Value::Missing,
    }
}

fn with_commission_percentage(table: Table) -> Table {
    let fees: Vec<&Value> = table.values(COMMISSION_FEE).collect();
    let values: Vec<&Value> = table.values(ORDER_VALUE).collect();
    let derived: Vec<Value> = if fees.len() == table.len() && values.len() == table.len() {
        fees.iter()
            .zip(&values)
            .map(|(fee, value)| commission_percentage(fee, value))
            .collect()
    } else {
        vec![Value::Missing; table.len()]
    };
    table.with_column(
        ColumnDef::new(COMMISSION_PERCENTAGE, ColumnType::Float),
        derived,
    )
}
