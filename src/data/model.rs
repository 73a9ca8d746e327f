use std::collections::{BTreeMap, HashSet};
use std::fmt;

use anyhow::{bail, Context, Result};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ORDER_YEAR: &str = "order_year";
pub const ORDER_MONTH: &str = "order_month";
pub const ORDER_DAY: &str = "order_day";
pub const ORDER_HOUR: &str = "order_hour";
pub const DELIVERY_YEAR: &str = "delivery_year";
pub const DELIVERY_MONTH: &str = "delivery_month";
pub const DELIVERY_DAY: &str = "delivery_day";
pub const DELIVERY_HOUR: &str = "delivery_hour";
pub const ORDER_VALUE: &str = "order_value";
pub const DELIVERY_FEE: &str = "delivery_fee";
pub const COMMISSION_FEE: &str = "commission_fee";
pub const DISCOUNT_VALUE: &str = "discount_value";
pub const PAYMENT_METHOD: &str = "payment_method";
pub const DISCOUNT_SOURCE: &str = "discount_source";
pub const DISCOUNTS_AND_OFFERS: &str = "discounts_and_offers";

/// Derived column added to every filtered table.
pub const COMMISSION_PERCENTAGE: &str = "commission_percentage";

/// Columns every orders file must declare, with their types.
pub const ORDER_SCHEMA: [(&str, ColumnType); 15] = [
    (ORDER_YEAR, ColumnType::Integer),
    (ORDER_MONTH, ColumnType::Integer),
    (ORDER_DAY, ColumnType::Integer),
    (ORDER_HOUR, ColumnType::Integer),
    (DELIVERY_YEAR, ColumnType::Integer),
    (DELIVERY_MONTH, ColumnType::Integer),
    (DELIVERY_DAY, ColumnType::Integer),
    (DELIVERY_HOUR, ColumnType::Integer),
    (ORDER_VALUE, ColumnType::Float),
    (DELIVERY_FEE, ColumnType::Float),
    (COMMISSION_FEE, ColumnType::Float),
    (DISCOUNT_VALUE, ColumnType::Float),
    (PAYMENT_METHOD, ColumnType::Text),
    (DISCOUNT_SOURCE, ColumnType::Text),
    (DISCOUNTS_AND_OFFERS, ColumnType::Text),
];

/// Look up the declared type of a column, if it is part of the order schema.
pub fn declared_type(column: &str) -> Option<ColumnType> {
    ORDER_SCHEMA
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, kind)| *kind)
}

/// Cell contents that read as "missing", following the usual dataframe conventions.
const MISSING_TOKENS: [&str; 13] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
];

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used as a map/set key downstream, so `Value` must be `Eq`, `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

// -- Manual Eq/Ord/Hash so Value can key HashMaps and BTreeMaps --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => unsigned_zero(*a).total_cmp(&unsigned_zero(*b)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => unsigned_zero(*f).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Missing => {}
        }
    }
}

/// Non-finite floats are written as the strings `"inf"`, `"-inf"` and `"NaN"`
/// so they stay distinct from missing cells, which are `null`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(v) if v.is_nan() => serializer.serialize_str("NaN"),
            Value::Float(v) if v.is_infinite() => {
                serializer.serialize_str(if *v > 0.0 { "inf" } else { "-inf" })
            }
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

/// `-0.0` and `0.0` are the same category.
pub(crate) fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "NaN"),
        }
    }
}

impl Value {
    /// Numeric view of the cell; `None` for text and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Missing cells and float NaN both count as "no value".
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    /// Dataframe-style dtype label.
    pub fn dtype(self) -> &'static str {
        match self {
            ColumnType::Integer => "int64",
            ColumnType::Float => "float64",
            ColumnType::Text => "object",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Parse one raw CSV cell as this type.
    ///
    /// Missing tokens become [`Value::Missing`]. Integer columns also accept
    /// float literals with no fractional part (`2015.0`).
    pub fn parse_cell(self, raw: &str) -> Result<Value> {
        let s = raw.trim();
        if MISSING_TOKENS.contains(&s) {
            return Ok(Value::Missing);
        }
        match self {
            ColumnType::Integer => {
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Value::Integer(i));
                }
                let f = s
                    .parse::<f64>()
                    .with_context(|| format!("'{s}' is not an integer"))?;
                if !f.is_finite() || f.fract() != 0.0 {
                    bail!("'{s}' is not an integer");
                }
                // i64::MAX as f64 rounds up to 2^63, which is already out of range.
                if f < i64::MIN as f64 || f >= i64::MAX as f64 {
                    bail!("'{s}' is out of range for an integer");
                }
                Ok(Value::Integer(f as i64))
            }
            ColumnType::Float => s
                .parse::<f64>()
                .map(|v| Value::Float(unsigned_zero(v)))
                .with_context(|| format!("'{s}' is not a number")),
            ColumnType::Text => Ok(Value::Text(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "dtype")]
    pub kind: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – rows sharing one column layout
// ---------------------------------------------------------------------------

/// One record; cells line up with [`Table::columns`].
pub type Row = Vec<Value>;

/// A rectangular, row-oriented table. Derived tables are always new values;
/// nothing mutates a table in place once it is shared.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table. Every row must have one cell per column.
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one column in row order. Yields nothing for an unknown column.
    pub fn values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let idx = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Distinct values of a column in order of first appearance.
    pub fn distinct_values(&self, column: &str) -> Vec<Value> {
        let mut seen = HashSet::new();
        self.values(column)
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect()
    }

    /// Keep the rows at `indices`, in the given order.
    pub fn take(&self, indices: &[usize]) -> Table {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Table::new(self.columns.clone(), rows)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table::new(
            self.columns.clone(),
            self.rows.iter().take(n).cloned().collect(),
        )
    }

    /// Append a column, replacing one of the same name if present.
    pub fn with_column(mut self, def: ColumnDef, values: Vec<Value>) -> Table {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(&def.name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
                self.columns[idx] = def;
            }
            None => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
                self.columns.push(def);
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded file
// ---------------------------------------------------------------------------

/// The loaded orders with pre-computed distinct values per column.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    table: Table,
    /// For each column the distinct values in first-appearance order.
    unique_values: BTreeMap<String, Vec<Value>>,
}

impl Dataset {
    /// Build column indices from the loaded table.
    pub fn from_table(table: Table) -> Self {
        let unique_values = table
            .columns()
            .iter()
            .map(|c| (c.name.clone(), table.distinct_values(&c.name)))
            .collect();
        Dataset {
            table,
            unique_values,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Distinct values of `column`; empty for an unknown column.
    pub fn unique_values(&self, column: &str) -> &[Value] {
        self.unique_values
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> Table {
        Table::new(
            vec![
                ColumnDef::new("year", ColumnType::Integer),
                ColumnDef::new("method", ColumnType::Text),
            ],
            vec![
                vec![Value::Integer(2020), Value::Text("Card".into())],
                vec![Value::Integer(2015), Value::Text("Cash".into())],
                vec![Value::Integer(2020), Value::Missing],
            ],
        )
    }

    #[test]
    fn parse_integer_cells() {
        let kind = ColumnType::Integer;
        assert_eq!(kind.parse_cell("2015").unwrap(), Value::Integer(2015));
        assert_eq!(kind.parse_cell(" 7 ").unwrap(), Value::Integer(7));
        assert_eq!(kind.parse_cell("2015.0").unwrap(), Value::Integer(2015));
        assert_eq!(kind.parse_cell("").unwrap(), Value::Missing);
        assert!(kind.parse_cell("2015.5").is_err());
        assert!(kind.parse_cell("abc").is_err());
        assert_eq!(
            kind.parse_cell("-1e18").unwrap(),
            Value::Integer(-1_000_000_000_000_000_000)
        );
        assert!(kind.parse_cell("1e19").is_err());
        assert!(kind.parse_cell("-1e19").is_err());
        assert!(kind.parse_cell("9223372036854775807.0").is_err());
    }

    #[test]
    fn parse_float_and_text_cells() {
        assert_eq!(
            ColumnType::Float.parse_cell("12.5").unwrap(),
            Value::Float(12.5)
        );
        assert_eq!(ColumnType::Float.parse_cell("NaN").unwrap(), Value::Missing);
        assert!(ColumnType::Float.parse_cell("twelve").is_err());
        assert_eq!(
            ColumnType::Text.parse_cell("Credit Card").unwrap(),
            Value::Text("Credit Card".into())
        );
        assert_eq!(ColumnType::Text.parse_cell("None").unwrap(), Value::Missing);
    }

    #[test]
    fn value_ordering_and_equality() {
        assert!(Value::Missing < Value::Integer(0));
        assert!(Value::Integer(9) < Value::Integer(10));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::Float(f64::INFINITY).is_missing());
    }

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let table = small_table();
        assert_eq!(
            table.distinct_values("year"),
            vec![Value::Integer(2020), Value::Integer(2015)]
        );
        assert_eq!(table.distinct_values("method").len(), 3);
        assert!(table.distinct_values("nope").is_empty());
    }

    #[test]
    fn signed_zeros_are_one_category() {
        let kind = ColumnType::Float;
        let table = Table::new(
            vec![ColumnDef::new("fee", kind)],
            ["0.0", "-0.0", "0"]
                .iter()
                .map(|raw| vec![kind.parse_cell(raw).unwrap()])
                .collect(),
        );
        assert_eq!(table.distinct_values("fee"), vec![Value::Float(0.0)]);
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
    }

    #[test]
    fn non_finite_floats_serialize_apart_from_missing() {
        let cells = vec![
            Value::Float(f64::INFINITY),
            Value::Float(f64::NEG_INFINITY),
            Value::Float(f64::NAN),
            Value::Missing,
            Value::Float(1.5),
            Value::Integer(3),
            Value::Text("Cash".into()),
        ];
        assert_eq!(
            serde_json::to_string(&cells).unwrap(),
            r#"["inf","-inf","NaN",null,1.5,3,"Cash"]"#
        );
    }

    #[test]
    fn with_column_appends_and_replaces() {
        let table = small_table().with_column(
            ColumnDef::new("flag", ColumnType::Integer),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)],
        );
        assert_eq!(table.width(), 3);
        assert_eq!(table.rows()[2][2], Value::Integer(3));

        let table = table.with_column(
            ColumnDef::new("flag", ColumnType::Float),
            vec![Value::Float(0.5); 3],
        );
        assert_eq!(table.width(), 3);
        assert_eq!(table.column_type("flag"), Some(ColumnType::Float));
        assert_eq!(table.rows()[0][2], Value::Float(0.5));
    }

    #[test]
    fn dataset_indexes_unique_values() {
        let ds = Dataset::from_table(small_table());
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.unique_values("year").len(), 2);
        assert!(ds.unique_values("missing_column").is_empty());
    }

    #[test]
    fn declared_schema_lookup() {
        assert_eq!(declared_type(ORDER_YEAR), Some(ColumnType::Integer));
        assert_eq!(declared_type(ORDER_VALUE), Some(ColumnType::Float));
        assert_eq!(declared_type(PAYMENT_METHOD), Some(ColumnType::Text));
        assert_eq!(declared_type("order_id"), None);
    }
}
