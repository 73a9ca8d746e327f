use anyhow::{bail, Result};
use polars::prelude::*;
use serde::Serialize;

use super::model::{unsigned_zero, ColumnType, Table, Value};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub value: Value,
    pub count: usize,
}

/// Occurrences of each distinct value of one column (missing cells excluded).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    pub column: String,
    pub counts: Vec<CategoryCount>,
}

impl Frequency {
    /// Re-order by category value, ascending.
    pub fn sorted_by_value(mut self) -> Self {
        self.counts.sort_by(|a, b| a.value.cmp(&b.value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSum {
    pub key: Value,
    pub sum: f64,
}

/// Sum of `column` per distinct value of `group_by`, keys ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSum {
    pub group_by: String,
    pub column: String,
    pub groups: Vec<GroupSum>,
}

/// Statistics for a numeric column. Undefined statistics are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Statistics for a text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub unique: usize,
    pub top: Option<Value>,
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SummaryStats {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// One column of a descriptive summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Non-missing cells.
    pub count: usize,
    pub stats: SummaryStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    pub column: String,
    pub unique: usize,
}

/// Five-number box summary with 1.5 × IQR whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearTrend {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

/// Name of the count column produced by [`frequency`].
const COUNT: &str = "count";

/// Value counts for one column: count descending, ties in order of first appearance.
pub fn frequency(table: &Table, column: &str) -> Result<Frequency> {
    let out = frame(table, &[column])?
        .lazy()
        .filter(col(column).is_not_null())
        .group_by_stable([col(column)])
        .agg([len().alias(COUNT)])
        .sort(
            [COUNT],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let keys = out.column(column)?;
    let tallies = out.column(COUNT)?;
    let counts = (0..out.height())
        .map(|i| -> Result<CategoryCount> {
            Ok(CategoryCount {
                value: cell(keys.get(i)?),
                count: tallies.get(i)?.extract::<usize>().unwrap_or(0),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Frequency {
        column: column.to_string(),
        counts,
    })
}

/// Sum `column` per value of `group_by`. Rows with a missing key are dropped
/// and missing summands are skipped.
pub fn grouped_sum(table: &Table, group_by: &str, column: &str) -> Result<GroupedSum> {
    let out = frame(table, &[group_by, column])?
        .lazy()
        .filter(col(group_by).is_not_null())
        .group_by([col(group_by)])
        .agg([col(column).sum()])
        .sort([group_by], SortMultipleOptions::default())
        .collect()?;

    let keys = out.column(group_by)?;
    let sums = out.column(column)?;
    let groups = (0..out.height())
        .map(|i| -> Result<GroupSum> {
            Ok(GroupSum {
                key: cell(keys.get(i)?),
                sum: sums.get(i)?.extract::<f64>().unwrap_or(0.0),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GroupedSum {
        group_by: group_by.to_string(),
        column: column.to_string(),
        groups,
    })
}

/// Sum of one numeric column; 0 for an empty table.
pub fn sum(table: &Table, column: &str) -> Result<f64> {
    Ok(float_column(table, column)?.sum().unwrap_or(0.0))
}

/// Distinct non-missing values per column, in column order.
pub fn nunique(table: &Table) -> Result<Vec<Cardinality>> {
    table
        .columns()
        .iter()
        .map(|c| -> Result<Cardinality> {
            Ok(Cardinality {
                column: c.name.clone(),
                unique: column_series(table, &c.name)?.drop_nulls().n_unique()?,
            })
        })
        .collect()
}

/// Descriptive summary of every column.
pub fn describe(table: &Table) -> Result<Vec<ColumnSummary>> {
    table
        .columns()
        .iter()
        .map(|c| -> Result<ColumnSummary> {
            if c.kind.is_numeric() {
                let ca = float_column(table, &c.name)?;
                Ok(ColumnSummary {
                    column: c.name.clone(),
                    count: ca.len() - ca.null_count(),
                    stats: SummaryStats::Numeric(numeric_summary(&ca)?),
                })
            } else {
                let freq = frequency(table, &c.name)?;
                let top = freq.counts.first();
                Ok(ColumnSummary {
                    column: c.name.clone(),
                    count: freq.total(),
                    stats: SummaryStats::Categorical(CategoricalSummary {
                        unique: freq.counts.len(),
                        top: top.map(|t| t.value.clone()),
                        freq: top.map(|t| t.count),
                    }),
                })
            }
        })
        .collect()
}

/// Box statistics over the finite values of `column`; `None` when there are none.
pub fn box_stats(table: &Table, column: &str) -> Result<Option<BoxStats>> {
    let ca = float_column(table, column)?;
    let values: Vec<f64> = ca
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    let finite = Float64Chunked::from_vec(column, values.clone());

    let (Some(q1), Some(median), Some(q3)) = (
        finite.quantile(0.25, QuantileInterpolOptions::Linear)?,
        finite.quantile(0.5, QuantileInterpolOptions::Linear)?,
        finite.quantile(0.75, QuantileInterpolOptions::Linear)?,
    ) else {
        return Ok(None);
    };
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let mut lower_whisker = f64::INFINITY;
    let mut upper_whisker = f64::NEG_INFINITY;
    let mut outliers = Vec::new();
    for v in values {
        if v < low_fence || v > high_fence {
            outliers.push(v);
        } else {
            lower_whisker = lower_whisker.min(v);
            upper_whisker = upper_whisker.max(v);
        }
    }

    Ok(Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    }))
}

/// Finite `(x, y)` pairs from two numeric columns, in row order.
pub fn paired_values(table: &Table, x: &str, y: &str) -> Vec<[f64; 2]> {
    let (Some(xi), Some(yi)) = (table.column_index(x), table.column_index(y)) else {
        return Vec::new();
    };
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let x = row.get(xi)?.as_f64()?;
            let y = row.get(yi)?.as_f64()?;
            (x.is_finite() && y.is_finite()).then_some([x, y])
        })
        .collect()
}

/// Least-squares line through `points`. `None` with fewer than two points or
/// when every x is the same.
pub fn linear_trend(points: &[[f64; 2]]) -> Option<LinearTrend> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for [x, y] in points {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    // A constant y is fitted exactly by the flat line.
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    Some(LinearTrend {
        slope,
        intercept: mean_y - slope * mean_x,
        r_squared,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One table column as a series. Missing and NaN cells become nulls.
fn column_series(table: &Table, column: &str) -> Result<Series> {
    let Some(kind) = table.column_type(column) else {
        bail!("no column named '{column}'");
    };
    let cells = table.values(column);
    let series = match kind {
        ColumnType::Integer => {
            let ints: Vec<Option<i64>> = cells
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Series::new(column, ints)
        }
        ColumnType::Float => {
            let floats: Vec<Option<f64>> = cells
                .map(|v| v.as_f64().filter(|f| !f.is_nan()).map(unsigned_zero))
                .collect();
            Series::new(column, floats)
        }
        ColumnType::Text => {
            let texts: Vec<Option<&str>> = cells
                .map(|v| match v {
                    Value::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            Series::new(column, texts)
        }
    };
    Ok(series)
}

fn frame(table: &Table, columns: &[&str]) -> Result<DataFrame> {
    let series = columns
        .iter()
        .map(|c| column_series(table, c))
        .collect::<Result<Vec<_>>>()?;
    Ok(DataFrame::new(series)?)
}

/// A numeric column widened to `f64`.
fn float_column(table: &Table, column: &str) -> Result<Float64Chunked> {
    let series = column_series(table, column)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}

/// Converts a key read back from a result frame.
fn cell(value: AnyValue) -> Value {
    match value {
        AnyValue::Int64(i) => Value::Integer(i),
        AnyValue::Float64(f) => Value::Float(f),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        _ => Value::Missing,
    }
}

/// Mean, sample std and linear quantiles. A statistic that comes out
/// non-finite (an infinite cell, or too few values) is reported as `None`.
fn numeric_summary(ca: &Float64Chunked) -> Result<NumericSummary> {
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    Ok(NumericSummary {
        mean: finite(ca.mean()),
        std: finite(ca.std(1)),
        min: finite(ca.min()),
        q25: finite(ca.quantile(0.25, QuantileInterpolOptions::Linear)?),
        median: finite(ca.quantile(0.5, QuantileInterpolOptions::Linear)?),
        q75: finite(ca.quantile(0.75, QuantileInterpolOptions::Linear)?),
        max: finite(ca.max()),
    })
}
