use anyhow::Result;
use serde::Serialize;

use crate::data::aggregate::{
    self, BoxStats, Cardinality, ColumnSummary, Frequency, GroupedSum, LinearTrend,
};
use crate::data::filter::{self, FilterCriteria};
use crate::data::model::{
    ColumnDef, Dataset, Table, COMMISSION_FEE, COMMISSION_PERCENTAGE, DELIVERY_DAY, DELIVERY_FEE,
    DELIVERY_HOUR, DELIVERY_MONTH, DELIVERY_YEAR, DISCOUNTS_AND_OFFERS, DISCOUNT_SOURCE,
    DISCOUNT_VALUE, ORDER_DAY, ORDER_HOUR, ORDER_MONTH, ORDER_VALUE, ORDER_YEAR, PAYMENT_METHOD,
};

/// Rows shown in the sample-data section.
pub const SAMPLE_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// View model: every figure the dashboard shows for one selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesView {
    pub order_value_by_month: GroupedSum,
    pub orders_by_day: Frequency,
    /// Sorted by hour so it reads as a time series.
    pub orders_by_hour: Frequency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerView {
    pub payment_methods: Frequency,
    pub discount_sources: Frequency,
    /// `(discount_value, order_value)` pairs.
    pub discount_vs_order_value: Vec<[f64; 2]>,
    pub discount_trend: Option<LinearTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialView {
    pub total_delivery_fees: f64,
    pub total_commission_fees: f64,
    pub commission_percentage: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateDistribution {
    pub years: Frequency,
    pub months: Frequency,
    pub days: Frequency,
}

impl DateDistribution {
    fn of(table: &Table, year: &str, month: &str, day: &str) -> Result<Self> {
        Ok(Self {
            years: aggregate::frequency(table, year)?,
            months: aggregate::frequency(table, month)?,
            days: aggregate::frequency(table, day)?,
        })
    }
}

/// Everything the presentation layer binds to widgets, derived from one
/// (dataset, criteria) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    pub shape: Shape,
    pub columns: Vec<ColumnDef>,
    pub sample: Table,
    pub description: Vec<ColumnSummary>,
    pub unique_counts: Vec<Cardinality>,
    pub order_hours: Frequency,
    pub delivery_hours: Frequency,
    pub discounts_and_offers: Frequency,
    pub sales: SalesView,
    pub customers: CustomerView,
    pub financials: FinancialView,
    pub order_dates: DateDistribution,
    pub delivery_dates: DateDistribution,
}

/// Recompute the whole dashboard from scratch for `criteria`.
pub fn render(dataset: &Dataset, criteria: &FilterCriteria) -> Result<DashboardView> {
    let table = filter::filter(dataset, criteria);
    log::debug!(
        "rendering {} of {} orders for {:?}",
        table.len(),
        dataset.len(),
        criteria
    );

    let discount_points = aggregate::paired_values(&table, DISCOUNT_VALUE, ORDER_VALUE);

    Ok(DashboardView {
        criteria: criteria.clone(),
        shape: Shape {
            rows: table.len(),
            columns: table.width(),
        },
        columns: table.columns().to_vec(),
        sample: table.head(SAMPLE_ROWS),
        description: aggregate::describe(&table)?,
        unique_counts: aggregate::nunique(&table)?,
        order_hours: aggregate::frequency(&table, ORDER_HOUR)?,
        delivery_hours: aggregate::frequency(&table, DELIVERY_HOUR)?,
        discounts_and_offers: aggregate::frequency(&table, DISCOUNTS_AND_OFFERS)?,
        sales: SalesView {
            order_value_by_month: aggregate::grouped_sum(&table, ORDER_MONTH, ORDER_VALUE)?,
            orders_by_day: aggregate::frequency(&table, ORDER_DAY)?,
            orders_by_hour: aggregate::frequency(&table, ORDER_HOUR)?.sorted_by_value(),
        },
        customers: CustomerView {
            payment_methods: aggregate::frequency(&table, PAYMENT_METHOD)?,
            discount_sources: aggregate::frequency(&table, DISCOUNT_SOURCE)?,
            discount_trend: aggregate::linear_trend(&discount_points),
            discount_vs_order_value: discount_points,
        },
        financials: FinancialView {
            total_delivery_fees: aggregate::sum(&table, DELIVERY_FEE)?,
            total_commission_fees: aggregate::sum(&table, COMMISSION_FEE)?,
            commission_percentage: aggregate::box_stats(&table, COMMISSION_PERCENTAGE)?,
        },
        order_dates: DateDistribution::of(&table, ORDER_YEAR, ORDER_MONTH, ORDER_DAY)?,
        delivery_dates: DateDistribution::of(&table, DELIVERY_YEAR, DELIVERY_MONTH, DELIVERY_DAY)?,
    })
}

/// `$1,234.56` style amount.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use crate::data::testing::orders_dataset;

    fn criteria(y: i64, m: i64, d: i64) -> FilterCriteria {
        FilterCriteria::new(Value::Integer(y), Value::Integer(m), Value::Integer(d))
    }

    #[test]
    fn render_selected_day() {
        let ds = orders_dataset();
        let view = render(&ds, &criteria(2020, 2, 9)).unwrap();

        assert_eq!(view.shape, Shape { rows: 3, columns: 17 });
        assert_eq!(view.sample.len(), 3);
        assert_eq!(view.financials.total_delivery_fees, 43.0);
        assert_eq!(view.financials.total_commission_fees, 42.0);
        assert_eq!(view.customers.payment_methods.total(), 3);
        assert_eq!(view.customers.discount_vs_order_value.len(), 3);
        assert_eq!(view.order_dates.years.counts.len(), 1);
        assert_eq!(view.order_dates.years.counts[0].count, 3);
        assert_eq!(
            view.columns.last().map(|c| c.name.as_str()),
            Some(COMMISSION_PERCENTAGE)
        );
    }

    #[test]
    fn hourly_view_is_sorted_by_hour_others_by_count() {
        let ds = orders_dataset();
        let view = render(&ds, &criteria(2020, 2, 9)).unwrap();
        // Hours 20, 8, 20.
        let by_hour: Vec<Value> = view
            .sales
            .orders_by_hour
            .counts
            .iter()
            .map(|c| c.value.clone())
            .collect();
        assert_eq!(by_hour, vec![Value::Integer(8), Value::Integer(20)]);

        let by_count: Vec<Value> = view.order_hours.counts.iter().map(|c| c.value.clone()).collect();
        assert_eq!(by_count, vec![Value::Integer(20), Value::Integer(8)]);
    }

    #[test]
    fn render_empty_selection() {
        let ds = orders_dataset();
        let view = render(&ds, &criteria(2015, 1, 3)).unwrap();

        assert_eq!(view.shape.rows, 0);
        assert!(view.sample.is_empty());
        assert!(view.order_hours.is_empty());
        assert!(view.sales.order_value_by_month.groups.is_empty());
        assert_eq!(view.financials.total_delivery_fees, 0.0);
        assert!(view.financials.commission_percentage.is_none());
        assert!(view.customers.discount_trend.is_none());
    }

    #[test]
    fn render_is_deterministic() {
        let ds = orders_dataset();
        let c = criteria(2015, 2, 14);
        assert_eq!(render(&ds, &c).unwrap(), render(&ds, &c).unwrap());
    }

    #[test]
    fn view_serializes_to_json() {
        let ds = orders_dataset();
        let view = render(&ds, &criteria(2015, 2, 14)).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["shape"]["rows"], 3);
        assert_eq!(json["criteria"]["year"], 2015);
        assert_eq!(json["financials"]["total_delivery_fees"], 50.0);
        // Commission percentage of the zero-value order, then a finite one.
        assert_eq!(json["sample"]["rows"][2][16], "inf");
        assert_eq!(json["sample"]["rows"][0][16], 10.0);
        // Undefined statistics stay null.
        let commission = json["description"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["column"] == COMMISSION_PERCENTAGE)
            .unwrap();
        assert!(commission["stats"]["mean"].is_null());
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-987654.321), "-$987,654.32");
    }
}
