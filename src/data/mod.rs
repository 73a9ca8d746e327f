//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!   orders .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file against the declared schema → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  immutable Table, distinct values per column
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  year/month/day equality → filtered Table (+ commission %)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  value counts, grouped sums, describe, box stats, trend
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub(crate) mod testing {
    use super::model::{declared_type, ColumnDef, ColumnType, Dataset, Table, Value};

    const COLUMNS: [&str; 16] = [
        "order_id",
        "order_year",
        "order_month",
        "order_day",
        "order_hour",
        "delivery_year",
        "delivery_month",
        "delivery_day",
        "delivery_hour",
        "order_value",
        "delivery_fee",
        "commission_fee",
        "discount_value",
        "payment_method",
        "discount_source",
        "discounts_and_offers",
    ];

    /// Ten orders across 2015 and 2020. Three of them fall on 2015-02-14,
    /// three on 2020-02-09, and none on 2015-01-03.
    const ROWS: [[&str; 16]; 10] = [
        ["O1", "2015", "2", "14", "12", "2015", "2", "14", "13", "200", "30", "20", "10", "Credit Card", "Restaurant", "10% off"],
        ["O2", "2015", "2", "14", "18", "2015", "2", "14", "19", "50", "0", "5", "0", "Cash", "", ""],
        ["O3", "2015", "3", "14", "9", "2015", "3", "14", "10", "120", "15", "12", "5", "Credit Card", "Platform", "5% on App"],
        ["O4", "2020", "2", "9", "20", "2020", "2", "9", "21", "80", "10", "8", "0", "Digital Wallet", "", ""],
        ["O5", "2015", "2", "14", "12", "2015", "2", "14", "12", "0", "20", "3", "15", "Cash", "Platform", "15 off"],
        ["O6", "2020", "2", "9", "8", "2020", "2", "9", "9", "300", "25", "30", "20", "Credit Card", "Restaurant", "10% off"],
        ["O7", "2020", "7", "1", "11", "2020", "7", "1", "12", "90", "5", "9", "0", "Cash", "", ""],
        ["O8", "2015", "1", "2", "23", "2015", "1", "3", "0", "60", "10", "6", "5", "Credit Card", "Platform", "5% on App"],
        ["O9", "2020", "1", "3", "14", "2020", "1", "3", "15", "110", "12", "11", "0", "Digital Wallet", "", ""],
        ["O10", "2020", "2", "9", "20", "2020", "2", "9", "21", "40", "8", "4", "10", "Cash", "Restaurant", "10% off"],
    ];

    pub fn orders_table() -> Table {
        let columns: Vec<ColumnDef> = COLUMNS
            .iter()
            .map(|name| ColumnDef::new(*name, declared_type(name).unwrap_or(ColumnType::Text)))
            .collect();
        let rows = ROWS
            .iter()
            .map(|raw| {
                columns
                    .iter()
                    .zip(raw.iter())
                    .map(|(col, cell)| col.kind.parse_cell(cell).unwrap())
                    .collect::<Vec<Value>>()
            })
            .collect();
        Table::new(columns, rows)
    }

    pub fn orders_dataset() -> Dataset {
        Dataset::from_table(orders_table())
    }
}
