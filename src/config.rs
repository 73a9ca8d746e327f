use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::data::filter::FilterCriteria;
use crate::data::model::Dataset;

pub const DEFAULT_DATA_PATH: &str = "food_delivery_10_years_cleaned.csv";

/// Food delivery analysis dashboard
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// cleaned orders CSV to load
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// initial order year (defaults to the first year in the file)
    #[arg(long)]
    pub year: Option<String>,

    /// initial order month
    #[arg(long)]
    pub month: Option<String>,

    /// initial order day
    #[arg(long)]
    pub day: Option<String>,

    /// print the dashboard figures as JSON instead of opening a window
    #[arg(long)]
    pub json: bool,

    /// window width in points
    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    /// window height in points
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

impl Config {
    /// The selection to start with, parsed against the dataset's column types.
    pub fn initial_criteria(&self, dataset: &Dataset) -> Result<FilterCriteria> {
        FilterCriteria::parse(
            dataset,
            self.year.as_deref(),
            self.month.as_deref(),
            self.day.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use crate::data::testing::orders_dataset;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["dashboard"]).unwrap();
        assert_eq!(config.data, PathBuf::from(DEFAULT_DATA_PATH));
        assert!(!config.json);
        assert!(config.year.is_none());
        assert_eq!(config.width, 1400.0);
    }

    #[test]
    fn explicit_criteria() {
        let config = Config::try_parse_from([
            "dashboard",
            "--data",
            "orders.csv",
            "--year",
            "2020",
            "--month",
            "2",
            "--day",
            "9",
            "--json",
        ])
        .unwrap();
        assert!(config.json);
        assert_eq!(config.data, PathBuf::from("orders.csv"));

        let criteria = config.initial_criteria(&orders_dataset()).unwrap();
        assert_eq!(
            criteria,
            FilterCriteria::new(Value::Integer(2020), Value::Integer(2), Value::Integer(9))
        );
    }

    #[test]
    fn bad_criteria_are_rejected() {
        let config = Config::try_parse_from(["dashboard", "--month", "feb"]).unwrap();
        assert!(config.initial_criteria(&orders_dataset()).is_err());
    }
}
